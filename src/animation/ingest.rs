//! Bulk keyframe ingestion.
//!
//! Loaders produce one [`KeyframeBatch`] per animated attribute (timestamps,
//! values, an optional strategy, optional tangents) and hand it to
//! [`Timeline::ingest`]. Keyframes are validated individually so a single
//! malformed entry never aborts the batch.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::animation::interpolator::Interpolation;
use crate::animation::timeline::{Namespace, Timeline};
use crate::animation::values::Value;
use crate::errors::Result;

/// Outcome of writing several keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[must_use]
pub struct BatchReport {
    pub applied: usize,
    pub skipped: usize,
}

impl BatchReport {
    /// `true` if no keyframe was skipped.
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }

    pub(crate) fn record(&mut self, attribute: &str, time: f32, result: Result<()>) {
        match result {
            Ok(()) => self.applied += 1,
            Err(err) => {
                log::warn!("Skipping '{attribute}' keyframe at {time}: {err}");
                self.skipped += 1;
            }
        }
    }
}

/// Keyframes of one attribute, as produced by an asset loader.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct KeyframeBatch {
    pub attribute: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub namespace: Namespace,
    pub timestamps: Vec<f32>,
    pub values: Vec<Value>,
    /// Strategy bound after the keyframes are written.
    #[cfg_attr(feature = "serde", serde(default))]
    pub interpolation: Option<Interpolation>,
    /// `(in, out)` tangents, parallel to `values`.
    #[cfg_attr(feature = "serde", serde(default))]
    pub tangents: Option<Vec<(Value, Value)>>,
}

impl KeyframeBatch {
    #[must_use]
    pub fn new(attribute: impl Into<String>, timestamps: Vec<f32>, values: Vec<Value>) -> Self {
        Self {
            attribute: attribute.into(),
            timestamps,
            values,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn camera(mut self) -> Self {
        self.namespace = Namespace::Camera;
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = Some(interpolation);
        self
    }

    /// Builds a cubic batch from values packed as `[in, value, out]` triples
    /// per keyframe. A trailing incomplete triple is dropped.
    #[must_use]
    pub fn from_packed_cubic(
        attribute: impl Into<String>,
        timestamps: Vec<f32>,
        packed: Vec<Value>,
    ) -> Self {
        let triples = packed.len() / 3;
        let mut values = Vec::with_capacity(triples);
        let mut tangents = Vec::with_capacity(triples);

        let mut packed = packed.into_iter();
        while let (Some(in_tangent), Some(value), Some(out_tangent)) =
            (packed.next(), packed.next(), packed.next())
        {
            values.push(value);
            tangents.push((in_tangent, out_tangent));
        }

        Self {
            attribute: attribute.into(),
            namespace: Namespace::Object,
            timestamps,
            values,
            interpolation: Some(Interpolation::CubicHermite),
            tangents: Some(tangents),
        }
    }
}

impl Timeline {
    /// Writes every keyframe of `batch`, then binds its strategy if one is
    /// given.
    ///
    /// Timestamps without a matching value, values without a matching
    /// timestamp, and values the attribute rejects are counted as skipped.
    pub fn ingest(&mut self, batch: KeyframeBatch) -> BatchReport {
        let KeyframeBatch {
            attribute,
            namespace,
            timestamps,
            values,
            interpolation,
            tangents,
        } = batch;

        let mut report = BatchReport::default();
        let mut values = values.into_iter();
        let mut tangents = tangents.map(Vec::into_iter);

        for time in timestamps {
            let Some(value) = values.next() else {
                log::warn!("'{attribute}' keyframe at {time} has no value");
                report.skipped += 1;
                continue;
            };
            let (in_tangent, out_tangent) = tangents
                .as_mut()
                .and_then(Iterator::next)
                .map_or((None, None), |(i, o)| (Some(i), Some(o)));

            let result =
                self.write_keyframe(namespace, &attribute, time, value, in_tangent, out_tangent);
            report.record(&attribute, time, result);
        }

        let leftover = values.count();
        if leftover > 0 {
            log::warn!("'{attribute}' batch has {leftover} value(s) without a timestamp");
            report.skipped += leftover;
        }

        if let Some(interpolation) = interpolation {
            let rebound = match namespace {
                Namespace::Object => self.set_interpolator(&attribute, interpolation),
                Namespace::Camera => self.set_camera_interpolator(&attribute, interpolation),
            };
            if let Err(err) = rebound {
                log::warn!("Keeping default interpolation for '{attribute}': {err}");
            }
        }

        log::debug!(
            "Ingested '{attribute}': {} applied, {} skipped",
            report.applied,
            report.skipped
        );
        report
    }
}
