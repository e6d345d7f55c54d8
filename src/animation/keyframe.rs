#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::animation::values::{AttributeKind, Value};
use crate::errors::{AnimationError, Result};

/// An authored sample: a value at a timestamp, optionally with tangents for
/// cubic interpolation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Keyframe {
    pub time: f32,
    pub value: Value,
    /// Tangent used when arriving at this keyframe.
    pub in_tangent: Option<Value>,
    /// Tangent used when leaving this keyframe.
    pub out_tangent: Option<Value>,
}

impl Keyframe {
    #[must_use]
    pub fn new(time: f32, value: Value) -> Self {
        Self {
            time,
            value,
            in_tangent: None,
            out_tangent: None,
        }
    }

    #[must_use]
    pub fn with_tangents(mut self, in_tangent: Option<Value>, out_tangent: Option<Value>) -> Self {
        self.in_tangent = in_tangent;
        self.out_tangent = out_tangent;
        self
    }
}

/// Ordered keyframes of a single attribute.
///
/// Keyframes are kept sorted by timestamp with at most one sample per
/// timestamp. Every successful mutation bumps [`version`](Self::version), which
/// the bound [`Interpolator`](crate::animation::Interpolator) compares against
/// before sampling.
#[derive(Debug, Clone)]
pub struct KeyframeStore {
    attribute: String,
    kind: AttributeKind,
    keyframes: Vec<Keyframe>,
    arity: Option<usize>,
    version: u64,
}

impl KeyframeStore {
    #[must_use]
    pub fn new(attribute: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            attribute: attribute.into(),
            kind,
            keyframes: Vec::new(),
            arity: None,
            version: 0,
        }
    }

    /// Creates a store whose arity rules follow the named attribute.
    #[must_use]
    pub fn for_attribute(attribute: &str, camera: bool) -> Self {
        Self::new(attribute, AttributeKind::resolve(attribute, camera))
    }

    /// Inserts the sample at `time`, overwriting any sample already there.
    ///
    /// Fails with [`AnimationError::InvalidValue`] when the value (or a
    /// tangent) does not match the attribute's arity, or when a rotation is
    /// non-finite or a zero quaternion; the store is unchanged in that case.
    pub fn set(
        &mut self,
        time: f32,
        value: Value,
        in_tangent: Option<Value>,
        out_tangent: Option<Value>,
    ) -> Result<()> {
        if !time.is_finite() {
            return Err(AnimationError::NonFiniteTimestamp(time));
        }
        if !self.kind.accepts(value.len()) {
            return Err(self.invalid(self.kind.describe().to_string(), value.len()));
        }
        if !self.kind.is_well_formed(&value) {
            return Err(self.invalid("finite non-zero".to_string(), value.len()));
        }

        let value = self.kind.normalize(value);
        if let Some(arity) = self.arity
            && arity != value.len()
        {
            return Err(self.invalid(arity.to_string(), value.len()));
        }
        for tangent in in_tangent.iter().chain(out_tangent.iter()) {
            if tangent.len() != value.len() {
                return Err(self.invalid(format!("{} (tangent)", value.len()), tangent.len()));
            }
        }

        self.arity = Some(value.len());
        let keyframe = Keyframe::new(time, value).with_tangents(in_tangent, out_tangent);

        let idx = self.keyframes.partition_point(|k| k.time < time);
        match self.keyframes.get_mut(idx) {
            Some(existing) if existing.time == time => *existing = keyframe,
            _ => self.keyframes.insert(idx, keyframe),
        }
        self.version += 1;
        Ok(())
    }

    /// Deletes the sample at `time`, if any.
    pub fn remove(&mut self, time: f32) -> Option<Keyframe> {
        let idx = self.index_of(time)?;
        let removed = self.keyframes.remove(idx);
        if self.keyframes.is_empty() {
            self.arity = None;
        }
        self.version += 1;
        Some(removed)
    }

    /// Removes every sample.
    pub fn clear(&mut self) {
        if self.keyframes.is_empty() {
            return;
        }
        self.keyframes.clear();
        self.arity = None;
        self.version += 1;
    }

    /// Indices of the two samples bracketing `t`.
    ///
    /// Outside the authored range both indices point at the first (or last)
    /// sample. Returns `None` for an empty store.
    #[must_use]
    pub fn neighbor_indices(&self, t: f32) -> Option<(usize, usize)> {
        let len = self.keyframes.len();
        if len == 0 {
            return None;
        }
        // First index whose time is strictly after `t`.
        let next = self.keyframes.partition_point(|k| k.time <= t);
        Some(match next {
            0 => (0, 0),
            n if n == len => (len - 1, len - 1),
            n => (n - 1, n),
        })
    }

    /// The two samples bracketing `t` (`t0 <= t <= t1`), clamped to the first
    /// and last sample outside the authored range.
    #[must_use]
    pub fn neighbors(&self, t: f32) -> Option<(&Keyframe, &Keyframe)> {
        let (i0, i1) = self.neighbor_indices(t)?;
        Some((&self.keyframes[i0], &self.keyframes[i1]))
    }

    #[must_use]
    pub fn get(&self, time: f32) -> Option<&Keyframe> {
        self.index_of(time).map(|idx| &self.keyframes[idx])
    }

    fn index_of(&self, time: f32) -> Option<usize> {
        let idx = self.keyframes.partition_point(|k| k.time < time);
        (self.keyframes.get(idx)?.time == time).then_some(idx)
    }

    fn invalid(&self, expected: String, found: usize) -> AnimationError {
        AnimationError::InvalidValue {
            attribute: self.attribute.clone(),
            expected,
            found,
        }
    }

    #[inline]
    #[must_use]
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Timestamp of the last sample, if any.
    #[inline]
    #[must_use]
    pub fn last_time(&self) -> Option<f32> {
        self.keyframes.last().map(|k| k.time)
    }

    #[inline]
    #[must_use]
    pub fn first_time(&self) -> Option<f32> {
        self.keyframes.first().map(|k| k.time)
    }

    /// Revision counter, bumped on every mutation.
    #[inline]
    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    #[must_use]
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> AttributeKind {
        self.kind
    }

    /// Arity of stored values, fixed by the first keyframe.
    #[inline]
    #[must_use]
    pub fn arity(&self) -> Option<usize> {
        self.arity
    }
}
