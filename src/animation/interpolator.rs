#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::{Quat, Vec4};

use crate::animation::keyframe::KeyframeStore;
use crate::animation::values::{Interpolatable, IntoValue, Value, to_quat};
use crate::errors::{AnimationError, Result};

/// Strategy used to blend between two bracketing keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Interpolation {
    /// Hold the value of the keyframe at or before the query time.
    Step,
    /// Component-wise linear blend.
    #[default]
    Linear,
    /// Cubic Hermite spline using per-keyframe tangents (missing tangents are zero).
    CubicHermite,
    /// Shortest-arc quaternion slerp. Rotation channels only.
    Spherical,
}

impl Interpolation {
    /// Strategy a new channel starts with.
    #[must_use]
    pub fn default_for(store: &KeyframeStore) -> Self {
        if store.kind().is_quaternion() {
            Self::Spherical
        } else {
            Self::Linear
        }
    }

    /// Whether this strategy can drive the given store.
    #[must_use]
    pub fn supports(self, store: &KeyframeStore) -> bool {
        !matches!(self, Self::Spherical) || store.kind().is_quaternion()
    }
}

/// Samples a [`KeyframeStore`] with a fixed [`Interpolation`].
///
/// The interpolator caches per-keyframe setup (resolved tangents, unit
/// quaternions). That cache is tied to the store revision it was built from:
/// after any mutation of the store, [`rebuild`](Self::rebuild) must be called
/// before the next [`interpolate`](Self::interpolate), which otherwise fails
/// with [`AnimationError::StaleInterpolator`].
#[derive(Debug, Clone)]
pub struct Interpolator {
    interpolation: Interpolation,
    built_version: Option<u64>,
    /// `(in, out)` tangents per keyframe, zero-filled where not authored.
    tangents: Vec<(Value, Value)>,
    /// Normalized rotations per keyframe (quaternion channels only).
    rotations: Vec<Quat>,
}

impl Interpolator {
    /// Creates an interpolator with the default strategy for `store`.
    #[must_use]
    pub fn for_store(store: &KeyframeStore) -> Self {
        let mut interpolator = Self {
            interpolation: Interpolation::default_for(store),
            built_version: None,
            tangents: Vec::new(),
            rotations: Vec::new(),
        };
        interpolator.rebuild(store);
        interpolator
    }

    /// Creates an interpolator already built against `store`.
    pub fn new(interpolation: Interpolation, store: &KeyframeStore) -> Result<Self> {
        if !interpolation.supports(store) {
            return Err(AnimationError::UnsupportedInterpolation {
                attribute: store.attribute().to_string(),
                interpolation,
            });
        }
        let mut interpolator = Self {
            interpolation,
            built_version: None,
            tangents: Vec::new(),
            rotations: Vec::new(),
        };
        interpolator.rebuild(store);
        Ok(interpolator)
    }

    #[inline]
    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    /// Whether the cached setup matches the current revision of `store`.
    #[inline]
    #[must_use]
    pub fn is_fresh(&self, store: &KeyframeStore) -> bool {
        self.built_version == Some(store.version())
    }

    /// Refreshes the cached setup from `store`.
    pub fn rebuild(&mut self, store: &KeyframeStore) {
        self.tangents.clear();
        self.rotations.clear();

        match self.interpolation {
            Interpolation::CubicHermite => {
                self.tangents.extend(store.keyframes().iter().map(|k| {
                    let zero = || Value::from_elem(0.0, k.value.len());
                    (
                        k.in_tangent.clone().unwrap_or_else(zero),
                        k.out_tangent.clone().unwrap_or_else(zero),
                    )
                }));
            }
            Interpolation::Step | Interpolation::Linear | Interpolation::Spherical => {}
        }
        if store.kind().is_quaternion() {
            self.rotations
                .extend(store.keyframes().iter().map(|k| to_quat(&k.value).normalize()));
        }

        self.built_version = Some(store.version());
    }

    /// Computes the value of `store` at `t`.
    ///
    /// A store with a single keyframe yields that keyframe for every `t`;
    /// outside the authored range the first/last value is held.
    pub fn interpolate(&self, store: &KeyframeStore, t: f32) -> Result<Value> {
        if !self.is_fresh(store) {
            return Err(AnimationError::StaleInterpolator {
                attribute: store.attribute().to_string(),
            });
        }
        let Some((i0, i1)) = store.neighbor_indices(t) else {
            return Err(AnimationError::NotInterpolatable {
                attribute: store.attribute().to_string(),
            });
        };

        let keyframes = store.keyframes();
        let (k0, k1) = (&keyframes[i0], &keyframes[i1]);
        if i0 == i1 {
            return Ok(k0.value.clone());
        }

        let dt = k1.time - k0.time;
        let tau = if dt > 0.0 {
            ((t - k0.time) / dt).clamp(0.0, 1.0)
        } else {
            0.0
        };

        // Boundary samples are returned untouched.
        if tau == 0.0 || self.interpolation == Interpolation::Step {
            return Ok(k0.value.clone());
        }
        if tau == 1.0 {
            return Ok(k1.value.clone());
        }

        if store.kind().is_quaternion() {
            return Ok(self.blend_rotation(i0, i1, tau, dt));
        }
        Ok(match self.interpolation {
            Interpolation::Step | Interpolation::Spherical => k0.value.clone(),
            Interpolation::Linear => Value::interpolate_linear(&k0.value, &k1.value, tau),
            Interpolation::CubicHermite => {
                let (_, out_tangent0) = &self.tangents[i0];
                let (in_tangent1, _) = &self.tangents[i1];
                Value::interpolate_cubic(&k0.value, out_tangent0, in_tangent1, &k1.value, tau, dt)
            }
        })
    }

    /// Blends two rotation keyframes. The end quaternion (and its tangent) is
    /// moved onto the hemisphere of the start so that `q` and `-q` never
    /// cancel out; a degenerate blend holds the start rotation.
    fn blend_rotation(&self, i0: usize, i1: usize, tau: f32, dt: f32) -> Value {
        let (q0, q1) = (self.rotations[i0], self.rotations[i1]);
        if self.interpolation == Interpolation::Spherical {
            return slerp_shortest(q0, q1, tau).into_value();
        }

        let flip = q0.dot(q1) < 0.0;
        let q1 = if flip { -q1 } else { q1 };
        let blended = match self.interpolation {
            Interpolation::CubicHermite => {
                let (_, out_tangent0) = &self.tangents[i0];
                let (in_tangent1, _) = &self.tangents[i1];
                let in_tangent1: Value = if flip {
                    in_tangent1.iter().map(|c| -c).collect()
                } else {
                    in_tangent1.clone()
                };
                to_quat(&Value::interpolate_cubic(
                    &q0.into_value(),
                    out_tangent0,
                    &in_tangent1,
                    &q1.into_value(),
                    tau,
                    dt,
                ))
            }
            _ => to_quat(&Value::interpolate_linear(&q0.into_value(), &q1.into_value(), tau)),
        };

        Vec4::from(blended)
            .try_normalize()
            .map_or(q0, Quat::from_vec4)
            .into_value()
    }
}

/// Shortest-arc spherical interpolation between two unit quaternions.
///
/// `end` is flipped onto the hemisphere of `start` before blending and the
/// result is renormalized.
#[must_use]
pub fn slerp_shortest(start: Quat, end: Quat, t: f32) -> Quat {
    let end = if start.dot(end) < 0.0 { -end } else { end };
    start.slerp(end, t).normalize()
}
