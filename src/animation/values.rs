use glam::{EulerRot, Quat, Vec3, Vec4};
use smallvec::SmallVec;

/// Keyframe payload: 1 to 4 components stored inline.
pub type Value = SmallVec<[f32; 4]>;

/// Conversion into a keyframe [`Value`].
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for f32 {
    fn into_value(self) -> Value {
        smallvec::smallvec![self]
    }
}

impl<const N: usize> IntoValue for [f32; N] {
    fn into_value(self) -> Value {
        Value::from_slice(&self)
    }
}

impl IntoValue for &[f32] {
    fn into_value(self) -> Value {
        Value::from_slice(self)
    }
}

impl IntoValue for Vec<f32> {
    fn into_value(self) -> Value {
        Value::from_vec(self)
    }
}

impl IntoValue for Vec3 {
    fn into_value(self) -> Value {
        Value::from_slice(&self.to_array())
    }
}

impl IntoValue for Vec4 {
    fn into_value(self) -> Value {
        Value::from_slice(&self.to_array())
    }
}

impl IntoValue for Quat {
    fn into_value(self) -> Value {
        Value::from_slice(&self.to_array())
    }
}

/// How an attribute constrains and normalizes the values written to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// Exactly three components (position, scale, camera vectors).
    Vector3,
    /// Euler degrees (3) or quaternion `[x, y, z, w]` (4); stored as a quaternion.
    Rotation,
    /// RGB (3) or RGBA (4).
    Color,
    /// A single component (opacity).
    Scalar,
    /// Any arity; the first keyframe fixes it for the channel.
    Custom,
}

impl AttributeKind {
    /// Resolves the kind of a named attribute in the object or camera namespace.
    #[must_use]
    pub fn resolve(name: &str, camera: bool) -> Self {
        if camera {
            return match name {
                "position" | "focal" | "view_up" | "rotation" => Self::Vector3,
                _ => Self::Custom,
            };
        }
        match name {
            "position" | "scale" => Self::Vector3,
            "rotation" => Self::Rotation,
            "color" => Self::Color,
            "opacity" => Self::Scalar,
            _ => Self::Custom,
        }
    }

    /// Whether a raw (pre-normalization) value of `arity` components is accepted.
    #[must_use]
    pub fn accepts(self, arity: usize) -> bool {
        match self {
            Self::Vector3 => arity == 3,
            Self::Rotation | Self::Color => arity == 3 || arity == 4,
            Self::Scalar => arity == 1,
            Self::Custom => arity > 0,
        }
    }

    /// Whether the components of an accepted value are usable. Rotations
    /// must be finite, and quaternions must have a non-zero length.
    #[must_use]
    pub fn is_well_formed(self, value: &[f32]) -> bool {
        match self {
            Self::Rotation => {
                value.iter().all(|c| c.is_finite())
                    && (value.len() == 3 || to_quat(value).length_squared() > f32::EPSILON)
            }
            _ => true,
        }
    }

    #[must_use]
    pub fn describe(self) -> &'static str {
        match self {
            Self::Vector3 => "3",
            Self::Rotation | Self::Color => "3 or 4",
            Self::Scalar => "1",
            Self::Custom => "at least 1",
        }
    }

    /// Converts an accepted raw value into its stored form.
    ///
    /// Rotations given as Euler degrees become unit quaternions; everything
    /// else is stored as written.
    #[must_use]
    pub fn normalize(self, value: Value) -> Value {
        match self {
            Self::Rotation if value.len() == 3 => {
                euler_degrees_to_quat(Vec3::new(value[0], value[1], value[2])).into_value()
            }
            _ => value,
        }
    }

    /// Whether the stored values of this kind are unit quaternions.
    #[inline]
    #[must_use]
    pub fn is_quaternion(self) -> bool {
        matches!(self, Self::Rotation)
    }
}

// ============================================================================
// Rotation convention
// ============================================================================
//
// Euler input is `[x, y, z]` in degrees, applied as extrinsic rotations about
// Z, then X, then Y (R = Ry * Rx * Rz). glam spells this `EulerRot::YXZ` with
// the angles passed in (y, x, z) order.

/// Converts `[x, y, z]` Euler degrees to a unit quaternion.
#[must_use]
pub fn euler_degrees_to_quat(euler: Vec3) -> Quat {
    Quat::from_euler(
        EulerRot::YXZ,
        euler.y.to_radians(),
        euler.x.to_radians(),
        euler.z.to_radians(),
    )
}

/// Converts a quaternion back to `[x, y, z]` Euler degrees.
#[must_use]
pub fn quat_to_euler_degrees(rotation: Quat) -> Vec3 {
    let (y, x, z) = rotation.to_euler(EulerRot::YXZ);
    Vec3::new(x.to_degrees(), y.to_degrees(), z.to_degrees())
}

#[inline]
#[must_use]
pub fn to_vec3(value: &[f32]) -> Vec3 {
    Vec3::new(
        value.first().copied().unwrap_or_default(),
        value.get(1).copied().unwrap_or_default(),
        value.get(2).copied().unwrap_or_default(),
    )
}

/// Reads a stored `[x, y, z, w]` quaternion.
#[inline]
#[must_use]
pub fn to_quat(value: &[f32]) -> Quat {
    match value {
        [x, y, z, w, ..] => Quat::from_xyzw(*x, *y, *z, *w),
        _ => Quat::IDENTITY,
    }
}

/// Reads a color, defaulting alpha to 1 for RGB values.
#[inline]
#[must_use]
pub fn to_rgba(value: &[f32]) -> Vec4 {
    to_vec3(value).extend(value.get(3).copied().unwrap_or(1.0))
}

// ============================================================================
// Component-wise blending
// ============================================================================

pub trait Interpolatable: Sized {
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self;

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self;
}

impl Interpolatable for Value {
    // `a * (1 - t) + b * t` keeps both endpoints bit-exact.
    fn interpolate_linear(start: &Self, end: &Self, t: f32) -> Self {
        start
            .iter()
            .zip(end.iter())
            .map(|(a, b)| a * (1.0 - t) + b * t)
            .collect()
    }

    fn interpolate_cubic(
        v0: &Self,
        out_tangent0: &Self,
        in_tangent1: &Self,
        v1: &Self,
        t: f32,
        dt: f32,
    ) -> Self {
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        (0..v0.len())
            .map(|i| {
                let m0 = out_tangent0.get(i).copied().unwrap_or_default() * dt;
                let m1 = in_tangent1.get(i).copied().unwrap_or_default() * dt;
                h00 * v0[i] + h10 * m0 + h01 * v1.get(i).copied().unwrap_or_default() + h11 * m1
            })
            .collect()
    }
}
