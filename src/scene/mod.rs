//! Scene Capabilities
//!
//! The animation engine does not own renderable objects or the scene graph.
//! It drives them through the narrow capability traits defined here:
//!
//! - [`Animatable`]: a renderable whose transform, opacity and colors can be set
//! - [`CameraRig`]: the active scene camera
//! - [`Stage`]: the host scene, which resolves [`MemberHandle`]s to objects
//!   and performs scene add/remove on request
//!
//! Members are referenced by handle only; their lifetime is managed by the
//! host. A handle that no longer resolves is skipped during updates.

use bitflags::bitflags;
use glam::{Mat4, Vec3};
use slotmap::new_key_type;

new_key_type! {
    /// Non-owning reference to a renderable object living in the host scene.
    pub struct MemberHandle;
}

bitflags! {
    /// Which attribute setters a renderable honours.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct Capabilities: u32 {
        const TRANSFORM     = 1 << 0;
        const OPACITY       = 1 << 1;
        const VERTEX_COLORS = 1 << 2;
    }
}

/// A renderable object that timelines can animate.
pub trait Animatable {
    /// Attribute groups this object accepts. Timelines refuse to control an
    /// object that reports none.
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn set_position(&mut self, position: Vec3);

    /// Orientation as `[x, y, z]` Euler degrees (see
    /// [`euler_degrees_to_quat`](crate::animation::values::euler_degrees_to_quat)
    /// for the axis order).
    fn set_orientation(&mut self, euler_degrees: Vec3);

    fn set_scale(&mut self, scale: Vec3);

    fn set_opacity(&mut self, opacity: f32);

    /// RGB or RGBA in `[0, 1]`.
    fn set_vertex_colors(&mut self, color: &[f32]);
}

/// The scene camera as seen by camera timelines.
pub trait CameraRig {
    fn position(&self) -> Vec3;
    fn focal_point(&self) -> Vec3;
    fn view_up(&self) -> Vec3;

    fn set_position(&mut self, position: Vec3);
    fn set_focal_point(&mut self, focal: Vec3);
    fn set_view_up(&mut self, up: Vec3);
    fn set_model_transform(&mut self, transform: Mat4);
}

/// Host scene consulted by the update propagator.
pub trait Stage {
    fn member(&self, handle: MemberHandle) -> Option<&dyn Animatable>;

    fn member_mut(&mut self, handle: MemberHandle) -> Option<&mut dyn Animatable>;

    /// Whether the handle refers to a live object of any kind.
    fn contains(&self, handle: MemberHandle) -> bool {
        self.member(handle).is_some()
    }

    /// The active camera, if the scene has one.
    fn camera_mut(&mut self) -> Option<&mut dyn CameraRig>;

    fn add_to_scene(&mut self, handle: MemberHandle);

    fn remove_from_scene(&mut self, handle: MemberHandle);
}
