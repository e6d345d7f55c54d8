#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use glam::{Quat, Vec3, Vec4};

use crate::animation::channel::{Channel, ChannelSet};
use crate::animation::ingest::BatchReport;
use crate::animation::interpolator::Interpolation;
use crate::animation::keyframe::Keyframe;
use crate::animation::values::{
    IntoValue, Value, quat_to_euler_degrees, to_quat, to_rgba, to_vec3,
};
use crate::errors::{AnimationError, Result};
use crate::scene::{MemberHandle, Stage};
use crate::settings::TimelineSettings;

/// Which channel namespace of a timeline an attribute lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Namespace {
    /// Attributes applied to the controlled members.
    #[default]
    Object,
    /// Properties applied to the scene camera.
    Camera,
}

/// A node of the animation tree.
///
/// A timeline owns its object and camera channels and its child timelines.
/// It references (but does not own) the renderable members it drives:
///
/// - *controlled* members receive interpolated attributes every update
/// - *static* members only follow the timeline into and out of the scene
///
/// Timelines hold no clock. [`update`](Self::update) evaluates the whole
/// subtree at the timestamp it is given; playback lives in
/// [`TimelinePlayer`](crate::animation::TimelinePlayer) at the root.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub name: String,

    pub(crate) attribs: ChannelSet,
    pub(crate) camera: ChannelSet,

    pub(crate) members: Vec<MemberHandle>,
    pub(crate) static_members: Vec<MemberHandle>,
    pub(crate) children: Vec<Timeline>,

    // === Scene-membership window: [entry, exit) ===
    entry: f32,
    exit: Option<f32>,
    pub(crate) in_scene: bool,

    length: Option<f32>,
    final_timestamp: f32,
    motion_path_resolution: usize,

    /// Set by authoring calls that must be reflected at the current time.
    pub(crate) dirty: bool,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(&TimelineSettings::default())
    }

    #[must_use]
    pub fn with_settings(settings: &TimelineSettings) -> Self {
        Self {
            name: "Timeline".to_string(),
            attribs: ChannelSet::new(false),
            camera: ChannelSet::new(true),
            members: Vec::new(),
            static_members: Vec::new(),
            children: Vec::new(),
            entry: settings.entry,
            exit: settings.exit,
            in_scene: false,
            length: settings.length,
            final_timestamp: settings.length.unwrap_or(0.0),
            motion_path_resolution: settings.motion_path_resolution,
            dirty: false,
        }
    }

    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // ========================================================================
    // Keyframes
    // ========================================================================

    /// Sets an object-attribute keyframe.
    pub fn set_keyframe(&mut self, attribute: &str, time: f32, value: impl IntoValue) -> Result<()> {
        self.write_keyframe(Namespace::Object, attribute, time, value.into_value(), None, None)
    }

    /// Sets an object-attribute keyframe with cubic tangents.
    pub fn set_keyframe_with_tangents(
        &mut self,
        attribute: &str,
        time: f32,
        value: impl IntoValue,
        in_tangent: Option<Value>,
        out_tangent: Option<Value>,
    ) -> Result<()> {
        self.write_keyframe(
            Namespace::Object,
            attribute,
            time,
            value.into_value(),
            in_tangent,
            out_tangent,
        )
    }

    /// Sets a camera-property keyframe.
    pub fn set_camera_keyframe(
        &mut self,
        attribute: &str,
        time: f32,
        value: impl IntoValue,
    ) -> Result<()> {
        self.write_keyframe(Namespace::Camera, attribute, time, value.into_value(), None, None)
    }

    pub fn set_camera_keyframe_with_tangents(
        &mut self,
        attribute: &str,
        time: f32,
        value: impl IntoValue,
        in_tangent: Option<Value>,
        out_tangent: Option<Value>,
    ) -> Result<()> {
        self.write_keyframe(
            Namespace::Camera,
            attribute,
            time,
            value.into_value(),
            in_tangent,
            out_tangent,
        )
    }

    /// Writes a keyframe into `namespace`, creating the channel on first use.
    ///
    /// Extends the cached final timestamp when `time` lies beyond it, and
    /// marks the tree for re-evaluation at the current time when `time > 0`.
    pub fn write_keyframe(
        &mut self,
        namespace: Namespace,
        attribute: &str,
        time: f32,
        value: Value,
        in_tangent: Option<Value>,
        out_tangent: Option<Value>,
    ) -> Result<()> {
        self.channels_mut(namespace)
            .get_or_create(attribute)
            .set(time, value, in_tangent, out_tangent)?;

        if self.length.is_none() && time > self.final_timestamp {
            self.final_timestamp = time;
        }
        if time > 0.0 {
            self.dirty = true;
        }
        Ok(())
    }

    /// Sets several keyframes of one object attribute.
    ///
    /// Each keyframe is validated on its own; malformed ones are skipped with a
    /// warning and counted in the report.
    pub fn set_keyframes<V, I>(&mut self, attribute: &str, keyframes: I) -> BatchReport
    where
        V: IntoValue,
        I: IntoIterator<Item = (f32, V)>,
    {
        self.write_keyframes(Namespace::Object, attribute, keyframes)
    }

    pub fn set_camera_keyframes<V, I>(&mut self, attribute: &str, keyframes: I) -> BatchReport
    where
        V: IntoValue,
        I: IntoIterator<Item = (f32, V)>,
    {
        self.write_keyframes(Namespace::Camera, attribute, keyframes)
    }

    fn write_keyframes<V, I>(
        &mut self,
        namespace: Namespace,
        attribute: &str,
        keyframes: I,
    ) -> BatchReport
    where
        V: IntoValue,
        I: IntoIterator<Item = (f32, V)>,
    {
        let mut report = BatchReport::default();
        for (time, value) in keyframes {
            let result =
                self.write_keyframe(namespace, attribute, time, value.into_value(), None, None);
            report.record(attribute, time, result);
        }
        report
    }

    /// Deletes the keyframe of `attribute` at `time`, if present.
    pub fn remove_keyframe(
        &mut self,
        namespace: Namespace,
        attribute: &str,
        time: f32,
    ) -> Option<Keyframe> {
        let removed = self.channels_mut(namespace).get_mut(attribute)?.remove(time)?;
        self.dirty = true;
        self.update_final_timestamp();
        Some(removed)
    }

    /// Rebinds the interpolation strategy of an object attribute.
    ///
    /// Does nothing if the attribute has no keyframes yet.
    pub fn set_interpolator(&mut self, attribute: &str, interpolation: Interpolation) -> Result<()> {
        self.rebind(Namespace::Object, attribute, interpolation)
    }

    pub fn set_camera_interpolator(
        &mut self,
        attribute: &str,
        interpolation: Interpolation,
    ) -> Result<()> {
        self.rebind(Namespace::Camera, attribute, interpolation)
    }

    fn rebind(
        &mut self,
        namespace: Namespace,
        attribute: &str,
        interpolation: Interpolation,
    ) -> Result<()> {
        match self.channels_mut(namespace).get_mut(attribute) {
            Some(channel) if channel.is_interpolatable() => {
                channel.set_interpolation(interpolation)?;
                self.dirty = true;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    pub fn set_position_interpolator(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_interpolator("position", interpolation)
    }

    pub fn set_rotation_interpolator(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_interpolator("rotation", interpolation)
    }

    pub fn set_scale_interpolator(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_interpolator("scale", interpolation)
    }

    pub fn set_color_interpolator(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_interpolator("color", interpolation)
    }

    pub fn set_opacity_interpolator(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_interpolator("opacity", interpolation)
    }

    pub fn set_camera_position_interpolator(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_camera_interpolator("position", interpolation)
    }

    pub fn set_camera_focal_interpolator(&mut self, interpolation: Interpolation) -> Result<()> {
        self.set_camera_interpolator("focal", interpolation)
    }

    /// Current strategy of an attribute, if its channel exists.
    #[must_use]
    pub fn interpolation(&self, namespace: Namespace, attribute: &str) -> Option<Interpolation> {
        self.channels(namespace).get(attribute).map(Channel::interpolation)
    }

    /// `true` if the attribute has at least one keyframe and can be sampled.
    #[must_use]
    pub fn is_interpolatable(&self, attribute: &str, camera: bool) -> bool {
        let namespace = if camera {
            Namespace::Camera
        } else {
            Namespace::Object
        };
        self.channels(namespace).interpolatable(attribute).is_some()
    }

    /// `true` once any camera property has keyframes.
    #[must_use]
    pub fn is_camera_animated(&self) -> bool {
        self.camera.is_populated()
    }

    #[must_use]
    pub fn channels(&self, namespace: Namespace) -> &ChannelSet {
        match namespace {
            Namespace::Object => &self.attribs,
            Namespace::Camera => &self.camera,
        }
    }

    fn channels_mut(&mut self, namespace: Namespace) -> &mut ChannelSet {
        match namespace {
            Namespace::Object => &mut self.attribs,
            Namespace::Camera => &mut self.camera,
        }
    }

    // ========================================================================
    // Attribute setters
    // ========================================================================

    pub fn set_position(&mut self, time: f32, position: impl IntoValue) -> Result<()> {
        self.set_keyframe("position", time, position)
    }

    /// Rotation keyframe as `[x, y, z]` Euler degrees or an `[x, y, z, w]`
    /// quaternion. Any other arity is reported and the keyframe is skipped.
    pub fn set_rotation(&mut self, time: f32, rotation: impl IntoValue) -> Result<()> {
        let rotation = rotation.into_value();
        self.set_keyframe("rotation", time, rotation).inspect_err(|err| {
            log::warn!("Rotation keyframe at {time} skipped: {err}");
        })
    }

    /// Rotation keyframe from a rotation vector (axis scaled by angle in radians).
    pub fn set_rotation_as_vector(&mut self, time: f32, vector: Vec3) -> Result<()> {
        self.set_keyframe("rotation", time, Quat::from_scaled_axis(vector))
    }

    pub fn set_scale(&mut self, time: f32, scale: impl IntoValue) -> Result<()> {
        self.set_keyframe("scale", time, scale)
    }

    /// RGB or RGBA color in `[0, 1]`.
    pub fn set_color(&mut self, time: f32, color: impl IntoValue) -> Result<()> {
        self.set_keyframe("color", time, color)
    }

    /// Opacity in `[0, 1]`.
    pub fn set_opacity(&mut self, time: f32, opacity: f32) -> Result<()> {
        self.set_keyframe("opacity", time, opacity)
    }

    pub fn set_position_keyframes<V, I>(&mut self, keyframes: I) -> BatchReport
    where
        V: IntoValue,
        I: IntoIterator<Item = (f32, V)>,
    {
        self.set_keyframes("position", keyframes)
    }

    pub fn set_rotation_keyframes<V, I>(&mut self, keyframes: I) -> BatchReport
    where
        V: IntoValue,
        I: IntoIterator<Item = (f32, V)>,
    {
        self.set_keyframes("rotation", keyframes)
    }

    pub fn set_scale_keyframes<V, I>(&mut self, keyframes: I) -> BatchReport
    where
        V: IntoValue,
        I: IntoIterator<Item = (f32, V)>,
    {
        self.set_keyframes("scale", keyframes)
    }

    pub fn set_color_keyframes<V, I>(&mut self, keyframes: I) -> BatchReport
    where
        V: IntoValue,
        I: IntoIterator<Item = (f32, V)>,
    {
        self.set_keyframes("color", keyframes)
    }

    pub fn set_opacity_keyframes<I>(&mut self, keyframes: I) -> BatchReport
    where
        I: IntoIterator<Item = (f32, f32)>,
    {
        self.set_keyframes("opacity", keyframes)
    }

    pub fn set_camera_position(&mut self, time: f32, position: impl IntoValue) -> Result<()> {
        self.set_camera_keyframe("position", time, position)
    }

    pub fn set_camera_focal(&mut self, time: f32, focal: impl IntoValue) -> Result<()> {
        self.set_camera_keyframe("focal", time, focal)
    }

    pub fn set_camera_view_up(&mut self, time: f32, direction: impl IntoValue) -> Result<()> {
        self.set_camera_keyframe("view_up", time, direction)
    }

    /// Camera rotation as `[x, y, z]` Euler degrees.
    pub fn set_camera_rotation(&mut self, time: f32, euler: impl IntoValue) -> Result<()> {
        self.set_camera_keyframe("rotation", time, euler)
    }

    // ========================================================================
    // Attribute getters
    // ========================================================================

    /// Interpolated value of an object attribute at `t`.
    pub fn value_at(&self, attribute: &str, t: f32) -> Result<Value> {
        Self::sample(&self.attribs, attribute, t)
    }

    /// Interpolated value of a camera property at `t`.
    pub fn camera_value_at(&self, attribute: &str, t: f32) -> Result<Value> {
        Self::sample(&self.camera, attribute, t)
    }

    pub(crate) fn sample(channels: &ChannelSet, attribute: &str, t: f32) -> Result<Value> {
        channels
            .get(attribute)
            .ok_or_else(|| AnimationError::NotInterpolatable {
                attribute: attribute.to_string(),
            })?
            .sample(t)
    }

    pub fn position_at(&self, t: f32) -> Result<Vec3> {
        self.value_at("position", t).map(|v| to_vec3(&v))
    }

    /// Interpolated rotation as a quaternion.
    pub fn rotation_at(&self, t: f32) -> Result<Quat> {
        self.value_at("rotation", t).map(|v| to_quat(&v))
    }

    /// Interpolated rotation as `[x, y, z]` Euler degrees.
    pub fn rotation_euler_at(&self, t: f32) -> Result<Vec3> {
        self.rotation_at(t).map(quat_to_euler_degrees)
    }

    pub fn scale_at(&self, t: f32) -> Result<Vec3> {
        self.value_at("scale", t).map(|v| to_vec3(&v))
    }

    /// Interpolated color; alpha is 1 for RGB channels.
    pub fn color_at(&self, t: f32) -> Result<Vec4> {
        self.value_at("color", t).map(|v| to_rgba(&v))
    }

    pub fn opacity_at(&self, t: f32) -> Result<f32> {
        self.value_at("opacity", t)
            .map(|v| v.first().copied().unwrap_or(1.0))
    }

    pub fn camera_position_at(&self, t: f32) -> Result<Vec3> {
        self.camera_value_at("position", t).map(|v| to_vec3(&v))
    }

    pub fn camera_focal_at(&self, t: f32) -> Result<Vec3> {
        self.camera_value_at("focal", t).map(|v| to_vec3(&v))
    }

    pub fn camera_view_up_at(&self, t: f32) -> Result<Vec3> {
        self.camera_value_at("view_up", t).map(|v| to_vec3(&v))
    }

    /// Interpolated camera rotation in Euler degrees.
    pub fn camera_rotation_at(&self, t: f32) -> Result<Vec3> {
        self.camera_value_at("rotation", t).map(|v| to_vec3(&v))
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Adds a member whose attributes this timeline controls.
    ///
    /// The member must resolve in `stage` and expose at least one animatable
    /// capability. If the timeline is already in the scene the member joins
    /// the scene immediately.
    pub fn add_member(&mut self, stage: &mut dyn Stage, handle: MemberHandle) -> Result<()> {
        let Some(member) = stage.member(handle) else {
            return Err(AnimationError::UnsupportedMemberType {
                handle,
                reason: "not present in the stage",
            });
        };
        if member.capabilities().is_empty() {
            return Err(AnimationError::UnsupportedMemberType {
                handle,
                reason: "exposes no animatable capabilities",
            });
        }
        if !self.members.contains(&handle) {
            self.members.push(handle);
            if self.in_scene {
                stage.add_to_scene(handle);
            }
            self.dirty = true;
        }
        Ok(())
    }

    /// Adds a member that is never animated but enters and leaves the scene
    /// together with this timeline.
    pub fn add_static_member(&mut self, stage: &mut dyn Stage, handle: MemberHandle) -> Result<()> {
        if !stage.contains(handle) {
            return Err(AnimationError::UnsupportedMemberType {
                handle,
                reason: "not present in the stage",
            });
        }
        if !self.static_members.contains(&handle) {
            self.static_members.push(handle);
            if self.in_scene {
                stage.add_to_scene(handle);
            }
        }
        Ok(())
    }

    /// Forgets a controlled or static member, taking it out of the scene if
    /// this timeline currently has it there. Returns `false` if unknown.
    pub fn remove_member(&mut self, stage: &mut dyn Stage, handle: MemberHandle) -> bool {
        let before = self.members.len() + self.static_members.len();
        self.members.retain(|h| *h != handle);
        self.static_members.retain(|h| *h != handle);
        let removed = before != self.members.len() + self.static_members.len();
        if removed && self.in_scene {
            stage.remove_from_scene(handle);
        }
        removed
    }

    /// Forgets every controlled member, taking them out of the scene while
    /// this timeline is in it.
    pub fn clear_members(&mut self, stage: &mut dyn Stage) {
        for handle in self.members.drain(..) {
            if self.in_scene {
                stage.remove_from_scene(handle);
            }
        }
    }

    #[inline]
    #[must_use]
    pub fn members(&self) -> &[MemberHandle] {
        &self.members
    }

    #[inline]
    #[must_use]
    pub fn static_members(&self) -> &[MemberHandle] {
        &self.static_members
    }

    // ========================================================================
    // Children
    // ========================================================================

    /// Appends a child timeline and returns its index.
    ///
    /// Children are evaluated at their parent's timestamp.
    pub fn add_child(&mut self, mut child: Timeline) -> usize {
        let child_final = child.update_final_timestamp();
        if self.length.is_none() {
            self.final_timestamp = self.final_timestamp.max(child_final);
        }
        self.children.push(child);
        self.dirty = true;
        self.children.len() - 1
    }

    /// Detaches and returns all child timelines. Members of detached
    /// subtrees are taken out of the scene.
    pub fn remove_children(&mut self, stage: &mut dyn Stage) -> Vec<Timeline> {
        let mut children = std::mem::take(&mut self.children);
        for child in &mut children {
            child.leave_scene(stage);
        }
        self.update_final_timestamp();
        children
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[Timeline] {
        &self.children
    }

    #[inline]
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&Timeline> {
        self.children.get(index)
    }

    /// Mutable access to a child. Call
    /// [`update_final_timestamp`](Self::update_final_timestamp) on the root
    /// after extending a child, or let the player do it.
    #[inline]
    pub fn child_mut(&mut self, index: usize) -> Option<&mut Timeline> {
        self.children.get_mut(index)
    }

    // ========================================================================
    // Scene membership window
    // ========================================================================

    /// Timestamp at which the members enter the scene (default 0).
    pub fn add_to_scene_at(&mut self, timestamp: f32) {
        self.entry = timestamp;
        self.dirty = true;
    }

    /// Timestamp at which the members leave the scene (default: never).
    pub fn remove_from_scene_at(&mut self, timestamp: Option<f32>) {
        self.exit = timestamp;
        self.dirty = true;
    }

    /// Whether `t` falls inside `[entry, exit)`.
    #[must_use]
    pub fn is_inside_scene_at(&self, t: f32) -> bool {
        t >= self.entry && self.exit.is_none_or(|exit| t < exit)
    }

    #[inline]
    #[must_use]
    pub fn entry(&self) -> f32 {
        self.entry
    }

    #[inline]
    #[must_use]
    pub fn exit(&self) -> Option<f32> {
        self.exit
    }

    /// Membership state after the last update.
    #[inline]
    #[must_use]
    pub fn in_scene(&self) -> bool {
        self.in_scene
    }

    // ========================================================================
    // Duration
    // ========================================================================

    /// Fixes the duration, overriding the keyframe-derived final timestamp.
    pub fn set_length(&mut self, length: Option<f32>) {
        self.length = length.filter(|len| len.is_finite() && *len >= 0.0);
        self.update_final_timestamp();
    }

    #[inline]
    #[must_use]
    pub fn length(&self) -> Option<f32> {
        self.length
    }

    /// Cached final timestamp.
    #[inline]
    #[must_use]
    pub fn final_timestamp(&self) -> f32 {
        self.final_timestamp
    }

    /// Recomputes the final timestamp of this subtree: the fixed length if
    /// set, otherwise the latest keyframe across own channels and children.
    pub fn update_final_timestamp(&mut self) -> f32 {
        let children_final = self
            .children
            .iter_mut()
            .map(Timeline::update_final_timestamp)
            .fold(0.0_f32, f32::max);

        self.final_timestamp = match self.length {
            Some(length) => length,
            None => [self.attribs.last_time(), self.camera.last_time()]
                .into_iter()
                .flatten()
                .fold(children_final, f32::max),
        };
        self.final_timestamp
    }

    /// `true` if this timeline or a descendant was edited since its last update.
    #[must_use]
    pub fn needs_update(&self) -> bool {
        self.dirty || self.children.iter().any(Timeline::needs_update)
    }

    #[inline]
    #[must_use]
    pub fn motion_path_resolution(&self) -> usize {
        self.motion_path_resolution
    }

    pub fn set_motion_path_resolution(&mut self, resolution: usize) {
        self.motion_path_resolution = resolution;
    }
}
