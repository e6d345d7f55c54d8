use glam::{EulerRot, Mat4, Quat, Vec3};

use crate::animation::channel::ChannelSet;
use crate::animation::timeline::Timeline;
use crate::animation::values::{Value, quat_to_euler_degrees, to_quat, to_vec3};
use crate::scene::{Capabilities, MemberHandle, Stage};

/// Object attributes sampled once per timeline update, then fanned out to
/// every controlled member.
#[derive(Debug, Default)]
struct SampledAttributes {
    position: Option<Vec3>,
    scale: Option<Vec3>,
    opacity: Option<f32>,
    orientation: Option<Vec3>,
    color: Option<Value>,
}

impl Timeline {
    /// Evaluates this timeline and its whole subtree at `t`, writing the
    /// results into `stage`.
    ///
    /// For each node, in depth-first order (parent before children):
    ///
    /// 1. Scene membership is recomputed and, on a change, every member is
    ///    added to or removed from the scene.
    /// 2. Camera channels, if any, are applied to the stage camera.
    /// 3. While in the scene, object channels are applied to every
    ///    controlled member.
    ///
    /// Handles that no longer resolve are skipped.
    pub fn update(&mut self, t: f32, stage: &mut dyn Stage) {
        self.propagate(t, true, stage);
    }

    fn propagate(&mut self, t: f32, parent_in_scene: bool, stage: &mut dyn Stage) {
        let in_scene = parent_in_scene && self.is_inside_scene_at(t);
        self.sync_scene_membership(in_scene, stage);

        if self.camera.is_populated() {
            apply_camera(&self.camera, t, stage);
        }
        if in_scene && self.attribs.is_populated() {
            let sampled = sample_attributes(&self.attribs, t);
            for &handle in &self.members {
                apply_attributes(&sampled, handle, stage);
            }
        }
        self.dirty = false;

        for child in &mut self.children {
            child.propagate(t, in_scene, stage);
        }
    }

    /// Edge-triggered: stage calls happen only when membership flips.
    fn sync_scene_membership(&mut self, in_scene: bool, stage: &mut dyn Stage) {
        if in_scene == self.in_scene {
            return;
        }
        log::debug!(
            "Timeline '{}' {} scene",
            self.name,
            if in_scene { "entering" } else { "leaving" }
        );

        for &handle in self.members.iter().chain(&self.static_members) {
            if in_scene {
                stage.add_to_scene(handle);
            } else {
                stage.remove_from_scene(handle);
            }
        }
        self.in_scene = in_scene;
    }

    /// Takes this subtree out of the scene, for nodes that are being
    /// detached.
    pub(crate) fn leave_scene(&mut self, stage: &mut dyn Stage) {
        self.sync_scene_membership(false, stage);
        for child in &mut self.children {
            child.leave_scene(stage);
        }
    }
}

/// Samples `attribute`, logging and discarding failures so one bad channel
/// leaves the others running.
fn sample_channel(channels: &ChannelSet, attribute: &str, t: f32) -> Option<Value> {
    let channel = channels.interpolatable(attribute)?;
    channel
        .sample(t)
        .inspect_err(|err| log::warn!("Sampling '{attribute}' at {t} failed: {err}"))
        .ok()
}

fn sample_attributes(attribs: &ChannelSet, t: f32) -> SampledAttributes {
    SampledAttributes {
        position: sample_channel(attribs, "position", t).map(|v| to_vec3(&v)),
        scale: sample_channel(attribs, "scale", t).map(|v| to_vec3(&v)),
        opacity: sample_channel(attribs, "opacity", t).and_then(|v| v.first().copied()),
        orientation: sample_channel(attribs, "rotation", t)
            .map(|v| quat_to_euler_degrees(to_quat(&v))),
        color: sample_channel(attribs, "color", t),
    }
}

fn apply_attributes(sampled: &SampledAttributes, handle: MemberHandle, stage: &mut dyn Stage) {
    let Some(member) = stage.member_mut(handle) else {
        log::debug!("Member {handle:?} no longer resolves, skipping");
        return;
    };
    let capabilities = member.capabilities();

    if capabilities.contains(Capabilities::TRANSFORM) {
        if let Some(position) = sampled.position {
            member.set_position(position);
        }
        if let Some(scale) = sampled.scale {
            member.set_scale(scale);
        }
    }
    if capabilities.contains(Capabilities::OPACITY)
        && let Some(opacity) = sampled.opacity
    {
        member.set_opacity(opacity);
    }
    if capabilities.contains(Capabilities::TRANSFORM)
        && let Some(orientation) = sampled.orientation
    {
        member.set_orientation(orientation);
    }
    if capabilities.contains(Capabilities::VERTEX_COLORS)
        && let Some(color) = &sampled.color
    {
        member.set_vertex_colors(color);
    }
}

fn apply_camera(camera_channels: &ChannelSet, t: f32, stage: &mut dyn Stage) {
    let Some(camera) = stage.camera_mut() else {
        log::trace!("Camera keyframes present but the stage has no camera");
        return;
    };

    if let Some(position) = sample_channel(camera_channels, "position", t) {
        camera.set_position(to_vec3(&position));
    }
    if let Some(focal) = sample_channel(camera_channels, "focal", t) {
        camera.set_focal_point(to_vec3(&focal));
    }
    match sample_channel(camera_channels, "view_up", t) {
        Some(up) => camera.set_view_up(to_vec3(&up)),
        None => camera.set_view_up(Vec3::Y),
    }
    if let Some(rotation) = sample_channel(camera_channels, "rotation", t) {
        let pivot = camera.position();
        camera.set_model_transform(camera_rotation_about(pivot, to_vec3(&rotation)));
    }
}

/// Rotation by the negated `[x, y, z]` Euler degrees (extrinsic X, Y, Z)
/// about `pivot`.
#[must_use]
pub fn camera_rotation_about(pivot: Vec3, euler_degrees: Vec3) -> Mat4 {
    let angles = -euler_degrees * (std::f32::consts::PI / 180.0);
    let rotation = Quat::from_euler(EulerRot::ZYX, angles.z, angles.y, angles.x);
    Mat4::from_translation(pivot) * Mat4::from_quat(rotation) * Mat4::from_translation(-pivot)
}
