//! Timeline Tests
//!
//! Tests for:
//! - Keyframe authoring and attribute getters
//! - Member registration and attribute application
//! - Scene-membership window (edge-triggered add/remove)
//! - Camera animation
//! - Child propagation and final timestamp
//! - Batch ingestion and motion paths

mod common;

use glam::{Quat, Vec3, Vec4};

use common::{MockStage, SceneEvent, approx, approx_vec3};
use kinema::animation::values::Value;
use kinema::animation::{Interpolation, KeyframeBatch, Namespace, Timeline};
use kinema::errors::AnimationError;
use kinema::scene::Capabilities;
use kinema::settings::TimelineSettings;

fn moving_timeline() -> Timeline {
    let mut timeline = Timeline::new();
    timeline.set_position(0.0, Vec3::ZERO).unwrap();
    timeline.set_position(10.0, Vec3::new(10.0, 20.0, 30.0)).unwrap();
    timeline
}

// ============================================================================
// Authoring
// ============================================================================

#[test]
fn linear_then_step_position() {
    let mut timeline = moving_timeline();
    assert!(approx_vec3(timeline.position_at(5.0).unwrap(), Vec3::new(5.0, 10.0, 15.0)));

    timeline.set_position_interpolator(Interpolation::Step).unwrap();
    assert_eq!(timeline.position_at(5.0).unwrap(), Vec3::ZERO);
    assert_eq!(timeline.position_at(10.0).unwrap(), Vec3::new(10.0, 20.0, 30.0));
}

#[test]
fn unknown_attribute_is_not_interpolatable() {
    let timeline = Timeline::new();
    assert!(!timeline.is_interpolatable("position", false));
    assert!(matches!(
        timeline.position_at(1.0),
        Err(AnimationError::NotInterpolatable { .. })
    ));
}

#[test]
fn invalid_value_leaves_channel_unchanged() {
    let mut timeline = moving_timeline();
    let err = timeline.set_keyframe("position", 5.0, [1.0_f32, 2.0]).unwrap_err();
    assert!(matches!(err, AnimationError::InvalidValue { .. }));

    let store = timeline.channels(Namespace::Object).get("position").unwrap().store();
    assert_eq!(store.len(), 2);
}

#[test]
fn rotation_accepts_euler_and_quaternion() {
    let mut timeline = Timeline::new();
    timeline.set_rotation(0.0, Vec3::new(0.0, 90.0, 0.0)).unwrap();
    timeline.set_rotation(1.0, Quat::IDENTITY).unwrap();

    let q = timeline.rotation_at(0.0).unwrap();
    assert!(q.angle_between(Quat::from_rotation_y(90f32.to_radians())) < 1e-4);
    let euler = timeline.rotation_euler_at(0.0).unwrap();
    assert!(euler.abs_diff_eq(Vec3::new(0.0, 90.0, 0.0), 1e-2), "{euler:?}");

    assert!(timeline.set_rotation(2.0, [1.0_f32, 2.0]).is_err());
    assert_eq!(timeline.interpolation(Namespace::Object, "rotation"), Some(Interpolation::Spherical));
}

#[test]
fn linear_rotation_between_sign_flipped_quaternions_stays_finite() {
    let mut stage = MockStage::new();
    let handle = stage.spawn();

    let mut timeline = Timeline::new();
    timeline.set_rotation(0.0, Quat::IDENTITY).unwrap();
    timeline.set_rotation(2.0, -Quat::IDENTITY).unwrap();
    timeline.set_rotation_interpolator(Interpolation::Linear).unwrap();
    timeline.add_member(&mut stage, handle).unwrap();

    let q = timeline.rotation_at(1.0).unwrap();
    assert!(q.angle_between(Quat::IDENTITY) < 1e-4, "{q:?}");

    timeline.update(1.0, &mut stage);
    let orientation = stage.actor(handle).orientation;
    assert!(orientation.is_finite());
    assert!(approx_vec3(orientation, Vec3::ZERO));
}

#[test]
fn rotation_as_vector_uses_axis_angle() {
    let mut timeline = Timeline::new();
    let vector = Vec3::Z * std::f32::consts::FRAC_PI_2;
    timeline.set_rotation_as_vector(0.0, vector).unwrap();

    let q = timeline.rotation_at(0.0).unwrap();
    assert!(q.angle_between(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)) < 1e-4);
}

#[test]
fn color_and_opacity_getters() {
    let mut timeline = Timeline::new();
    timeline.set_color(0.0, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    timeline.set_color(2.0, Vec3::new(0.0, 0.0, 1.0)).unwrap();
    timeline.set_opacity(0.0, 0.0).unwrap();
    timeline.set_opacity(2.0, 1.0).unwrap();

    assert!(timeline.color_at(1.0).unwrap().abs_diff_eq(Vec4::new(0.5, 0.0, 0.5, 1.0), 1e-5));
    assert!(approx(timeline.opacity_at(0.5).unwrap(), 0.25));
}

#[test]
fn batch_skips_malformed_keyframes() {
    let mut timeline = Timeline::new();
    let report = timeline.set_keyframes(
        "scale",
        vec![
            (0.0, Value::from_slice(&[1.0, 1.0, 1.0])),
            (1.0, Value::from_slice(&[2.0, 2.0])),
            (2.0, Value::from_slice(&[3.0, 3.0, 3.0])),
        ],
    );
    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 1);
    assert!(!report.is_complete());
    assert_eq!(timeline.scale_at(2.0).unwrap(), Vec3::splat(3.0));
}

#[test]
fn set_interpolator_without_keyframes_is_noop() {
    let mut timeline = Timeline::new();
    timeline.set_interpolator("position", Interpolation::CubicHermite).unwrap();
    assert_eq!(timeline.interpolation(Namespace::Object, "position"), None);
}

#[test]
fn remove_keyframe_shrinks_final_timestamp() {
    let mut timeline = moving_timeline();
    assert_eq!(timeline.final_timestamp(), 10.0);

    let removed = timeline.remove_keyframe(Namespace::Object, "position", 10.0).unwrap();
    assert_eq!(removed.time, 10.0);
    assert_eq!(timeline.final_timestamp(), 0.0);
}

// ============================================================================
// Members
// ============================================================================

#[test]
fn update_applies_attributes_to_every_member() {
    let mut stage = MockStage::new();
    let a = stage.spawn();
    let b = stage.spawn();

    let mut timeline = moving_timeline();
    timeline.set_scale(0.0, Vec3::splat(2.0)).unwrap();
    timeline.add_member(&mut stage, a).unwrap();
    timeline.add_member(&mut stage, b).unwrap();

    timeline.update(5.0, &mut stage);

    for handle in [a, b] {
        let actor = stage.actor(handle);
        assert!(approx_vec3(actor.position, Vec3::new(5.0, 10.0, 15.0)));
        assert_eq!(actor.scale, Vec3::splat(2.0));
    }
}

#[test]
fn members_without_capabilities_are_refused() {
    let mut stage = MockStage::new();
    let inert = stage.spawn_with(Capabilities::empty());

    let mut timeline = Timeline::new();
    let err = timeline.add_member(&mut stage, inert).unwrap_err();
    assert!(matches!(err, AnimationError::UnsupportedMemberType { .. }));
    assert!(timeline.members().is_empty());
}

#[test]
fn capabilities_limit_applied_attributes() {
    let mut stage = MockStage::new();
    let handle = stage.spawn_with(Capabilities::OPACITY);

    let mut timeline = moving_timeline();
    timeline.set_opacity(0.0, 0.5).unwrap();
    timeline.add_member(&mut stage, handle).unwrap();
    timeline.update(5.0, &mut stage);

    let actor = stage.actor(handle);
    assert_eq!(actor.position, Vec3::ZERO);
    assert_eq!(actor.opacity, 0.5);
}

#[test]
fn removed_actor_is_skipped() {
    let mut stage = MockStage::new();
    let handle = stage.spawn();
    let mut timeline = moving_timeline();
    timeline.add_member(&mut stage, handle).unwrap();

    stage.actors.remove(handle);
    timeline.update(5.0, &mut stage);
    assert!(timeline.remove_member(&mut stage, handle));
    assert!(!timeline.remove_member(&mut stage, handle));
}

#[test]
fn detached_members_leave_the_scene() {
    let mut stage = MockStage::new();
    let actor = stage.spawn();
    let prop = stage.spawn();
    let idle = stage.spawn();

    let mut timeline = moving_timeline();
    timeline.add_member(&mut stage, actor).unwrap();
    timeline.add_static_member(&mut stage, prop).unwrap();
    timeline.update(1.0, &mut stage);
    assert_eq!(stage.added(actor), 1);

    assert!(timeline.remove_member(&mut stage, prop));
    assert_eq!(stage.removed(prop), 1);

    timeline.clear_members(&mut stage);
    assert_eq!(stage.removed(actor), 1);
    assert!(timeline.members().is_empty());

    // Outside the scene there is nothing to take out.
    let mut offstage =
        Timeline::with_settings(&TimelineSettings::default().with_scene_window(5.0, None));
    offstage.add_member(&mut stage, idle).unwrap();
    offstage.update(1.0, &mut stage);
    offstage.clear_members(&mut stage);
    assert_eq!(stage.removed(idle), 0);
}

#[test]
fn removed_children_take_their_members_out_of_the_scene() {
    let mut stage = MockStage::new();
    let actor = stage.spawn();

    let mut child = moving_timeline();
    child.add_member(&mut stage, actor).unwrap();
    let mut parent = Timeline::new();
    parent.add_child(child);
    parent.update(1.0, &mut stage);
    assert_eq!(stage.added(actor), 1);

    let mut removed = parent.remove_children(&mut stage);
    assert_eq!(stage.removed(actor), 1);
    assert!(!removed[0].in_scene());

    // A detached subtree re-enters when it is updated on its own.
    removed[0].update(2.0, &mut stage);
    assert_eq!(stage.added(actor), 2);
}

// ============================================================================
// Scene window
// ============================================================================

#[test]
fn scene_window_triggers_single_add_and_remove() {
    let mut stage = MockStage::new();
    let member = stage.spawn();
    let prop = stage.spawn();

    let mut timeline = Timeline::with_settings(
        &TimelineSettings::default().with_scene_window(2.0, Some(5.0)),
    );
    timeline.add_member(&mut stage, member).unwrap();
    timeline.add_static_member(&mut stage, prop).unwrap();

    for t in 0..=6 {
        timeline.update(t as f32, &mut stage);
    }

    assert_eq!(stage.added(member), 1);
    assert_eq!(stage.removed(member), 1);
    assert_eq!(stage.added(prop), 1);
    assert_eq!(stage.removed(prop), 1);
    assert!(!timeline.in_scene());
}

#[test]
fn scene_window_is_half_open() {
    let mut timeline = Timeline::new();
    timeline.add_to_scene_at(1.0);
    timeline.remove_from_scene_at(Some(3.0));

    assert!(!timeline.is_inside_scene_at(0.5));
    assert!(timeline.is_inside_scene_at(1.0));
    assert!(timeline.is_inside_scene_at(2.9));
    assert!(!timeline.is_inside_scene_at(3.0));
}

#[test]
fn attributes_are_not_applied_outside_scene() {
    let mut stage = MockStage::new();
    let handle = stage.spawn();
    let mut timeline = moving_timeline();
    timeline.add_to_scene_at(8.0);
    timeline.add_member(&mut stage, handle).unwrap();

    timeline.update(5.0, &mut stage);
    assert_eq!(stage.actor(handle).writes, 0);
}

#[test]
fn member_added_while_in_scene_joins_immediately() {
    let mut stage = MockStage::new();
    let first = stage.spawn();
    let late = stage.spawn();

    let mut timeline = moving_timeline();
    timeline.add_member(&mut stage, first).unwrap();
    timeline.update(0.0, &mut stage);

    timeline.add_member(&mut stage, late).unwrap();
    assert_eq!(stage.events.last(), Some(&SceneEvent::Added(late)));
}

#[test]
fn children_leave_scene_with_parent() {
    let mut stage = MockStage::new();
    let handle = stage.spawn();

    let mut child = moving_timeline();
    child.add_member(&mut stage, handle).unwrap();

    let mut parent = Timeline::new();
    parent.remove_from_scene_at(Some(4.0));
    parent.add_child(child);

    parent.update(1.0, &mut stage);
    assert_eq!(stage.added(handle), 1);

    parent.update(6.0, &mut stage);
    assert_eq!(stage.removed(handle), 1);
    assert!(!parent.children()[0].in_scene());
}

// ============================================================================
// Camera
// ============================================================================

#[test]
fn camera_channels_drive_stage_camera() {
    let mut stage = MockStage::with_camera();
    let mut timeline = Timeline::new();
    timeline.set_camera_position(0.0, Vec3::new(0.0, 0.0, 10.0)).unwrap();
    timeline.set_camera_position(2.0, Vec3::new(0.0, 0.0, 20.0)).unwrap();
    timeline.set_camera_focal(0.0, Vec3::new(1.0, 2.0, 3.0)).unwrap();
    assert!(timeline.is_camera_animated());

    timeline.update(1.0, &mut stage);

    let camera = stage.camera();
    assert!(approx_vec3(camera.position, Vec3::new(0.0, 0.0, 15.0)));
    assert_eq!(camera.focal_point, Vec3::new(1.0, 2.0, 3.0));
    // No view-up channel: reset to +Y.
    assert_eq!(camera.view_up, Vec3::Y);
}

#[test]
fn camera_rotation_pivots_about_camera_position() {
    let mut stage = MockStage::with_camera();
    let mut timeline = Timeline::new();
    timeline.set_camera_position(0.0, Vec3::new(0.0, 0.0, 10.0)).unwrap();
    timeline.set_camera_rotation(0.0, Vec3::new(0.0, 90.0, 0.0)).unwrap();

    timeline.update(0.0, &mut stage);

    let transform = stage.camera().model_transform;
    let pivot = Vec3::new(0.0, 0.0, 10.0);
    assert!(approx_vec3(transform.transform_point3(pivot), pivot));
    assert!(approx_vec3(
        transform.transform_vector3(Vec3::X),
        Vec3::new(0.0, 0.0, 1.0)
    ));
}

#[test]
fn camera_keyframes_live_in_separate_namespace() {
    let mut timeline = Timeline::new();
    timeline.set_camera_rotation(0.0, Vec3::new(10.0, 20.0, 30.0)).unwrap();

    assert!(timeline.is_interpolatable("rotation", true));
    assert!(!timeline.is_interpolatable("rotation", false));
    assert_eq!(timeline.camera_rotation_at(0.0).unwrap(), Vec3::new(10.0, 20.0, 30.0));
}

// ============================================================================
// Hierarchy & duration
// ============================================================================

#[test]
fn final_timestamp_spans_children() {
    let mut parent = Timeline::new();
    parent.set_opacity(3.0, 1.0).unwrap();

    let mut child = Timeline::new();
    child.set_position(12.0, Vec3::ONE).unwrap();
    parent.add_child(child);
    assert_eq!(parent.final_timestamp(), 12.0);

    parent.child_mut(0).unwrap().set_position(20.0, Vec3::ONE).unwrap();
    assert_eq!(parent.update_final_timestamp(), 20.0);

    let mut stage = MockStage::new();
    let removed = parent.remove_children(&mut stage);
    assert_eq!(removed.len(), 1);
    assert_eq!(parent.final_timestamp(), 3.0);
}

#[test]
fn fixed_length_overrides_keyframes() {
    let mut timeline = moving_timeline();
    timeline.set_length(Some(4.0));
    assert_eq!(timeline.final_timestamp(), 4.0);

    timeline.set_position(30.0, Vec3::ONE).unwrap();
    assert_eq!(timeline.update_final_timestamp(), 4.0);

    timeline.set_length(None);
    assert_eq!(timeline.final_timestamp(), 30.0);
}

#[test]
fn children_are_evaluated_at_parent_time() {
    let mut stage = MockStage::new();
    let handle = stage.spawn();

    let mut child = moving_timeline();
    child.add_member(&mut stage, handle).unwrap();
    let mut parent = Timeline::new();
    parent.add_child(child);

    parent.update(2.5, &mut stage);
    assert!(approx_vec3(stage.actor(handle).position, Vec3::new(2.5, 5.0, 7.5)));
}

#[test]
fn edits_mark_tree_for_update() {
    let mut stage = MockStage::new();
    let mut parent = Timeline::new();
    parent.add_child(Timeline::new());
    parent.update(0.0, &mut stage);
    assert!(!parent.needs_update());

    parent.child_mut(0).unwrap().set_opacity(1.0, 0.5).unwrap();
    assert!(parent.needs_update());

    parent.update(0.0, &mut stage);
    assert!(!parent.needs_update());
}

// ============================================================================
// Ingestion & motion paths
// ============================================================================

#[test]
fn packed_cubic_batch_is_unpacked() {
    let tangent = Value::from_slice(&[0.0, 0.0, 0.0]);
    let batch = KeyframeBatch::from_packed_cubic(
        "position",
        vec![0.0, 1.0],
        vec![
            tangent.clone(),
            Value::from_slice(&[0.0, 0.0, 0.0]),
            tangent.clone(),
            tangent.clone(),
            Value::from_slice(&[2.0, 2.0, 2.0]),
            tangent,
        ],
    );
    assert_eq!(batch.values.len(), 2);

    let mut timeline = Timeline::new();
    let report = timeline.ingest(batch);
    assert!(report.is_complete());
    assert_eq!(
        timeline.interpolation(Namespace::Object, "position"),
        Some(Interpolation::CubicHermite)
    );
    assert!(approx_vec3(timeline.position_at(0.5).unwrap(), Vec3::ONE));
}

#[test]
fn batch_with_missing_values_reports_skips() {
    let batch = KeyframeBatch::new(
        "opacity",
        vec![0.0, 1.0, 2.0],
        vec![Value::from_slice(&[0.0]), Value::from_slice(&[1.0])],
    );
    let mut timeline = Timeline::new();
    let report = timeline.ingest(batch);
    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 1);
}

#[test]
fn batch_with_extra_values_reports_skips() {
    let batch = KeyframeBatch::new(
        "opacity",
        vec![0.0, 1.0],
        vec![
            Value::from_slice(&[0.0]),
            Value::from_slice(&[1.0]),
            Value::from_slice(&[0.5]),
            Value::from_slice(&[0.25]),
        ],
    );
    let mut timeline = Timeline::new();
    let report = timeline.ingest(batch);
    assert_eq!(report.applied, 2);
    assert_eq!(report.skipped, 2);
    assert!(!report.is_complete());
    assert_eq!(timeline.final_timestamp(), 1.0);
}

#[test]
fn camera_batch_targets_camera_namespace() {
    let batch = KeyframeBatch::new("focal", vec![0.0], vec![Value::from_slice(&[1.0, 2.0, 3.0])])
        .camera()
        .with_interpolation(Interpolation::Step);
    let mut timeline = Timeline::new();
    let _ = timeline.ingest(batch);

    assert!(timeline.is_interpolatable("focal", true));
    assert_eq!(
        timeline.interpolation(Namespace::Camera, "focal"),
        Some(Interpolation::Step)
    );
}

#[test]
fn motion_path_samples_position_channel() {
    let mut timeline = moving_timeline();
    assert!(timeline.motion_path().is_none());

    timeline.set_motion_path_resolution(3);
    let path = timeline.motion_path().unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(path.points[0], Vec3::ZERO);
    assert!(approx_vec3(path.points[1], Vec3::new(5.0, 10.0, 15.0)));
    assert_eq!(path.points[2], Vec3::new(10.0, 20.0, 30.0));
    assert!(path.colors.is_none());
}

#[test]
fn motion_paths_cover_subtree() {
    let mut parent = moving_timeline();
    parent.set_motion_path_resolution(4);
    let mut child = moving_timeline();
    child.set_motion_path_resolution(2);
    child.set_color(0.0, Vec3::ONE).unwrap();
    parent.add_child(child);

    let paths = parent.motion_paths();
    assert_eq!(paths.len(), 2);
    assert_eq!(paths[1].colors.as_ref().map(Vec::len), Some(2));
}
