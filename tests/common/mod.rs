//! Shared test fixtures: an in-memory stage with recording actors and camera.

#![allow(dead_code)]

use glam::{Mat4, Vec3};
use kinema::scene::{Animatable, CameraRig, Capabilities, MemberHandle, Stage};
use slotmap::SlotMap;

pub const EPSILON: f32 = 1e-4;

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

pub fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

#[derive(Debug, Clone)]
pub struct MockActor {
    pub capabilities: Capabilities,
    pub position: Vec3,
    pub orientation: Vec3,
    pub scale: Vec3,
    pub opacity: f32,
    pub colors: Vec<f32>,
    pub writes: usize,
}

impl Default for MockActor {
    fn default() -> Self {
        Self {
            capabilities: Capabilities::all(),
            position: Vec3::ZERO,
            orientation: Vec3::ZERO,
            scale: Vec3::ONE,
            opacity: 1.0,
            colors: Vec::new(),
            writes: 0,
        }
    }
}

impl Animatable for MockActor {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.writes += 1;
    }

    fn set_orientation(&mut self, euler_degrees: Vec3) {
        self.orientation = euler_degrees;
        self.writes += 1;
    }

    fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.writes += 1;
    }

    fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity;
        self.writes += 1;
    }

    fn set_vertex_colors(&mut self, color: &[f32]) {
        self.colors = color.to_vec();
        self.writes += 1;
    }
}

#[derive(Debug, Clone)]
pub struct MockCamera {
    pub position: Vec3,
    pub focal_point: Vec3,
    pub view_up: Vec3,
    pub model_transform: Mat4,
}

impl Default for MockCamera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 10.0),
            focal_point: Vec3::ZERO,
            view_up: Vec3::Z,
            model_transform: Mat4::IDENTITY,
        }
    }
}

impl CameraRig for MockCamera {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn focal_point(&self) -> Vec3 {
        self.focal_point
    }

    fn view_up(&self) -> Vec3 {
        self.view_up
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn set_focal_point(&mut self, focal: Vec3) {
        self.focal_point = focal;
    }

    fn set_view_up(&mut self, up: Vec3) {
        self.view_up = up;
    }

    fn set_model_transform(&mut self, transform: Mat4) {
        self.model_transform = transform;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    Added(MemberHandle),
    Removed(MemberHandle),
}

/// Stage that stores actors in a slot map and records scene add/remove calls.
#[derive(Debug, Default)]
pub struct MockStage {
    pub actors: SlotMap<MemberHandle, MockActor>,
    pub camera: Option<MockCamera>,
    pub events: Vec<SceneEvent>,
}

/// Routes `log` output to the test harness; `RUST_LOG=kinema=debug` shows it.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

impl MockStage {
    pub fn new() -> Self {
        init_logging();
        Self::default()
    }

    pub fn with_camera() -> Self {
        init_logging();
        Self {
            camera: Some(MockCamera::default()),
            ..Self::default()
        }
    }

    pub fn spawn(&mut self) -> MemberHandle {
        self.actors.insert(MockActor::default())
    }

    pub fn spawn_with(&mut self, capabilities: Capabilities) -> MemberHandle {
        self.actors.insert(MockActor {
            capabilities,
            ..MockActor::default()
        })
    }

    pub fn actor(&self, handle: MemberHandle) -> &MockActor {
        &self.actors[handle]
    }

    pub fn camera(&self) -> &MockCamera {
        self.camera.as_ref().expect("stage has no camera")
    }

    pub fn added(&self, handle: MemberHandle) -> usize {
        self.events
            .iter()
            .filter(|e| **e == SceneEvent::Added(handle))
            .count()
    }

    pub fn removed(&self, handle: MemberHandle) -> usize {
        self.events
            .iter()
            .filter(|e| **e == SceneEvent::Removed(handle))
            .count()
    }
}

impl Stage for MockStage {
    fn member(&self, handle: MemberHandle) -> Option<&dyn Animatable> {
        self.actors.get(handle).map(|a| a as &dyn Animatable)
    }

    fn member_mut(&mut self, handle: MemberHandle) -> Option<&mut dyn Animatable> {
        self.actors.get_mut(handle).map(|a| a as &mut dyn Animatable)
    }

    fn camera_mut(&mut self) -> Option<&mut dyn CameraRig> {
        self.camera.as_mut().map(|c| c as &mut dyn CameraRig)
    }

    fn add_to_scene(&mut self, handle: MemberHandle) {
        self.events.push(SceneEvent::Added(handle));
    }

    fn remove_from_scene(&mut self, handle: MemberHandle) {
        self.events.push(SceneEvent::Removed(handle));
    }
}
