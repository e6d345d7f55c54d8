use glam::{Vec3, Vec4};

use crate::animation::timeline::Timeline;
use crate::animation::values::{to_rgba, to_vec3};

/// Polyline traced by a timeline's position channel, for debug overlays.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionPath {
    pub points: Vec<Vec3>,
    /// Per-point colors when the timeline also animates color.
    pub colors: Option<Vec<Vec4>>,
}

impl MotionPath {
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl Timeline {
    /// Motion path at the configured resolution.
    #[must_use]
    pub fn motion_path(&self) -> Option<MotionPath> {
        self.motion_path_with_resolution(self.motion_path_resolution())
    }

    /// Samples the position channel `resolution` times, evenly spaced over
    /// `[0, final_timestamp]`.
    ///
    /// Returns `None` when `resolution` is zero or the timeline has no
    /// position keyframes.
    #[must_use]
    pub fn motion_path_with_resolution(&self, resolution: usize) -> Option<MotionPath> {
        if resolution == 0 || !self.is_interpolatable("position", false) {
            return None;
        }

        let final_timestamp = self.final_timestamp();
        let step = if resolution > 1 {
            final_timestamp / (resolution - 1) as f32
        } else {
            0.0
        };
        let times = (0..resolution).map(|i| i as f32 * step);

        let points = times
            .clone()
            .filter_map(|t| self.value_at("position", t).ok())
            .map(|v| to_vec3(&v))
            .collect();
        let colors = self.is_interpolatable("color", false).then(|| {
            times
                .filter_map(|t| self.value_at("color", t).ok())
                .map(|v| to_rgba(&v))
                .collect()
        });

        Some(MotionPath { points, colors })
    }

    /// Motion paths of this timeline and every descendant that has one.
    #[must_use]
    pub fn motion_paths(&self) -> Vec<MotionPath> {
        let mut paths = Vec::new();
        self.collect_motion_paths(&mut paths);
        paths
    }

    fn collect_motion_paths(&self, paths: &mut Vec<MotionPath>) {
        paths.extend(self.motion_path());
        for child in self.children() {
            child.collect_motion_paths(paths);
        }
    }
}
