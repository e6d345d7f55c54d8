//! Playback & Timeline Settings
//!
//! Plain configuration structs with sensible defaults. Override individual
//! fields with struct update syntax or the `with_*` builders:
//!
//! ```rust,ignore
//! use kinema::settings::{PlaybackSettings, TimelineSettings};
//!
//! let playback = PlaybackSettings {
//!     looping: true,
//!     ..Default::default()
//! };
//!
//! let timeline = TimelineSettings::default()
//!     .with_length(12.0)
//!     .with_scene_window(2.0, Some(10.0));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PlaybackSettings
// ---------------------------------------------------------------------------

/// Initial configuration of a [`TimelinePlayer`](crate::animation::TimelinePlayer).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlaybackSettings {
    /// Timeline seconds per wall-clock second. Must be finite and positive.
    pub speed: f32,
    /// Wrap to the start instead of pausing at the final timestamp.
    pub looping: bool,
    /// Start in the `Playing` state.
    pub autoplay: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            speed: 1.0,
            looping: false,
            autoplay: false,
        }
    }
}

impl PlaybackSettings {
    #[must_use]
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    #[must_use]
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }
}

// ---------------------------------------------------------------------------
// TimelineSettings
// ---------------------------------------------------------------------------

/// Initial configuration of a [`Timeline`](crate::animation::Timeline).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TimelineSettings {
    /// Fixed duration. `None` derives it from the latest keyframe.
    pub length: Option<f32>,
    /// Samples per motion path. `0` disables motion paths.
    pub motion_path_resolution: usize,
    /// Scene-entry timestamp.
    pub entry: f32,
    /// Scene-exit timestamp; `None` never leaves.
    pub exit: Option<f32>,
}

impl Default for TimelineSettings {
    fn default() -> Self {
        Self {
            length: None,
            motion_path_resolution: 0,
            entry: 0.0,
            exit: None,
        }
    }
}

impl TimelineSettings {
    #[must_use]
    pub fn with_length(mut self, length: f32) -> Self {
        self.length = Some(length);
        self
    }

    #[must_use]
    pub fn with_motion_path_resolution(mut self, resolution: usize) -> Self {
        self.motion_path_resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_scene_window(mut self, entry: f32, exit: Option<f32>) -> Self {
        self.entry = entry;
        self.exit = exit;
        self
    }
}
