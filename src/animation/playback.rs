#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::settings::PlaybackSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// Outcome of [`PlaybackClock::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockTick {
    /// Timeline time to evaluate.
    pub time: f32,
    /// `true` if playback wrapped back to the start this tick.
    pub wrapped: bool,
    /// `true` if playback reached the end and paused itself this tick.
    pub finished: bool,
}

/// Maps wall-clock seconds to timeline seconds.
///
/// While playing, current time is `(now - reference) * speed`, where
/// `reference` is re-derived whenever the mapping must change (seek, speed
/// change, loop wrap) so the current time is continuous. While paused or
/// stopped the last timestamp is held.
///
/// The clock is driven by explicit `now` values; see
/// [`TimeSource`](crate::utils::time::TimeSource).
#[derive(Debug, Clone)]
pub struct PlaybackClock {
    state: PlaybackState,
    speed: f32,
    looping: bool,
    last_timestamp: f32,
    reference: f64,
}

impl Default for PlaybackClock {
    fn default() -> Self {
        Self::new(&PlaybackSettings::default())
    }
}

impl PlaybackClock {
    #[must_use]
    pub fn new(settings: &PlaybackSettings) -> Self {
        let speed = if is_valid_speed(settings.speed) {
            settings.speed
        } else {
            log::warn!("Invalid playback speed {}, using 1.0", settings.speed);
            1.0
        };
        Self {
            state: PlaybackState::Stopped,
            speed,
            looping: settings.looping,
            last_timestamp: 0.0,
            reference: 0.0,
        }
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state == PlaybackState::Paused
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.state == PlaybackState::Stopped
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.speed
    }

    #[inline]
    #[must_use]
    pub fn looping(&self) -> bool {
        self.looping
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.looping = looping;
    }

    /// Timeline time at wall-clock `now`.
    #[must_use]
    pub fn current_time(&self, now: f64) -> f32 {
        match self.state {
            PlaybackState::Playing => ((now - self.reference) * f64::from(self.speed)) as f32,
            PlaybackState::Paused | PlaybackState::Stopped => self.last_timestamp,
        }
    }

    /// Starts or resumes playback. Restarts from zero when the held time is
    /// at or past `final_timestamp`.
    pub fn play(&mut self, now: f64, final_timestamp: f32) {
        if self.is_playing() {
            return;
        }
        if self.last_timestamp >= final_timestamp {
            self.last_timestamp = 0.0;
        }
        self.rebase(now, self.last_timestamp);
        self.state = PlaybackState::Playing;
    }

    /// Freezes the current time.
    pub fn pause(&mut self, now: f64) {
        self.last_timestamp = self.current_time(now);
        self.state = PlaybackState::Paused;
    }

    /// Resets to zero and stops.
    pub fn stop(&mut self) {
        self.last_timestamp = 0.0;
        self.state = PlaybackState::Stopped;
    }

    /// Resets to zero and plays.
    pub fn restart(&mut self, now: f64) {
        self.last_timestamp = 0.0;
        self.rebase(now, 0.0);
        self.state = PlaybackState::Playing;
    }

    /// Moves to `timestamp`, clamped to `[0, final_timestamp]`. Returns the
    /// timestamp actually applied.
    pub fn seek(&mut self, now: f64, timestamp: f32, final_timestamp: f32) -> f32 {
        let timestamp = if timestamp.is_finite() {
            timestamp.clamp(0.0, final_timestamp.max(0.0))
        } else {
            log::warn!("Ignoring seek to non-finite timestamp {timestamp}");
            self.current_time(now)
        };
        if self.is_playing() {
            self.rebase(now, timestamp);
        }
        self.last_timestamp = timestamp;
        timestamp
    }

    /// Changes the speed while keeping the current time. Non-positive or
    /// non-finite speeds are ignored and `false` is returned.
    pub fn set_speed(&mut self, now: f64, speed: f32) -> bool {
        if !is_valid_speed(speed) {
            log::warn!("Ignoring invalid playback speed {speed}");
            return false;
        }
        let current = self.current_time(now);
        self.speed = speed;
        if self.is_playing() {
            self.rebase(now, current);
        }
        true
    }

    /// Resolves the time to evaluate at `now`, handling the end of the
    /// timeline: wrap when looping, otherwise clamp and pause.
    pub fn advance(&mut self, now: f64, final_timestamp: f32) -> ClockTick {
        let mut tick = ClockTick {
            time: self.current_time(now),
            wrapped: false,
            finished: false,
        };
        if !self.is_playing() || tick.time <= final_timestamp {
            return tick;
        }

        if self.looping {
            tick.time = if final_timestamp > 0.0 {
                tick.time % final_timestamp
            } else {
                0.0
            };
            tick.wrapped = true;
            self.rebase(now, tick.time);
        } else {
            tick.time = final_timestamp;
            tick.finished = true;
            self.last_timestamp = final_timestamp;
            self.state = PlaybackState::Paused;
        }
        tick
    }

    fn rebase(&mut self, now: f64, timestamp: f32) {
        self.reference = now - f64::from(timestamp) / f64::from(self.speed);
    }
}

#[inline]
fn is_valid_speed(speed: f32) -> bool {
    speed.is_finite() && speed > 0.0
}
