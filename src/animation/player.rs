use crate::animation::playback::{PlaybackClock, PlaybackState};
use crate::animation::timeline::Timeline;
use crate::animation::values::IntoValue;
use crate::errors::Result;
use crate::scene::Stage;
use crate::settings::PlaybackSettings;
use crate::utils::time::{SystemClock, TimeSource};

/// Optional UI attached to a player.
///
/// The player pushes time updates into the panel; user input flows back as
/// [`PanelEvent`]s through [`TimelinePlayer::handle_panel_event`].
pub trait PlaybackPanel {
    fn set_current_time(&mut self, time: f32);

    fn set_final_time(&mut self, time: f32);

    /// Called when a non-looping playback reaches the end and pauses itself.
    fn on_paused_by_engine(&mut self) {}
}

/// User input coming from a [`PlaybackPanel`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    Play,
    Pause,
    Stop,
    LoopToggled(bool),
    /// Progress slider moved to a timestamp, in seconds.
    ProgressChanged(f32),
    SpeedChanged(f32),
}

/// Root of an animation tree: owns the root [`Timeline`] and the only
/// playback clock.
///
/// Call [`tick`](Self::tick) once per frame. It evaluates the tree at the
/// current time while playing, and also when authoring edits are pending
/// while paused or stopped.
pub struct TimelinePlayer<C: TimeSource = SystemClock> {
    timeline: Timeline,
    clock: PlaybackClock,
    time_source: C,
    panel: Option<Box<dyn PlaybackPanel>>,
}

impl TimelinePlayer<SystemClock> {
    #[must_use]
    pub fn new(timeline: Timeline) -> Self {
        Self::with_settings(timeline, SystemClock::new(), &PlaybackSettings::default())
    }
}

impl<C: TimeSource> TimelinePlayer<C> {
    #[must_use]
    pub fn with_settings(timeline: Timeline, time_source: C, settings: &PlaybackSettings) -> Self {
        let mut player = Self {
            timeline,
            clock: PlaybackClock::new(settings),
            time_source,
            panel: None,
        };
        player.timeline.update_final_timestamp();
        if settings.autoplay {
            player.play();
        }
        player
    }

    #[inline]
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Mutable access to the root timeline. Edits made through it are picked
    /// up by the next [`tick`](Self::tick).
    #[inline]
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    #[must_use]
    pub fn into_timeline(self) -> Timeline {
        self.timeline
    }

    pub fn attach_panel(&mut self, mut panel: Box<dyn PlaybackPanel>) {
        panel.set_final_time(self.timeline.update_final_timestamp());
        panel.set_current_time(self.current_time());
        self.panel = Some(panel);
    }

    pub fn detach_panel(&mut self) -> Option<Box<dyn PlaybackPanel>> {
        self.panel.take()
    }

    // ========================================================================
    // Authoring
    // ========================================================================

    /// Sets an object-attribute keyframe on the root timeline. A keyframe
    /// after zero re-evaluates the tree at the current time right away.
    pub fn set_keyframe(
        &mut self,
        attribute: &str,
        time: f32,
        value: impl IntoValue,
        stage: &mut dyn Stage,
    ) -> Result<()> {
        self.timeline.set_keyframe(attribute, time, value)?;
        if time > 0.0 {
            self.refresh(stage);
        }
        Ok(())
    }

    /// Camera counterpart of [`set_keyframe`](Self::set_keyframe).
    pub fn set_camera_keyframe(
        &mut self,
        attribute: &str,
        time: f32,
        value: impl IntoValue,
        stage: &mut dyn Stage,
    ) -> Result<()> {
        self.timeline.set_camera_keyframe(attribute, time, value)?;
        if time > 0.0 {
            self.refresh(stage);
        }
        Ok(())
    }

    // ========================================================================
    // State
    // ========================================================================

    #[must_use]
    pub fn current_time(&self) -> f32 {
        self.clock.current_time(self.time_source.now())
    }

    #[inline]
    #[must_use]
    pub fn final_timestamp(&self) -> f32 {
        self.timeline.final_timestamp()
    }

    #[inline]
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.clock.state()
    }

    #[inline]
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    #[inline]
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    #[inline]
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.clock.is_stopped()
    }

    #[inline]
    #[must_use]
    pub fn speed(&self) -> f32 {
        self.clock.speed()
    }

    #[inline]
    #[must_use]
    pub fn looping(&self) -> bool {
        self.clock.looping()
    }

    // ========================================================================
    // Control
    // ========================================================================

    /// Starts or resumes playback; from the end, restarts at zero.
    pub fn play(&mut self) {
        let final_timestamp = self.refresh_final_timestamp();
        self.clock.play(self.time_source.now(), final_timestamp);
    }

    pub fn pause(&mut self) {
        self.clock.pause(self.time_source.now());
    }

    /// Resets to zero, stops, and evaluates the tree at zero.
    pub fn stop(&mut self, stage: &mut dyn Stage) {
        self.clock.stop();
        self.evaluate(0.0, stage);
    }

    /// Resets to zero, plays, and evaluates the tree at zero.
    pub fn restart(&mut self, stage: &mut dyn Stage) {
        self.refresh_final_timestamp();
        self.clock.restart(self.time_source.now());
        self.evaluate(0.0, stage);
    }

    /// Moves to `timestamp`, clamped to `[0, final_timestamp]`. When not
    /// playing the tree is evaluated immediately.
    pub fn seek(&mut self, timestamp: f32, stage: &mut dyn Stage) {
        let final_timestamp = self.refresh_final_timestamp();
        let timestamp = self
            .clock
            .seek(self.time_source.now(), timestamp, final_timestamp);
        if !self.clock.is_playing() {
            self.evaluate(timestamp, stage);
        }
    }

    /// Seeks to a percentage (clamped to `[0, 100]`) of the final timestamp.
    pub fn seek_percent(&mut self, percent: f32, stage: &mut dyn Stage) {
        let final_timestamp = self.refresh_final_timestamp();
        let percent = if percent.is_finite() {
            percent.clamp(0.0, 100.0)
        } else {
            0.0
        };
        self.seek(percent * final_timestamp / 100.0, stage);
    }

    /// Returns `false` and leaves playback untouched for non-positive or
    /// non-finite speeds.
    pub fn set_speed(&mut self, speed: f32) -> bool {
        self.clock.set_speed(self.time_source.now(), speed)
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.clock.set_looping(looping);
    }

    // ========================================================================
    // Frame update
    // ========================================================================

    /// Per-frame entry point. Returns the timestamp the tree was evaluated
    /// at, or `None` if nothing needed evaluating.
    pub fn tick(&mut self, stage: &mut dyn Stage) -> Option<f32> {
        let now = self.time_source.now();

        if self.clock.is_playing() {
            let final_timestamp = self.refresh_final_timestamp();
            let tick = self.clock.advance(now, final_timestamp);
            if tick.finished {
                log::debug!("Playback reached {final_timestamp}, pausing");
                if let Some(panel) = self.panel.as_mut() {
                    panel.on_paused_by_engine();
                }
            }
            self.evaluate(tick.time, stage);
            return Some(tick.time);
        }

        if self.timeline.needs_update() {
            let time = self.clock.current_time(now);
            self.evaluate(time, stage);
            return Some(time);
        }
        None
    }

    /// Evaluates the tree at the current time regardless of state.
    pub fn refresh(&mut self, stage: &mut dyn Stage) -> f32 {
        let time = self.current_time();
        self.evaluate(time, stage);
        time
    }

    pub fn handle_panel_event(&mut self, event: PanelEvent, stage: &mut dyn Stage) {
        log::trace!("Panel event {event:?}");
        match event {
            PanelEvent::Play => self.play(),
            PanelEvent::Pause => self.pause(),
            PanelEvent::Stop => self.stop(stage),
            PanelEvent::LoopToggled(looping) => self.set_looping(looping),
            PanelEvent::ProgressChanged(time) => self.seek(time, stage),
            PanelEvent::SpeedChanged(speed) => {
                self.set_speed(speed);
            }
        }
    }

    fn evaluate(&mut self, time: f32, stage: &mut dyn Stage) {
        if self.timeline.needs_update() {
            self.refresh_final_timestamp();
        }
        self.timeline.update(time, stage);
        if let Some(panel) = self.panel.as_mut() {
            panel.set_current_time(time);
        }
    }

    fn refresh_final_timestamp(&mut self) -> f32 {
        let final_timestamp = self.timeline.update_final_timestamp();
        if let Some(panel) = self.panel.as_mut() {
            panel.set_final_time(final_timestamp);
        }
        final_timestamp
    }
}
