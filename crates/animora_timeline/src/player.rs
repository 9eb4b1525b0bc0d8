// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline player: the public playback API.
//!
//! The player owns the clock, the clip collection and the current session.
//! Each [`TimelinePlayer::update`] advances the clock, evaluates every session
//! clip at the new time and then applies the loop policy when a boundary is
//! reached. Preview mode replaces clock-driven playback with externally
//! scrubbed time and forced evaluation.

use crate::clip::{report, ClipBehavior, ClipId, ClipSettings, PreviewContext, TimelineClip};
use crate::clock::{BoundaryAction, ClockState, PlayDirection, TimelineClock};
use crate::config::{LoopCount, LoopType, PlayMode, PlayerConfig, TimeMode, TimelineDocument};
use crate::error::{ListenerError, Result, TimelineError};
use crate::evaluation;
use crate::events::{EventBus, ListenerId, PlayerEvent};
use crate::session::PlaybackSession;
use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};

/// Frame deltas supplied by the host loop
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Delta affected by the host's time scale
    pub delta: f32,
    /// Real delta
    pub unscaled_delta: f32,
}

impl FrameTime {
    /// Frame with identical scaled and unscaled delta
    pub fn new(delta: f32) -> Self {
        Self {
            delta,
            unscaled_delta: delta,
        }
    }

    /// Frame whose scaled delta is `unscaled_delta * time_scale`
    pub fn with_time_scale(unscaled_delta: f32, time_scale: f32) -> Self {
        Self {
            delta: unscaled_delta * time_scale,
            unscaled_delta,
        }
    }

    fn select(&self, mode: TimeMode) -> f32 {
        match mode {
            TimeMode::Scaled => self.delta,
            TimeMode::Unscaled => self.unscaled_delta,
        }
    }
}

/// Drives a set of clips along a timeline
pub struct TimelinePlayer {
    /// Timeline name
    pub name: String,
    play_mode: PlayMode,
    time_mode: TimeMode,
    clock: TimelineClock,
    clips: IndexMap<ClipId, TimelineClip>,
    session: Option<PlaybackSession>,
    events: EventBus,
    rng: Box<dyn RngCore>,
}

impl TimelinePlayer {
    /// Create a player with the default configuration
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, PlayerConfig::default())
    }

    /// Create a player with `config`
    pub fn with_config(name: impl Into<String>, config: PlayerConfig) -> Self {
        let config = config.sanitized();
        let mut clock = TimelineClock::new(config.duration);
        clock.set_speed(config.speed);
        clock.loop_type = config.loop_type;
        clock.loop_count = config.loop_count;
        clock.default_direction = config.default_direction;

        Self {
            name: name.into(),
            play_mode: config.play_mode,
            time_mode: config.time_mode,
            clock,
            clips: IndexMap::new(),
            session: None,
            events: EventBus::new(),
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    /// Replace the random source used for play chance rolls
    pub fn with_rng(mut self, rng: impl RngCore + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    /// Rebuild a player from a persisted document.
    ///
    /// `factory` supplies the behavior for each persisted clip.
    pub fn from_document<F>(document: TimelineDocument, mut factory: F) -> Self
    where
        F: FnMut(&ClipSettings) -> Box<dyn ClipBehavior>,
    {
        let mut player = Self::with_config(document.name, document.config);
        for settings in document.clips {
            let settings = settings.sanitized();
            let behavior = factory(&settings);
            let clip = TimelineClip::new(settings, behavior);
            player.clips.insert(clip.id(), clip);
        }
        player
    }

    /// Snapshot configuration and clip list for persistence
    pub fn to_document(&self) -> TimelineDocument {
        let mut document = TimelineDocument::new(self.name.clone());
        document.config = self.config();
        document.clips = self.clips.values().map(|c| c.settings.clone()).collect();
        document
    }

    /// Current configuration
    pub fn config(&self) -> PlayerConfig {
        PlayerConfig {
            play_mode: self.play_mode,
            time_mode: self.time_mode,
            loop_type: self.clock.loop_type,
            loop_count: self.clock.loop_count,
            default_direction: self.clock.default_direction,
            speed: self.clock.speed(),
            duration: self.clock.duration(),
        }
    }

    // ---------------------------------------------------------------------
    // Configuration
    // ---------------------------------------------------------------------

    /// Play mode
    pub fn play_mode(&self) -> PlayMode {
        self.play_mode
    }

    /// Set the play mode
    pub fn set_play_mode(&mut self, mode: PlayMode) {
        self.play_mode = mode;
    }

    /// Time mode
    pub fn time_mode(&self) -> TimeMode {
        self.time_mode
    }

    /// Set the time mode
    pub fn set_time_mode(&mut self, mode: TimeMode) {
        self.time_mode = mode;
    }

    /// Loop type
    pub fn loop_type(&self) -> LoopType {
        self.clock.loop_type
    }

    /// Set the loop type; applies at the next boundary
    pub fn set_loop_type(&mut self, loop_type: LoopType) {
        self.clock.loop_type = loop_type;
    }

    /// Loop count
    pub fn loop_count(&self) -> LoopCount {
        self.clock.loop_count
    }

    /// Set the loop count
    pub fn set_loop_count(&mut self, count: LoopCount) {
        self.clock.loop_count = count;
    }

    /// Default direction
    pub fn default_direction(&self) -> PlayDirection {
        self.clock.default_direction
    }

    /// Set the default direction; applies on the next start or restart
    pub fn set_default_direction(&mut self, direction: PlayDirection) {
        self.clock.default_direction = direction;
    }

    /// Speed multiplier
    pub fn speed(&self) -> f32 {
        self.clock.speed()
    }

    /// Set the speed multiplier, clamped to >= 0
    pub fn set_speed(&mut self, speed: f32) {
        self.clock.set_speed(speed);
    }

    /// Timeline duration in seconds
    pub fn timeline_duration(&self) -> f32 {
        self.clock.duration()
    }

    /// Set the timeline duration, clamped to >= 0
    pub fn set_timeline_duration(&mut self, duration: f32) {
        self.clock.set_duration(duration);
    }

    // ---------------------------------------------------------------------
    // State queries
    // ---------------------------------------------------------------------

    /// Clock state
    pub fn state(&self) -> ClockState {
        self.clock.state()
    }

    /// Playing or about to start on the next update
    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }

    /// Paused
    pub fn is_paused(&self) -> bool {
        self.clock.state() == ClockState::Paused
    }

    /// In preview mode
    pub fn is_previewing(&self) -> bool {
        self.session.as_ref().is_some_and(PlaybackSession::is_preview)
    }

    /// Elapsed time in seconds
    pub fn elapsed_time(&self) -> f32 {
        self.clock.elapsed()
    }

    /// Current direction
    pub fn direction(&self) -> PlayDirection {
        self.clock.direction()
    }

    /// Completed loop passes in the current playback
    pub fn loops_completed(&self) -> u32 {
        self.clock.loops_completed()
    }

    /// Current session, if any
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    /// Set elapsed time, clamped to `[0, duration]`.
    ///
    /// Emits [`PlayerEvent::ElapsedTimeChanged`] when the value changes and
    /// returns the stored time.
    pub fn set_elapsed_time(&mut self, time: f32) -> f32 {
        let previous = self.clock.elapsed();
        let time = self.clock.set_elapsed(time);
        if time != previous {
            self.events.dispatch(&PlayerEvent::ElapsedTimeChanged { time });
        }
        time
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    /// Register a lifecycle listener
    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&PlayerEvent) -> std::result::Result<(), ListenerError> + 'static,
    {
        self.events.subscribe(listener)
    }

    /// Remove a lifecycle listener
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    // ---------------------------------------------------------------------
    // Clip collection
    // ---------------------------------------------------------------------

    /// Add a clip. Rejected while a session is active.
    pub fn add_clip(&mut self, settings: ClipSettings, behavior: Box<dyn ClipBehavior>) -> Result<ClipId> {
        self.ensure_no_session()?;
        let clip = TimelineClip::new(settings, behavior);
        let id = clip.id();
        self.clips.insert(id, clip);
        Ok(id)
    }

    /// Remove a clip, keeping the order of the rest. Rejected while a session is active.
    pub fn remove_clip(&mut self, id: ClipId) -> Result<TimelineClip> {
        self.ensure_no_session()?;
        self.clips.shift_remove(&id).ok_or(TimelineError::ClipNotFound(id))
    }

    /// Duplicate a clip right after its source. Rejected while a session is active.
    pub fn duplicate_clip(&mut self, id: ClipId) -> Result<ClipId> {
        self.ensure_no_session()?;
        let index = self.clips.get_index_of(&id).ok_or(TimelineError::ClipNotFound(id))?;
        let source = &self.clips[index];
        let behavior = source.behavior.duplicate().ok_or(TimelineError::NotDuplicable(id))?;

        let mut settings = source.settings.clone();
        settings.id = ClipId::new();
        settings.name = format!("{} (Copy)", settings.name);
        let new_id = settings.id;

        self.clips.shift_insert(index + 1, new_id, TimelineClip::new(settings, behavior));
        Ok(new_id)
    }

    /// Reset a clip's behavior to its defaults and clear its lifecycle flags
    pub fn reset_clip(&mut self, id: ClipId) -> Result<()> {
        let clip = self.clips.get_mut(&id).ok_or(TimelineError::ClipNotFound(id))?;
        clip.behavior.reset_to_defaults();
        clip.state.reset();
        Ok(())
    }

    /// Get a clip
    pub fn clip(&self, id: ClipId) -> Option<&TimelineClip> {
        self.clips.get(&id)
    }

    /// Get a mutable clip.
    ///
    /// Order changes made during a session apply to the next one.
    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut TimelineClip> {
        self.clips.get_mut(&id)
    }

    /// All clips in collection order
    pub fn clips(&self) -> impl Iterator<Item = &TimelineClip> {
        self.clips.values()
    }

    /// Clip count
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Clips reporting a configuration error, with the reason
    pub fn clip_errors(&self) -> Vec<(ClipId, String)> {
        self.clips
            .values()
            .filter_map(|clip| clip.configuration_error().map(|reason| (clip.id(), reason)))
            .collect()
    }

    /// End time of the last clip
    pub fn content_duration(&self) -> f32 {
        self.clips
            .values()
            .map(|c| c.settings.end_time())
            .fold(0.0, f32::max)
    }

    fn ensure_no_session(&self) -> Result<()> {
        if self.session.is_some() {
            return Err(TimelineError::SessionActive);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Host lifecycle
    // ---------------------------------------------------------------------

    /// Host started; plays when the play mode is [`PlayMode::OnStart`]
    pub fn on_start(&mut self) {
        if self.play_mode == PlayMode::OnStart {
            self.play();
        }
    }

    /// Host enabled; plays when the play mode is [`PlayMode::OnEnable`]
    pub fn on_enable(&mut self) {
        if self.play_mode == PlayMode::OnEnable {
            self.play();
        }
    }

    /// Host disabled; ends playback or preview
    pub fn on_disable(&mut self) {
        if self.is_previewing() {
            self.stop_preview();
        }
        if self.clock.state() != ClockState::Stopped {
            self.stop();
        }
    }

    // ---------------------------------------------------------------------
    // Transport
    // ---------------------------------------------------------------------

    /// Start playback from the beginning.
    ///
    /// Any running playback or preview is stopped first. Session setup runs
    /// on the next [`update`](Self::update).
    pub fn play(&mut self) {
        if self.is_previewing() {
            self.stop_preview();
        }
        if self.clock.state() != ClockState::Stopped {
            self.stop();
        }
        self.clock.begin();
        tracing::info!("Timeline '{}' play requested", self.name);
    }

    /// Pause playback. Returns false unless currently playing.
    pub fn pause(&mut self) -> bool {
        if !self.clock.pause() {
            return false;
        }
        self.events.dispatch(&PlayerEvent::Paused);
        if let Some(session) = &self.session {
            for id in session.clip_ids() {
                if let Some(clip) = self.clips.get_mut(id) {
                    report(&clip.settings, "on_pause", clip.behavior.on_pause());
                }
            }
        }
        tracing::info!("Timeline '{}' paused at {:.3}s", self.name, self.clock.elapsed());
        true
    }

    /// Resume playback. Returns false unless currently paused.
    pub fn resume(&mut self) -> bool {
        if !self.clock.resume() {
            return false;
        }
        self.events.dispatch(&PlayerEvent::Resumed);
        if let Some(session) = &self.session {
            for id in session.clip_ids() {
                if let Some(clip) = self.clips.get_mut(id) {
                    report(&clip.settings, "on_resume", clip.behavior.on_resume());
                }
            }
        }
        tracing::info!("Timeline '{}' resumed", self.name);
        true
    }

    /// Stop playback and reset elapsed time. Returns false when already stopped.
    pub fn stop(&mut self) -> bool {
        if self.clock.state() == ClockState::Stopped {
            return false;
        }
        if let Some(session) = self.session.take() {
            for id in session.clip_ids() {
                if let Some(clip) = self.clips.get_mut(id) {
                    report(&clip.settings, "on_stop", clip.behavior.on_stop());
                }
            }
        }
        self.events.dispatch(&PlayerEvent::Stopped);
        self.clock.stop();
        tracing::info!("Timeline '{}' stopped", self.name);
        true
    }

    /// Advance playback by one frame
    pub fn update(&mut self, frame: FrameTime) {
        match self.clock.state() {
            ClockState::Stopped | ClockState::Paused => return,
            ClockState::Starting => self.start_playing(),
            ClockState::Playing => {}
        }

        let time = self.clock.tick(frame.select(self.time_mode));
        self.evaluate_session(time);
        self.handle_boundary();
    }

    /// Move to `time` and evaluate the session there.
    ///
    /// Uses forced evaluation during preview. Without a session only the
    /// elapsed time changes.
    pub fn evaluate(&mut self, time: f32) {
        let time = self.set_elapsed_time(time);
        if self.session.is_none() {
            tracing::debug!("Timeline '{}' evaluated without a session", self.name);
            return;
        }
        self.evaluate_session(time);
    }

    /// Start a new loop pass: reset clip flags, roll play chance, fire hooks.
    ///
    /// Without an active session this logs an error and does nothing.
    pub fn start_loop(&mut self) {
        let Some(session) = &self.session else {
            tracing::error!("Timeline '{}': start_loop called without an active session", self.name);
            return;
        };

        let loop_index = self.clock.loops_completed();
        let direction = self.clock.direction();
        let is_previewing = session.is_preview();

        self.events.dispatch(&PlayerEvent::StartLoop { loop_index, direction });
        for id in session.clip_ids() {
            let Some(clip) = self.clips.get_mut(id) else {
                continue;
            };
            clip.state.reset();
            clip.state.play_chance_passed =
                is_previewing || roll_play_chance(self.rng.as_mut(), clip.settings.play_chance());
            report(
                &clip.settings,
                "on_start_loop",
                clip.behavior.on_start_loop(loop_index, direction, is_previewing),
            );
        }
        tracing::debug!("Timeline '{}' loop {} started ({:?})", self.name, loop_index, direction);
    }

    fn start_playing(&mut self) {
        let session = PlaybackSession::for_playback(&self.clips);
        tracing::info!("Timeline '{}' started with {} clips", self.name, session.len());
        self.clock.mark_started();

        let direction = self.clock.direction();
        self.events.dispatch(&PlayerEvent::StartPlaying { direction });
        for id in session.clip_ids() {
            if let Some(clip) = self.clips.get_mut(id) {
                report(
                    &clip.settings,
                    "on_start_playing",
                    clip.behavior.on_start_playing(direction, false),
                );
            }
        }
        self.session = Some(session);
        self.start_loop();
        self.evaluate_session(self.clock.elapsed());
    }

    fn evaluate_session(&mut self, time: f32) {
        let Some(session) = &self.session else {
            return;
        };
        let direction = self.clock.direction();
        let preview = session.is_preview();
        for id in session.clip_ids() {
            if let Some(clip) = self.clips.get_mut(id) {
                if preview {
                    evaluation::evaluate_force(clip, time);
                } else {
                    evaluation::evaluate_normal(clip, time, direction);
                }
            }
        }
    }

    fn handle_boundary(&mut self) {
        let action = self.clock.check_boundary();
        if action == BoundaryAction::Continue {
            return;
        }

        // Clips were evaluated at the boundary; close the ones still open.
        let direction = self.clock.direction();
        if let Some(session) = &self.session {
            for id in session.clip_ids() {
                if let Some(clip) = self.clips.get_mut(id) {
                    evaluation::exit_at_boundary(clip, direction);
                }
            }
        }
        self.complete_loop(false);

        match action {
            BoundaryAction::Terminate => self.complete_playing(false),
            BoundaryAction::Reverse => {
                self.clock.reverse();
                self.start_loop();
                self.evaluate_session(self.clock.elapsed());
            }
            BoundaryAction::Restart => {
                self.clock.restart();
                self.start_loop();
                self.evaluate_session(self.clock.elapsed());
            }
            BoundaryAction::Continue => {}
        }
    }

    fn complete_loop(&mut self, is_previewing: bool) {
        let loop_index = self.clock.loops_completed().saturating_sub(1);
        self.events.dispatch(&PlayerEvent::CompleteLoop { loop_index });
        if let Some(session) = &self.session {
            for id in session.clip_ids() {
                if let Some(clip) = self.clips.get_mut(id) {
                    report(
                        &clip.settings,
                        "on_complete_loop",
                        clip.behavior.on_complete_loop(loop_index, is_previewing),
                    );
                }
            }
        }
        tracing::debug!("Timeline '{}' loop {} complete", self.name, loop_index);
    }

    fn complete_playing(&mut self, is_previewing: bool) {
        self.events.dispatch(&PlayerEvent::CompletePlaying);
        if let Some(session) = self.session.take() {
            for id in session.clip_ids() {
                if let Some(clip) = self.clips.get_mut(id) {
                    report(
                        &clip.settings,
                        "on_complete_playing",
                        clip.behavior.on_complete_playing(is_previewing),
                    );
                }
            }
        }
        self.clock.stop();
        tracing::info!("Timeline '{}' complete", self.name);
    }

    // ---------------------------------------------------------------------
    // Preview
    // ---------------------------------------------------------------------

    /// Enter preview mode, stopping playback first
    pub fn start_preview(&mut self) {
        if self.is_previewing() {
            return;
        }
        if self.clock.state() != ClockState::Stopped {
            self.stop();
        }

        let ctx = PreviewContext {
            timeline_duration: self.clock.duration(),
            elapsed_time: self.clock.elapsed(),
        };
        let session = PlaybackSession::for_preview(&self.clips, &ctx);
        let direction = self.clock.direction();

        self.events.dispatch(&PlayerEvent::PreviewStarted);
        self.events.dispatch(&PlayerEvent::StartPlaying { direction });
        for id in session.clip_ids() {
            if let Some(clip) = self.clips.get_mut(id) {
                clip.state.reset();
                clip.state.play_chance_passed = true;
                report(
                    &clip.settings,
                    "on_start_playing",
                    clip.behavior.on_start_playing(direction, true),
                );
            }
        }
        self.events.dispatch(&PlayerEvent::StartLoop { loop_index: 0, direction });
        for id in session.clip_ids() {
            if let Some(clip) = self.clips.get_mut(id) {
                report(
                    &clip.settings,
                    "on_start_loop",
                    clip.behavior.on_start_loop(0, direction, true),
                );
            }
        }
        tracing::info!("Timeline '{}' preview started with {} clips", self.name, session.len());
        self.session = Some(session);
    }

    /// Scrub the preview to `time`
    pub fn evaluate_preview(&mut self, time: f32) {
        if !self.is_previewing() {
            tracing::warn!("Timeline '{}': evaluate_preview called outside preview mode", self.name);
            return;
        }
        self.evaluate(time);
    }

    /// Leave preview mode.
    ///
    /// Active clips get a last update at the current time and exit, then the
    /// loop and playback completion hooks run as they do when playback ends.
    pub fn stop_preview(&mut self) -> bool {
        if !self.is_previewing() {
            return false;
        }
        let time = self.clock.elapsed();
        if let Some(session) = &self.session {
            for id in session.clip_ids() {
                if let Some(clip) = self.clips.get_mut(id) {
                    evaluation::exit_preview(clip, time);
                    clip.state.reset();
                }
            }
        }
        self.complete_loop(true);
        self.complete_playing(true);
        self.events.dispatch(&PlayerEvent::PreviewStopped);
        tracing::info!("Timeline '{}' preview stopped", self.name);
        true
    }
}

impl Default for TimelinePlayer {
    fn default() -> Self {
        Self::new("Untitled Timeline")
    }
}

impl std::fmt::Debug for TimelinePlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelinePlayer")
            .field("name", &self.name)
            .field("clock", &self.clock)
            .field("clips", &self.clips.len())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

/// Roll a play chance percentage
fn roll_play_chance(rng: &mut dyn RngCore, chance: f32) -> bool {
    if chance >= 100.0 {
        true
    } else if chance <= 0.0 {
        false
    } else {
        rng.gen_range(0.0..100.0) < chance
    }
}
