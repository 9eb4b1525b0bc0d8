// SPDX-License-Identifier: MIT OR Apache-2.0
//! Clip definitions for the timeline.
//!
//! A clip is split in two halves:
//! - [`ClipSettings`] holds the persisted timing data (start, duration, order,
//!   play chance, allowed direction)
//! - [`ClipBehavior`] is the user-supplied callback surface
//!
//! [`TimelineClip`] bundles both with the transient [`ClipLifecycleState`].

use crate::clock::PlayDirection;
use crate::error::ClipError;
use crate::state::ClipLifecycleState;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a clip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClipId(pub Uuid);

impl ClipId {
    /// Create a new random clip ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClipId {
    fn default() -> Self {
        Self::new()
    }
}

/// Directions a clip is allowed to play in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AllowedDirection {
    /// Only while the timeline plays forward
    Forward,
    /// Only while the timeline plays backward
    Backward,
    /// Either direction
    #[default]
    Both,
}

impl AllowedDirection {
    /// Whether a clip with this policy plays in `direction`
    pub fn allows(&self, direction: PlayDirection) -> bool {
        match self {
            Self::Both => true,
            Self::Forward => direction == PlayDirection::Forward,
            Self::Backward => direction == PlayDirection::Backward,
        }
    }
}

/// Persisted timing data of a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSettings {
    /// Unique clip ID
    pub id: ClipId,
    /// Display name
    pub name: String,
    /// Start time in seconds
    start_time: f32,
    /// Duration in seconds
    duration: f32,
    /// Execution order within a session (ascending)
    pub order: i32,
    /// Whether the clip participates in playback
    pub enabled: bool,
    /// Chance (0-100) the clip plays in a given loop pass
    play_chance: f32,
    /// Directions the clip plays in
    pub allowed_direction: AllowedDirection,
}

impl ClipSettings {
    /// Create new clip settings
    pub fn new(name: impl Into<String>, start_time: f32, duration: f32) -> Self {
        Self {
            id: ClipId::new(),
            name: name.into(),
            start_time: start_time.max(0.0),
            duration: duration.max(0.0),
            order: 0,
            enabled: true,
            play_chance: 100.0,
            allowed_direction: AllowedDirection::Both,
        }
    }

    /// Set the execution order
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Set the play chance percentage
    pub fn with_play_chance(mut self, chance: f32) -> Self {
        self.set_play_chance(chance);
        self
    }

    /// Restrict the directions the clip plays in
    pub fn with_allowed_direction(mut self, direction: AllowedDirection) -> Self {
        self.allowed_direction = direction;
        self
    }

    /// Set the enabled flag
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Start time in seconds
    pub fn start_time(&self) -> f32 {
        self.start_time
    }

    /// Duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// End time (start + duration)
    pub fn end_time(&self) -> f32 {
        self.start_time + self.duration
    }

    /// Play chance percentage in [0, 100]
    pub fn play_chance(&self) -> f32 {
        self.play_chance
    }

    /// Set the start time, clamped to >= 0
    pub fn set_start_time(&mut self, time: f32) {
        self.start_time = time.max(0.0);
    }

    /// Set the duration, clamped to >= 0
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = duration.max(0.0);
    }

    /// Set the play chance, clamped to [0, 100]
    pub fn set_play_chance(&mut self, chance: f32) {
        self.play_chance = if chance.is_nan() { 0.0 } else { chance.clamp(0.0, 100.0) };
    }

    /// Re-apply the clamping rules to values that bypassed the setters,
    /// e.g. fields read straight from a document
    pub fn sanitized(mut self) -> Self {
        self.set_start_time(self.start_time);
        self.set_duration(self.duration);
        self.set_play_chance(self.play_chance);
        self
    }
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self::new("Clip", 0.0, 1.0)
    }
}

/// Arguments passed to [`ClipBehavior::on_evaluate`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EvaluateContext {
    /// Global timeline time
    pub time: f32,
    /// Time relative to the clip start
    pub clip_time: f32,
    /// Clip progress in [0, 1]
    pub normalized_time: f32,
    /// Whether this is a preview (scrub) evaluation
    pub is_previewing: bool,
}

/// Arguments passed to [`ClipBehavior::can_be_previewed`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewContext {
    /// Timeline duration at preview start
    pub timeline_duration: f32,
    /// Elapsed time at preview start
    pub elapsed_time: f32,
}

/// Callback surface of a clip.
///
/// Every callback has a no-op default. Callbacks return an error instead of
/// panicking; the player logs the error and keeps going.
pub trait ClipBehavior {
    /// Clip became active
    fn enter(&mut self) -> Result<(), ClipError> {
        Ok(())
    }

    /// Clip became inactive
    fn exit(&mut self) -> Result<(), ClipError> {
        Ok(())
    }

    /// Called while the clip is active
    fn on_evaluate(&mut self, _ctx: &EvaluateContext) -> Result<(), ClipError> {
        Ok(())
    }

    /// Called on every evaluation whether or not the clip is active
    fn on_evaluate_all_time(&mut self, _time: f32, _is_previewing: bool) -> Result<(), ClipError> {
        Ok(())
    }

    /// Playback sequence started
    fn on_start_playing(&mut self, _direction: PlayDirection, _is_previewing: bool) -> Result<(), ClipError> {
        Ok(())
    }

    /// Playback sequence finished
    fn on_complete_playing(&mut self, _is_previewing: bool) -> Result<(), ClipError> {
        Ok(())
    }

    /// Loop pass started
    fn on_start_loop(&mut self, _loop_index: u32, _direction: PlayDirection, _is_previewing: bool) -> Result<(), ClipError> {
        Ok(())
    }

    /// Loop pass finished
    fn on_complete_loop(&mut self, _loop_index: u32, _is_previewing: bool) -> Result<(), ClipError> {
        Ok(())
    }

    /// Playback paused
    fn on_pause(&mut self) -> Result<(), ClipError> {
        Ok(())
    }

    /// Playback resumed
    fn on_resume(&mut self) -> Result<(), ClipError> {
        Ok(())
    }

    /// Playback stopped
    fn on_stop(&mut self) -> Result<(), ClipError> {
        Ok(())
    }

    /// Whether the clip takes part in preview scrubbing
    fn can_be_previewed(&self, _ctx: &PreviewContext) -> bool {
        true
    }

    /// Describe a configuration problem, if any.
    ///
    /// Clips reporting an error are left out of playback sessions.
    fn configuration_error(&self) -> Option<String> {
        None
    }

    /// Restore the behavior's own fields to their defaults
    fn reset_to_defaults(&mut self) {}

    /// Clone the behavior for clip duplication
    fn duplicate(&self) -> Option<Box<dyn ClipBehavior>> {
        None
    }
}

/// Behavior that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyBehavior;

impl ClipBehavior for EmptyBehavior {
    fn duplicate(&self) -> Option<Box<dyn ClipBehavior>> {
        Some(Box::new(*self))
    }
}

/// A clip placed on the timeline
pub struct TimelineClip {
    /// Persisted timing data
    pub settings: ClipSettings,
    /// Transient lifecycle flags
    pub state: ClipLifecycleState,
    /// Callback surface
    pub behavior: Box<dyn ClipBehavior>,
}

impl TimelineClip {
    /// Create a new timeline clip
    pub fn new(settings: ClipSettings, behavior: Box<dyn ClipBehavior>) -> Self {
        Self {
            settings,
            state: ClipLifecycleState::default(),
            behavior,
        }
    }

    /// Clip ID
    pub fn id(&self) -> ClipId {
        self.settings.id
    }

    /// Whether the clip can be played in `direction` during the current loop pass
    pub fn can_be_played(&self, direction: PlayDirection) -> bool {
        self.settings.enabled
            && self.state.play_chance_passed
            && self.settings.allowed_direction.allows(direction)
    }

    /// Whether the clip belongs in a playback session
    pub fn is_playable(&self) -> bool {
        self.settings.enabled && self.behavior.configuration_error().is_none()
    }

    /// Whether the clip belongs in a preview session
    pub fn is_previewable(&self, ctx: &PreviewContext) -> bool {
        self.is_playable() && self.behavior.can_be_previewed(ctx)
    }

    /// Configuration problem reported by the behavior
    pub fn configuration_error(&self) -> Option<String> {
        self.behavior.configuration_error()
    }
}

impl std::fmt::Debug for TimelineClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimelineClip")
            .field("settings", &self.settings)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Log a failed clip callback without interrupting evaluation
pub(crate) fn report(clip: &ClipSettings, callback: &str, result: Result<(), ClipError>) {
    if let Err(e) = result {
        tracing::warn!("Clip '{}' ({:?}) failed in {}: {}", clip.name, clip.id, callback, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_clamp() {
        let mut settings = ClipSettings::new("Fade", -2.0, -1.0);
        assert_eq!(settings.start_time(), 0.0);
        assert_eq!(settings.duration(), 0.0);

        settings.set_play_chance(150.0);
        assert_eq!(settings.play_chance(), 100.0);
        settings.set_play_chance(-3.0);
        assert_eq!(settings.play_chance(), 0.0);
    }

    #[test]
    fn test_sanitized_restores_invariants() {
        let raw: ClipSettings =
            serde_json::from_str(r#"{"name": "Raw", "start_time": -2.0, "duration": -3.0, "play_chance": 250.0}"#)
                .unwrap();
        assert_eq!(raw.start_time(), -2.0);

        let settings = raw.sanitized();
        assert_eq!(settings.start_time(), 0.0);
        assert_eq!(settings.duration(), 0.0);
        assert_eq!(settings.end_time(), 0.0);
        assert_eq!(settings.play_chance(), 100.0);
        assert_eq!(settings.name, "Raw");
    }

    #[test]
    fn test_end_time() {
        let settings = ClipSettings::new("Move", 2.0, 3.0);
        assert_eq!(settings.end_time(), 5.0);
    }

    #[test]
    fn test_allowed_direction() {
        assert!(AllowedDirection::Both.allows(PlayDirection::Backward));
        assert!(AllowedDirection::Forward.allows(PlayDirection::Forward));
        assert!(!AllowedDirection::Forward.allows(PlayDirection::Backward));
        assert!(!AllowedDirection::Backward.allows(PlayDirection::Forward));
    }

    #[test]
    fn test_can_be_played_requires_play_chance() {
        let mut clip = TimelineClip::new(ClipSettings::new("A", 0.0, 1.0), Box::new(EmptyBehavior));
        assert!(!clip.can_be_played(PlayDirection::Forward));

        clip.state.play_chance_passed = true;
        assert!(clip.can_be_played(PlayDirection::Forward));

        clip.settings.enabled = false;
        assert!(!clip.can_be_played(PlayDirection::Forward));
    }

    struct Broken;

    impl ClipBehavior for Broken {
        fn configuration_error(&self) -> Option<String> {
            Some("missing target".to_string())
        }
    }

    #[test]
    fn test_configuration_error_excludes_clip() {
        let clip = TimelineClip::new(ClipSettings::default(), Box::new(Broken));
        assert!(!clip.is_playable());
        assert_eq!(clip.configuration_error().as_deref(), Some("missing target"));
    }
}
