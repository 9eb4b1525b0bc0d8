// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline clock: elapsed time, direction and loop policy.

use crate::config::{LoopCount, LoopType};
use serde::{Deserialize, Serialize};

/// Playback direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PlayDirection {
    /// Time increases
    #[default]
    Forward,
    /// Time decreases
    Backward,
}

impl PlayDirection {
    /// +1 for forward, -1 for backward
    pub fn sign(&self) -> f32 {
        match self {
            Self::Forward => 1.0,
            Self::Backward => -1.0,
        }
    }

    /// The opposite direction
    pub fn reversed(&self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// Clock state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockState {
    /// Not playing
    #[default]
    Stopped,
    /// Play requested; session setup happens on the next update
    Starting,
    /// Advancing time
    Playing,
    /// Suspended
    Paused,
}

/// What to do after a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryAction {
    /// No boundary reached
    Continue,
    /// Ping-pong: flip direction and play back from the current boundary
    Reverse,
    /// Loop: jump back to the loop start boundary
    Restart,
    /// Playback finished
    Terminate,
}

/// Owns elapsed time, direction and loop counting
#[derive(Debug, Clone)]
pub struct TimelineClock {
    state: ClockState,
    elapsed: f32,
    duration: f32,
    direction: PlayDirection,
    loops_completed: u32,
    /// Boundary policy
    pub loop_type: LoopType,
    /// Number of passes before playback terminates
    pub loop_count: LoopCount,
    /// Direction used when playback (re)starts
    pub default_direction: PlayDirection,
    speed: f32,
}

impl TimelineClock {
    /// Create a new stopped clock
    pub fn new(duration: f32) -> Self {
        Self {
            state: ClockState::Stopped,
            elapsed: 0.0,
            duration: duration.max(0.0),
            direction: PlayDirection::Forward,
            loops_completed: 0,
            loop_type: LoopType::default(),
            loop_count: LoopCount::default(),
            default_direction: PlayDirection::Forward,
            speed: 1.0,
        }
    }

    /// Current state
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Elapsed time in seconds
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Timeline duration in seconds
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Current direction
    pub fn direction(&self) -> PlayDirection {
        self.direction
    }

    /// Completed loop passes since playback started
    pub fn loops_completed(&self) -> u32 {
        self.loops_completed
    }

    /// Playback speed multiplier
    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Set the speed multiplier, clamped to >= 0
    pub fn set_speed(&mut self, speed: f32) {
        self.speed = if speed.is_nan() { 0.0 } else { speed.max(0.0) };
    }

    /// Set the duration, clamped to >= 0. Elapsed time is clamped into the new range.
    pub fn set_duration(&mut self, duration: f32) {
        self.duration = if duration.is_nan() { 0.0 } else { duration.max(0.0) };
        self.elapsed = self.clamp_time(self.elapsed);
    }

    /// Set elapsed time, clamped to `[0, duration]`. Returns the stored value.
    pub fn set_elapsed(&mut self, time: f32) -> f32 {
        self.elapsed = self.clamp_time(time);
        self.elapsed
    }

    /// Clamp a time into `[0, duration]`
    pub fn clamp_time(&self, time: f32) -> f32 {
        if time.is_nan() {
            0.0
        } else {
            time.clamp(0.0, self.duration)
        }
    }

    /// Boundary a pass in `direction` starts from
    pub fn start_boundary(&self, direction: PlayDirection) -> f32 {
        match direction {
            PlayDirection::Forward => 0.0,
            PlayDirection::Backward => self.duration,
        }
    }

    /// Is the clock playing or about to
    pub fn is_running(&self) -> bool {
        matches!(self.state, ClockState::Starting | ClockState::Playing)
    }

    /// Stopped -> Starting. Resets time, direction and loop counter.
    pub fn begin(&mut self) {
        self.direction = self.default_direction;
        self.elapsed = self.start_boundary(self.direction);
        self.loops_completed = 0;
        self.state = ClockState::Starting;
    }

    /// Starting -> Playing
    pub fn mark_started(&mut self) {
        if self.state == ClockState::Starting {
            self.state = ClockState::Playing;
        }
    }

    /// Playing -> Paused
    pub fn pause(&mut self) -> bool {
        if self.state == ClockState::Playing {
            self.state = ClockState::Paused;
            true
        } else {
            false
        }
    }

    /// Paused -> Playing
    pub fn resume(&mut self) -> bool {
        if self.state == ClockState::Paused {
            self.state = ClockState::Playing;
            true
        } else {
            false
        }
    }

    /// Any -> Stopped, elapsed reset to 0
    pub fn stop(&mut self) {
        self.state = ClockState::Stopped;
        self.elapsed = 0.0;
        self.loops_completed = 0;
    }

    /// Advance time by `delta_time` scaled by speed and direction
    pub fn tick(&mut self, delta_time: f32) -> f32 {
        let step = delta_time.max(0.0) * self.speed * self.direction.sign();
        self.set_elapsed(self.elapsed + step)
    }

    /// Has the current pass reached its end boundary
    pub fn reached_boundary(&self) -> bool {
        match self.direction {
            PlayDirection::Forward => self.elapsed >= self.duration,
            PlayDirection::Backward => self.elapsed <= 0.0,
        }
    }

    /// Decide what happens after a tick.
    ///
    /// Counts the finished pass when a boundary was reached. The caller
    /// evaluates clips at the boundary before acting on the result.
    pub fn check_boundary(&mut self) -> BoundaryAction {
        if !self.reached_boundary() {
            return BoundaryAction::Continue;
        }

        self.loops_completed += 1;

        if self.loop_type == LoopType::Once || self.loop_count.is_exhausted(self.loops_completed) {
            return BoundaryAction::Terminate;
        }

        match self.loop_type {
            LoopType::PingPong => BoundaryAction::Reverse,
            LoopType::Loop | LoopType::Once => BoundaryAction::Restart,
        }
    }

    /// Flip direction, staying at the current boundary
    pub fn reverse(&mut self) {
        self.direction = self.direction.reversed();
    }

    /// Reset direction to default and jump to its start boundary
    pub fn restart(&mut self) {
        self.direction = self.default_direction;
        self.elapsed = self.start_boundary(self.direction);
    }
}

impl Default for TimelineClock {
    fn default() -> Self {
        Self::new(10.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_clamps() {
        let mut clock = TimelineClock::new(10.0);
        clock.begin();
        clock.mark_started();
        assert_eq!(clock.tick(4.0), 4.0);
        assert_eq!(clock.tick(20.0), 10.0);
        assert!(clock.reached_boundary());
    }

    #[test]
    fn test_tick_backward_with_speed() {
        let mut clock = TimelineClock::new(10.0);
        clock.default_direction = PlayDirection::Backward;
        clock.set_speed(2.0);
        clock.begin();
        assert_eq!(clock.elapsed(), 10.0);
        assert_eq!(clock.tick(1.0), 8.0);
        assert_eq!(clock.tick(10.0), 0.0);
        assert!(clock.reached_boundary());
    }

    #[test]
    fn test_speed_clamped() {
        let mut clock = TimelineClock::default();
        clock.set_speed(-3.0);
        assert_eq!(clock.speed(), 0.0);
    }

    #[test]
    fn test_set_elapsed_clamps() {
        let mut clock = TimelineClock::new(10.0);
        assert_eq!(clock.set_elapsed(-5.0), 0.0);
        assert_eq!(clock.set_elapsed(15.0), 10.0);
    }

    #[test]
    fn test_state_transitions() {
        let mut clock = TimelineClock::default();
        assert!(!clock.pause());
        clock.begin();
        assert_eq!(clock.state(), ClockState::Starting);
        assert!(!clock.pause());
        clock.mark_started();
        assert!(clock.pause());
        assert!(!clock.pause());
        assert!(clock.resume());
        clock.tick(3.0);
        clock.stop();
        assert_eq!(clock.state(), ClockState::Stopped);
        assert_eq!(clock.elapsed(), 0.0);
    }

    #[test]
    fn test_once_terminates() {
        let mut clock = TimelineClock::new(1.0);
        clock.loop_type = LoopType::Once;
        clock.loop_count = LoopCount::Infinite;
        clock.begin();
        clock.mark_started();
        clock.tick(0.5);
        assert_eq!(clock.check_boundary(), BoundaryAction::Continue);
        clock.tick(0.5);
        assert_eq!(clock.check_boundary(), BoundaryAction::Terminate);
        assert_eq!(clock.loops_completed(), 1);
    }

    #[test]
    fn test_ping_pong_reverses_until_count() {
        let mut clock = TimelineClock::new(1.0);
        clock.loop_type = LoopType::PingPong;
        clock.loop_count = LoopCount::Times(2);
        clock.begin();
        clock.mark_started();

        clock.tick(1.0);
        assert_eq!(clock.check_boundary(), BoundaryAction::Reverse);
        clock.reverse();
        assert_eq!(clock.direction(), PlayDirection::Backward);
        assert_eq!(clock.elapsed(), 1.0);

        clock.tick(1.0);
        assert_eq!(clock.elapsed(), 0.0);
        assert_eq!(clock.check_boundary(), BoundaryAction::Terminate);
    }

    #[test]
    fn test_loop_restarts_forever() {
        let mut clock = TimelineClock::new(1.0);
        clock.loop_type = LoopType::Loop;
        clock.loop_count = LoopCount::Infinite;
        clock.begin();
        clock.mark_started();
        for _ in 0..5 {
            clock.tick(1.5);
            assert_eq!(clock.check_boundary(), BoundaryAction::Restart);
            clock.restart();
            assert_eq!(clock.elapsed(), 0.0);
        }
        assert_eq!(clock.loops_completed(), 5);
    }
}
