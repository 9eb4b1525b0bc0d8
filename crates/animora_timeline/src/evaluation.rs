// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-clip evaluation.
//!
//! Two evaluators decide when a clip enters, updates and exits:
//! - [`evaluate_normal`] for streaming playback, where time moves
//!   monotonically in the current direction
//! - [`evaluate_force`] for preview scrubbing, where time can jump anywhere
//!
//! Normalized time handed to clips is always in `[0, 1]`. Zero-length clips
//! use a duration of 1 for the division only; their time window stays empty.

use crate::clip::{report, EvaluateContext, TimelineClip};
use crate::clock::PlayDirection;

/// Duration used as divisor when computing normalized time
pub fn safe_duration(duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        duration
    }
}

/// Clip progress at `time`, clamped to `[0, 1]`
pub fn normalized_time(start_time: f32, duration: f32, time: f32) -> f32 {
    let t = (time - start_time) / safe_duration(duration);
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

fn update(clip: &mut TimelineClip, time: f32, normalized: f32, is_previewing: bool) {
    let ctx = EvaluateContext {
        time,
        clip_time: normalized * clip.settings.duration(),
        normalized_time: normalized,
        is_previewing,
    };
    report(&clip.settings, "on_evaluate", clip.behavior.on_evaluate(&ctx));
}

fn update_at(clip: &mut TimelineClip, time: f32, is_previewing: bool) {
    let normalized = normalized_time(clip.settings.start_time(), clip.settings.duration(), time);
    update(clip, time, normalized, is_previewing);
}

fn enter(clip: &mut TimelineClip) {
    clip.state.mark_entered();
    tracing::debug!("Clip '{}' entered", clip.settings.name);
    report(&clip.settings, "enter", clip.behavior.enter());
}

fn exit(clip: &mut TimelineClip) {
    clip.state.mark_exited();
    tracing::debug!("Clip '{}' exited", clip.settings.name);
    report(&clip.settings, "exit", clip.behavior.exit());
}

/// Advance a clip during normal playback.
///
/// Clips that fail [`TimelineClip::can_be_played`] are skipped entirely.
pub fn evaluate_normal(clip: &mut TimelineClip, time: f32, direction: PlayDirection) {
    if !clip.can_be_played(direction) {
        return;
    }

    let start = clip.settings.start_time();
    let end = clip.settings.end_time();
    let inside = start <= time && time <= end;

    if !clip.state.has_entered && inside {
        enter(clip);
        update_at(clip, time, false);
    } else if clip.state.is_active() {
        match direction {
            PlayDirection::Forward if time > end => {
                update(clip, end, 1.0, false);
                exit(clip);
            }
            PlayDirection::Backward if time < start => {
                update(clip, start, 0.0, false);
                exit(clip);
            }
            _ => update_at(clip, time, false),
        }
    }

    report(
        &clip.settings,
        "on_evaluate_all_time",
        clip.behavior.on_evaluate_all_time(time, false),
    );
}

/// Advance a clip during preview scrubbing.
///
/// Does not check play chance or direction; the caller decides which clips
/// take part.
pub fn evaluate_force(clip: &mut TimelineClip, time: f32) {
    let start = clip.settings.start_time();
    let end = clip.settings.end_time();

    if time >= end {
        if clip.state.is_previewing_completed {
            update_at(clip, time, true);
        } else if clip.state.is_active() {
            update(clip, end, 1.0, true);
            exit(clip);
            clip.state.is_previewing_completed = true;
        }
        // Allow re-entry when scrubbing back into the window
        clip.state.has_entered = false;
        clip.state.has_exited = false;
    } else if time >= start {
        if !clip.state.has_entered {
            clip.state.is_previewing_completed = false;
            enter(clip);
        }
        update_at(clip, time, true);
    } else {
        if clip.state.has_entered {
            update(clip, start, 0.0, true);
            exit(clip);
            clip.state.has_entered = false;
        }
        clip.state.is_previewing_completed = false;
    }

    report(
        &clip.settings,
        "on_evaluate_all_time",
        clip.behavior.on_evaluate_all_time(time, true),
    );
}

/// Close a clip that is still active when a loop pass hits the timeline boundary.
///
/// Sends the terminal update for `direction` (1 forward, 0 backward) and
/// exits. Inactive clips are left untouched.
pub fn exit_at_boundary(clip: &mut TimelineClip, direction: PlayDirection) {
    if !clip.state.is_active() {
        return;
    }
    match direction {
        PlayDirection::Forward => {
            let end = clip.settings.end_time();
            update(clip, end, 1.0, false);
        }
        PlayDirection::Backward => {
            let start = clip.settings.start_time();
            update(clip, start, 0.0, false);
        }
    }
    exit(clip);
}

/// Exit a clip left active when preview ends.
///
/// The clip gets a final update at `time` before `exit`.
pub fn exit_preview(clip: &mut TimelineClip, time: f32) {
    if clip.state.is_active() {
        update_at(clip, time, true);
        exit(clip);
    }
    clip.state.has_entered = false;
    clip.state.has_exited = false;
}
