// SPDX-License-Identifier: MIT OR Apache-2.0
//! Per-clip lifecycle flags.

/// Transient lifecycle flags of a clip, never persisted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClipLifecycleState {
    /// `enter` fired for the current pass and the clip has not exited yet
    pub has_entered: bool,
    /// `exit` fired for the current pass
    pub has_exited: bool,
    /// A preview scrub passed the clip end at least once
    pub is_previewing_completed: bool,
    /// Play chance roll result for the current loop pass
    pub play_chance_passed: bool,
}

impl ClipLifecycleState {
    /// Clear entered/exited/completed flags ahead of a new pass.
    ///
    /// The play chance result is kept; it is rolled separately at loop start.
    pub fn reset(&mut self) {
        self.has_entered = false;
        self.has_exited = false;
        self.is_previewing_completed = false;
    }

    /// Clip is entered and has not exited
    pub fn is_active(&self) -> bool {
        self.has_entered && !self.has_exited
    }

    /// Mark the clip entered for this pass
    pub(crate) fn mark_entered(&mut self) {
        self.has_entered = true;
        self.has_exited = false;
    }

    /// Mark the clip exited for this pass
    pub(crate) fn mark_exited(&mut self) {
        self.has_exited = true;
    }
}
