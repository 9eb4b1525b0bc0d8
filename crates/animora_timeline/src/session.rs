// SPDX-License-Identifier: MIT OR Apache-2.0
//! Playback session: the ordered set of clips taking part in a run.

use crate::clip::{ClipId, PreviewContext, TimelineClip};
use indexmap::IndexMap;

/// Whether a session drives playback or preview scrubbing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    /// Clock-driven playback
    Playback,
    /// Externally scrubbed preview
    Preview,
}

/// Ordered IDs of the clips in a session.
///
/// Built once when the session starts and never re-sorted; reordering clips
/// takes effect on the next session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSession {
    kind: SessionKind,
    clip_ids: Vec<ClipId>,
}

impl PlaybackSession {
    /// Collect playable clips sorted by order index (stable on ties)
    pub fn for_playback(clips: &IndexMap<ClipId, TimelineClip>) -> Self {
        Self::collect(SessionKind::Playback, clips, TimelineClip::is_playable)
    }

    /// Collect previewable clips sorted by order index (stable on ties)
    pub fn for_preview(clips: &IndexMap<ClipId, TimelineClip>, ctx: &PreviewContext) -> Self {
        Self::collect(SessionKind::Preview, clips, |clip| clip.is_previewable(ctx))
    }

    fn collect(
        kind: SessionKind,
        clips: &IndexMap<ClipId, TimelineClip>,
        filter: impl Fn(&TimelineClip) -> bool,
    ) -> Self {
        let mut selected: Vec<&TimelineClip> = clips
            .values()
            .filter(|clip| {
                if let Some(reason) = clip.configuration_error() {
                    tracing::warn!("Skipping clip '{}': {}", clip.settings.name, reason);
                }
                filter(clip)
            })
            .collect();
        selected.sort_by_key(|clip| clip.settings.order);

        Self {
            kind,
            clip_ids: selected.into_iter().map(TimelineClip::id).collect(),
        }
    }

    /// Session kind
    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    /// Is this a preview session
    pub fn is_preview(&self) -> bool {
        self.kind == SessionKind::Preview
    }

    /// Clip IDs in evaluation order
    pub fn clip_ids(&self) -> &[ClipId] {
        &self.clip_ids
    }

    /// Number of clips in the session
    pub fn len(&self) -> usize {
        self.clip_ids.len()
    }

    /// Session has no clips
    pub fn is_empty(&self) -> bool {
        self.clip_ids.is_empty()
    }
}
