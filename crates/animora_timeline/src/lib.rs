// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timeline playback engine for Animora.
//!
//! This crate plays clips placed on a timeline:
//! - Enter/update/exit lifecycle per clip
//! - Loop, ping-pong and single-pass playback
//! - Per-clip play chance and direction filters
//! - Preview scrubbing with forced evaluation
//! - Persisted playback documents (RON/JSON)
//!
//! ## Architecture
//!
//! Leaf to root:
//! - [`evaluation`] decides when a single clip enters, updates and exits
//! - [`state`] holds the per-clip lifecycle flags
//! - [`clock`] advances time and applies the loop policy
//! - [`player`] owns clock, clips and session and exposes the playback API

pub mod clip;
pub mod clips;
pub mod clock;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod events;
pub mod player;
pub mod session;
pub mod state;

pub use clip::{
    AllowedDirection, ClipBehavior, ClipId, ClipSettings, EmptyBehavior, EvaluateContext,
    PreviewContext, TimelineClip,
};
pub use clips::{TracingClip, ValueClip};
pub use clock::{BoundaryAction, ClockState, PlayDirection, TimelineClock};
pub use config::{LoopCount, LoopType, PlayMode, PlayerConfig, TimeMode, TimelineDocument};
pub use error::{ClipError, ListenerError, Result, TimelineError};
pub use events::{EventBus, ListenerId, PlayerEvent};
pub use player::{FrameTime, TimelinePlayer};
pub use session::{PlaybackSession, SessionKind};
pub use state::ClipLifecycleState;
