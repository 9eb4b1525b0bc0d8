// SPDX-License-Identifier: MIT OR Apache-2.0
//! Error types for the timeline engine.

use crate::clip::ClipId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by fallible timeline operations
#[derive(Debug, Error)]
pub enum TimelineError {
    /// No clip with this ID exists in the timeline
    #[error("Clip not found: {0:?}")]
    ClipNotFound(ClipId),

    /// The clip behavior cannot be duplicated
    #[error("Clip cannot be duplicated: {0:?}")]
    NotDuplicable(ClipId),

    /// Structural edits are not allowed while a session is running
    #[error("Cannot modify clips while a playback or preview session is active")]
    SessionActive,

    /// Loop count below -1
    #[error("Invalid loop count {0}: expected -1 (infinite) or a non-negative count")]
    InvalidLoopCount(i32),

    /// Document version newer than this build understands
    #[error("Unsupported timeline document version {found} (max {supported})")]
    UnsupportedVersion {
        /// Version found in the document
        found: u32,
        /// Highest version this build reads
        supported: u32,
    },

    /// Unknown document file extension
    #[error("Unsupported timeline file format: {0}")]
    UnsupportedFormat(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// RON serialization error
    #[error("RON serialization error: {0}")]
    RonSerialize(#[from] ron::Error),

    /// RON parse error
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for timeline operations
pub type Result<T> = std::result::Result<T, TimelineError>;

/// Failure reported by a clip callback.
///
/// The player logs it and keeps evaluating the remaining clips.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ClipError(pub String);

impl ClipError {
    /// Create a clip error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Failure reported by an event listener
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ListenerError(pub String);

impl ListenerError {
    /// Create a listener error from a message
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
