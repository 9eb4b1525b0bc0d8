// SPDX-License-Identifier: MIT OR Apache-2.0
//! Player configuration and the persisted timeline document.
//!
//! Documents are stored as RON (`.ron`) or JSON (`.json`) and round-trip:
//! - play mode and time mode
//! - duration, speed, loop type, loop count and default direction
//! - the ordered clip list

use crate::clip::ClipSettings;
use crate::clock::PlayDirection;
use crate::error::{Result, TimelineError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current timeline document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// When playback starts on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlayMode {
    /// When the owner starts
    #[default]
    OnStart,
    /// Each time the owner is enabled
    OnEnable,
    /// Only through an explicit `play`
    Manual,
}

/// Which frame delta drives the clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TimeMode {
    /// Delta affected by the host's time scale
    #[default]
    Scaled,
    /// Real delta, ignoring time scale
    Unscaled,
}

/// Boundary policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LoopType {
    /// Restart from the default direction's start boundary
    #[default]
    Loop,
    /// Reverse direction at each boundary
    PingPong,
    /// Play a single pass
    Once,
}

/// Number of loop passes. Persisted as `-1` for infinite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "i32", into = "i32")]
pub enum LoopCount {
    /// Never terminate on count
    #[default]
    Infinite,
    /// Terminate after this many passes
    Times(u32),
}

impl LoopCount {
    /// Whether `completed` passes reach the configured count
    pub fn is_exhausted(&self, completed: u32) -> bool {
        match self {
            Self::Infinite => false,
            Self::Times(n) => completed >= *n,
        }
    }
}

impl TryFrom<i32> for LoopCount {
    type Error = TimelineError;

    fn try_from(value: i32) -> Result<Self> {
        match value {
            -1 => Ok(Self::Infinite),
            n if n >= 0 => Ok(Self::Times(n as u32)),
            n => Err(TimelineError::InvalidLoopCount(n)),
        }
    }
}

impl From<LoopCount> for i32 {
    fn from(value: LoopCount) -> Self {
        match value {
            LoopCount::Infinite => -1,
            LoopCount::Times(n) => i32::try_from(n).unwrap_or(i32::MAX),
        }
    }
}

/// Playback options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// When playback starts on its own
    pub play_mode: PlayMode,
    /// Which frame delta drives the clock
    pub time_mode: TimeMode,
    /// Boundary policy
    pub loop_type: LoopType,
    /// Number of passes
    pub loop_count: LoopCount,
    /// Direction of the first pass
    pub default_direction: PlayDirection,
    /// Speed multiplier (>= 0)
    pub speed: f32,
    /// Timeline duration in seconds (>= 0)
    pub duration: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            play_mode: PlayMode::OnStart,
            time_mode: TimeMode::Scaled,
            loop_type: LoopType::Loop,
            loop_count: LoopCount::Infinite,
            default_direction: PlayDirection::Forward,
            speed: 1.0,
            duration: 10.0,
        }
    }
}

impl PlayerConfig {
    /// Clamp numeric fields into their valid ranges
    pub fn sanitized(mut self) -> Self {
        self.speed = if self.speed.is_nan() { 0.0 } else { self.speed.max(0.0) };
        self.duration = if self.duration.is_nan() { 0.0 } else { self.duration.max(0.0) };
        self
    }
}

/// Persisted playback configuration with its clip list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineDocument {
    /// Format version
    pub version: u32,
    /// Timeline name
    pub name: String,
    /// Playback options
    #[serde(default)]
    pub config: PlayerConfig,
    /// Clips in collection order
    #[serde(default)]
    pub clips: Vec<ClipSettings>,
}

impl TimelineDocument {
    /// Create an empty document
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: DOCUMENT_FORMAT_VERSION,
            name: name.into(),
            config: PlayerConfig::default(),
            clips: Vec::new(),
        }
    }

    /// Serialize to pretty RON
    pub fn to_ron_string(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Parse from RON
    pub fn from_ron_str(source: &str) -> Result<Self> {
        let document: Self = ron::from_str(source)?;
        document.checked()
    }

    /// Serialize to pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse from JSON
    pub fn from_json_str(source: &str) -> Result<Self> {
        let document: Self = serde_json::from_str(source)?;
        document.checked()
    }

    /// Load from a `.ron` or `.json` file
    pub fn load(path: &Path) -> Result<Self> {
        let format = DocumentFormat::from_path(path)?;
        let source = std::fs::read_to_string(path)?;
        let document = match format {
            DocumentFormat::Ron => Self::from_ron_str(&source)?,
            DocumentFormat::Json => Self::from_json_str(&source)?,
        };
        tracing::info!(
            "Loaded timeline '{}' ({} clips) from {:?}",
            document.name,
            document.clips.len(),
            path
        );
        Ok(document)
    }

    /// Save to a `.ron` or `.json` file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = match DocumentFormat::from_path(path)? {
            DocumentFormat::Ron => self.to_ron_string()?,
            DocumentFormat::Json => self.to_json_string()?,
        };
        std::fs::write(path, contents)?;
        tracing::info!("Saved timeline '{}' to {:?}", self.name, path);
        Ok(())
    }

    fn checked(mut self) -> Result<Self> {
        if self.version > DOCUMENT_FORMAT_VERSION {
            return Err(TimelineError::UnsupportedVersion {
                found: self.version,
                supported: DOCUMENT_FORMAT_VERSION,
            });
        }
        self.config = self.config.sanitized();
        self.clips = self.clips.into_iter().map(ClipSettings::sanitized).collect();
        Ok(self)
    }
}

impl Default for TimelineDocument {
    fn default() -> Self {
        Self::new("Untitled Timeline")
    }
}

enum DocumentFormat {
    Ron,
    Json,
}

impl DocumentFormat {
    fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("ron") => Ok(Self::Ron),
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            _ => Err(TimelineError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clip::AllowedDirection;

    #[test]
    fn test_loop_count_conversion() {
        assert_eq!(LoopCount::try_from(-1).unwrap(), LoopCount::Infinite);
        assert_eq!(LoopCount::try_from(3).unwrap(), LoopCount::Times(3));
        assert!(LoopCount::try_from(-4).is_err());
        assert_eq!(i32::from(LoopCount::Infinite), -1);
        assert!(LoopCount::Times(2).is_exhausted(2));
        assert!(!LoopCount::Infinite.is_exhausted(u32::MAX));
    }

    #[test]
    fn test_serialization() {
        let mut document = TimelineDocument::new("Intro");
        document.config.play_mode = PlayMode::Manual;
        document.config.time_mode = TimeMode::Unscaled;
        document.config.loop_type = LoopType::PingPong;
        document.config.loop_count = LoopCount::Times(4);
        document.config.speed = 1.5;
        document.config.duration = 12.0;
        document.clips.push(ClipSettings::new("Fade", 1.0, 2.0).with_order(2));
        document.clips.push(
            ClipSettings::new("Shake", 0.5, 0.0)
                .with_play_chance(40.0)
                .with_allowed_direction(AllowedDirection::Backward),
        );

        let ron_str = document.to_ron_string().unwrap();
        assert!(ron_str.contains("loop_count: 4"));
        let loaded = TimelineDocument::from_ron_str(&ron_str).unwrap();
        assert_eq!(loaded, document);

        let json = document.to_json_string().unwrap();
        let loaded = TimelineDocument::from_json_str(&json).unwrap();
        assert_eq!(loaded, document);
    }

    #[test]
    fn test_infinite_loop_count_persists_as_minus_one() {
        let document = TimelineDocument::default();
        let json = document.to_json_string().unwrap();
        assert!(json.contains("\"loop_count\": -1"));
    }

    #[test]
    fn test_rejects_negative_loop_count() {
        let source = r#"(version: 1, name: "Bad", config: (loop_count: -3))"#;
        assert!(TimelineDocument::from_ron_str(source).is_err());
    }

    #[test]
    fn test_rejects_newer_version() {
        let source = r#"(version: 99, name: "Future")"#;
        assert!(matches!(
            TimelineDocument::from_ron_str(source),
            Err(TimelineError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_sanitizes_config() {
        let source = r#"(version: 1, name: "Clamp", config: (speed: -2.0, duration: -1.0))"#;
        let document = TimelineDocument::from_ron_str(source).unwrap();
        assert_eq!(document.config.speed, 0.0);
        assert_eq!(document.config.duration, 0.0);
    }

    #[test]
    fn test_sanitizes_clips() {
        let source = r#"(
            version: 1,
            name: "Clamp",
            clips: [(name: "Broken", start_time: -2.0, duration: -3.0, play_chance: 250.0)],
        )"#;
        let document = TimelineDocument::from_ron_str(source).unwrap();
        let clip = &document.clips[0];
        assert_eq!(clip.start_time(), 0.0);
        assert_eq!(clip.duration(), 0.0);
        assert_eq!(clip.end_time(), 0.0);
        assert_eq!(clip.play_chance(), 100.0);

        let json = r#"{"version": 1, "name": "Clamp", "clips": [{"name": "Broken", "play_chance": -10.0}]}"#;
        let document = TimelineDocument::from_json_str(json).unwrap();
        assert_eq!(document.clips[0].play_chance(), 0.0);
    }

    #[test]
    fn test_unknown_extension() {
        let err = TimelineDocument::load(Path::new("timeline.yaml")).unwrap_err();
        assert!(matches!(err, TimelineError::UnsupportedFormat(_)));
    }
}
