//! Editor configuration.
//!
//! Loaded from a JSON file; every field falls back to its default when absent.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{FramelineError, Result};

/// Default frame rate for new projects.
pub const DEFAULT_FRAME_RATE: f32 = 25.0;

/// Default playback speed multiplier for new projects.
pub const DEFAULT_PLAYBACK_SPEED: f32 = 1.0;

/// Default maximum number of undo levels to keep.
pub const DEFAULT_MAX_UNDO_LEVELS: usize = 100;

/// Default span of a frameset created by "insert frameset".
pub const DEFAULT_NEW_FRAMESET_SPAN: u32 = 20;

/// Pixel geometry of the timeline widget, used to map pointer
/// coordinates onto (layer, time) cells.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineLayout {
    /// Height of the frame-number header row.
    pub header_height: f32,
    /// Height of one layer row.
    pub layer_height: f32,
    /// Width of one frame cell.
    pub frame_width: f32,
    /// X offset where the frame area starts (label column width).
    pub splitter: f32,
}

impl Default for TimelineLayout {
    fn default() -> Self {
        Self {
            header_height: 16.0,
            layer_height: 16.0,
            frame_width: 9.0,
            splitter: 80.0,
        }
    }
}

/// Configuration for a new editor session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub frame_rate: f32,
    pub playback_speed: f32,
    /// Oldest history entries are discarded beyond this.
    pub max_undo_levels: usize,
    pub new_frameset_span: u32,
    pub layout: TimelineLayout,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            playback_speed: DEFAULT_PLAYBACK_SPEED,
            max_undo_levels: DEFAULT_MAX_UNDO_LEVELS,
            new_frameset_span: DEFAULT_NEW_FRAMESET_SPAN,
            layout: TimelineLayout::default(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| FramelineError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: EditorConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Reject values the timeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        if !(self.frame_rate > 0.0) {
            return Err(FramelineError::invariant("frame_rate must be positive"));
        }
        if self.new_frameset_span < 1 {
            return Err(FramelineError::invariant(
                "new_frameset_span must be at least 1",
            ));
        }
        if !(self.layout.frame_width > 0.0) || !(self.layout.layer_height > 0.0) {
            return Err(FramelineError::invariant(
                "timeline cells must have positive size",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.frame_rate, DEFAULT_FRAME_RATE);
        assert_eq!(config.max_undo_levels, DEFAULT_MAX_UNDO_LEVELS);
        assert_eq!(config.layout.frame_width, 9.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{ "frame_rate": 12.0, "layout": { "splitter": 120.0 } }"#)
                .unwrap();
        assert_eq!(config.frame_rate, 12.0);
        assert_eq!(config.playback_speed, DEFAULT_PLAYBACK_SPEED);
        assert_eq!(config.layout.splitter, 120.0);
        assert_eq!(config.layout.layer_height, 16.0);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("frameline.json");
        fs::write(&path, r#"{ "max_undo_levels": 7 }"#).unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert_eq!(config.max_undo_levels, 7);
    }

    #[test]
    fn test_load_rejects_zero_frame_rate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("frameline.json");
        fs::write(&path, r#"{ "frame_rate": 0.0 }"#).unwrap();

        assert!(EditorConfig::load(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let result = EditorConfig::load(Path::new("/nonexistent/frameline.json"));
        assert!(matches!(result, Err(FramelineError::FileRead { .. })));
    }
}
