//! Error handling for Frameline
//!
//! Every rejected edit leaves the project untouched; the error says why.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Frameline operations
pub type Result<T> = std::result::Result<T, FramelineError>;

/// Main error type for Frameline operations
#[derive(Error, Debug)]
pub enum FramelineError {
    // Edit Rejections
    #[error("Invariant violation: {reason}")]
    InvariantViolation { reason: String },

    #[error("Boundary violation: {reason}")]
    BoundaryViolation { reason: String },

    #[error("Not found: {what}")]
    NotFound { what: String },

    // Format Errors
    #[error("Malformed project data: {reason}")]
    Format { reason: String },

    #[error("Unsupported project format version: {version}")]
    UnsupportedVersion { version: u16 },

    // History Errors
    #[error("Nothing to undo")]
    NothingToUndo,

    #[error("Nothing to redo")]
    NothingToRedo,

    // File Errors
    #[error("Failed to read file: {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Configuration / JSON Errors
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

impl FramelineError {
    pub(crate) fn invariant(reason: impl Into<String>) -> Self {
        FramelineError::InvariantViolation {
            reason: reason.into(),
        }
    }

    pub(crate) fn boundary(reason: impl Into<String>) -> Self {
        FramelineError::BoundaryViolation {
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        FramelineError::NotFound { what: what.into() }
    }

    pub(crate) fn format(reason: impl Into<String>) -> Self {
        FramelineError::Format {
            reason: reason.into(),
        }
    }

    /// Get the error code for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            FramelineError::InvariantViolation { .. } => "INVARIANT_VIOLATION",
            FramelineError::BoundaryViolation { .. } => "BOUNDARY_VIOLATION",
            FramelineError::NotFound { .. } => "NOT_FOUND",
            FramelineError::Format { .. } => "FORMAT_ERROR",
            FramelineError::UnsupportedVersion { .. } => "UNSUPPORTED_VERSION",
            FramelineError::NothingToUndo => "NOTHING_TO_UNDO",
            FramelineError::NothingToRedo => "NOTHING_TO_REDO",
            FramelineError::FileRead { .. } => "FILE_READ_ERROR",
            FramelineError::FileWrite { .. } => "FILE_WRITE_ERROR",
            FramelineError::Config(_) => "CONFIG_ERROR",
        }
    }

    /// True for edits that were refused before touching any state.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            FramelineError::InvariantViolation { .. }
                | FramelineError::BoundaryViolation { .. }
                | FramelineError::NotFound { .. }
        )
    }

    /// Returns true when the error came from decoding a project file.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            FramelineError::Format { .. } | FramelineError::UnsupportedVersion { .. }
        )
    }

    /// Returns a user-friendly recovery suggestion.
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            FramelineError::InvariantViolation { .. } => {
                Some("Pick a time that does not collide with another keyframe or frameset.")
            }
            FramelineError::BoundaryViolation { .. } => {
                Some("Boundary keyframes, a layer's last frameset and the camera layer are fixed.")
            }
            FramelineError::UnsupportedVersion { .. } => {
                Some("The file was written by a newer version; upgrade Frameline.")
            }
            FramelineError::Format { .. } => Some("The project file is damaged or not a project."),
            FramelineError::NothingToUndo => Some("There are no actions to undo."),
            FramelineError::NothingToRedo => Some("There are no undone actions to redo."),
            FramelineError::FileRead { .. } => Some("Check the file path and try again."),
            FramelineError::FileWrite { .. } => Some("Check permissions and free disk space."),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = FramelineError::invariant("duplicate keyframe time 10");
        assert_eq!(err.error_code(), "INVARIANT_VIOLATION");
        assert!(err.is_rejection());
        assert!(!err.is_format_error());
    }

    #[test]
    fn test_format_errors_are_not_rejections() {
        let err = FramelineError::UnsupportedVersion { version: 9 };
        assert!(err.is_format_error());
        assert!(!err.is_rejection());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_display_includes_reason() {
        let err = FramelineError::boundary("camera layer cannot be removed");
        assert_eq!(
            err.to_string(),
            "Boundary violation: camera layer cannot be removed"
        );
    }
}
