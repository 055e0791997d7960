//! Format version support for project files.
//!
//! Every file starts with a 2-byte version tag. Encoding always writes
//! [`FORMAT_VERSION`]; decoding looks up the [`FormatLayout`] of the tag it
//! finds and fills in defaults for fields older layouts lack.

use log::debug;

use crate::error::{FramelineError, Result};

/// Current project file format version.
pub const FORMAT_VERSION: u16 = 2;

/// All versions this build can read, oldest first.
pub const READABLE_VERSIONS: &[u16] = &[1, 2];

/// Which optional fields a format version carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatLayout {
    pub version: u16,
    /// Project playback speed after the frame rate.
    pub playback_speed: bool,
    /// Layer depth after the visibility flag.
    pub layer_depth: bool,
    /// Interpolation tag after each keyframe state.
    pub interpolation: bool,
}

impl FormatLayout {
    /// Layout written by this build.
    pub fn current() -> Self {
        Self::all_fields(FORMAT_VERSION)
    }

    fn all_fields(version: u16) -> Self {
        Self {
            version,
            playback_speed: true,
            layer_depth: true,
            interpolation: true,
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == FORMAT_VERSION
    }
}

/// Look up the layout of a version tag.
///
/// # Errors
/// Returns `FramelineError::UnsupportedVersion` for tags this build does not know,
/// including versions newer than [`FORMAT_VERSION`].
pub fn layout_for(version: u16) -> Result<FormatLayout> {
    let layout = match version {
        1 => FormatLayout {
            version,
            playback_speed: false,
            layer_depth: false,
            interpolation: false,
        },
        2 => FormatLayout::all_fields(version),
        _ => return Err(FramelineError::UnsupportedVersion { version }),
    };
    if !layout.is_current() {
        debug!(
            "[FORMAT] Reading legacy version {} (current is {})",
            version, FORMAT_VERSION
        );
    }
    Ok(layout)
}

/// Check whether a version tag is readable.
pub fn is_readable(version: u16) -> bool {
    READABLE_VERSIONS.contains(&version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_current_layout_has_every_field() {
        let layout = layout_for(FORMAT_VERSION).unwrap();
        assert_eq!(layout, FormatLayout::current());
        assert!(layout.playback_speed && layout.layer_depth && layout.interpolation);
    }

    #[test]
    fn test_legacy_layout() {
        let layout = layout_for(1).unwrap();
        assert!(!layout.is_current());
        assert!(!layout.playback_speed);
        assert!(!layout.interpolation);
    }

    #[test_case(0 ; "zero")]
    #[test_case(3 ; "newer than current")]
    #[test_case(u16::MAX ; "garbage")]
    fn test_unknown_versions_rejected(version: u16) {
        assert!(!is_readable(version));
        assert!(matches!(
            layout_for(version),
            Err(FramelineError::UnsupportedVersion { version: v }) if v == version
        ));
    }

    #[test]
    fn test_readable_versions_resolve() {
        for &version in READABLE_VERSIONS {
            assert!(layout_for(version).is_ok());
        }
    }
}
