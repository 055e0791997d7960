//! Keyframes: authoritative poses anchored at an integer time.

use serde::Serialize;

use crate::interp::InterpolationMode;
use crate::rig::State;

/// A pose snapshot at a specific frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Keyframe {
    /// Frame number.
    pub time: u32,

    /// Pose at this frame.
    pub state: State,

    /// Easing used on the segment that ends at this keyframe.
    pub mode: InterpolationMode,
}

impl Keyframe {
    pub fn new(time: u32, state: State) -> Self {
        Self {
            time,
            state,
            mode: InterpolationMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: InterpolationMode) -> Self {
        self.mode = mode;
        self
    }
}
