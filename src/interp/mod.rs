//! Interpolation Engine
//!
//! Blends two keyframe poses at a normalized parameter `u` in `[0, 1]`.
//! The easing curve is chosen by the *next* keyframe's mode; the eased
//! parameter then drives a per-component linear blend.

pub mod functions;

use serde::Serialize;

use crate::error::{FramelineError, Result};
use crate::rig::State;

pub use functions::{blend_states, lerp_f32, lerp_vec2};

/// Easing applied between two keyframes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMode {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Hold the previous pose until the next keyframe.
    Step,
}

impl InterpolationMode {
    pub const ALL: [InterpolationMode; 5] = [
        InterpolationMode::Linear,
        InterpolationMode::EaseIn,
        InterpolationMode::EaseOut,
        InterpolationMode::EaseInOut,
        InterpolationMode::Step,
    ];

    /// Tag byte used by the project file format.
    pub fn tag(self) -> u8 {
        match self {
            InterpolationMode::Linear => 0,
            InterpolationMode::EaseIn => 1,
            InterpolationMode::EaseOut => 2,
            InterpolationMode::EaseInOut => 3,
            InterpolationMode::Step => 4,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|mode| mode.tag() == tag)
            .ok_or_else(|| FramelineError::format(format!("unknown interpolation mode {}", tag)))
    }

    /// Map a linear parameter onto this mode's curve.
    pub fn ease(self, u: f32) -> f32 {
        let u = u.clamp(0.0, 1.0);
        match self {
            InterpolationMode::Linear => u,
            InterpolationMode::EaseIn => u * u,
            InterpolationMode::EaseOut => 1.0 - (1.0 - u) * (1.0 - u),
            InterpolationMode::EaseInOut => u * u * (3.0 - 2.0 * u),
            InterpolationMode::Step => {
                if u >= 1.0 {
                    1.0
                } else {
                    0.0
                }
            }
        }
    }
}

impl std::fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterpolationMode::Linear => write!(f, "Linear"),
            InterpolationMode::EaseIn => write!(f, "Ease In"),
            InterpolationMode::EaseOut => write!(f, "Ease Out"),
            InterpolationMode::EaseInOut => write!(f, "Ease In/Out"),
            InterpolationMode::Step => write!(f, "Step"),
        }
    }
}

/// Normalized position of `t` between two keyframe times, clamped to `[0, 1]`.
///
/// Computed in `f64` so every `u32` frame number is represented exactly.
pub fn normalized(prev_time: u32, next_time: u32, t: f64) -> f32 {
    if next_time <= prev_time {
        return 0.0;
    }
    let span = f64::from(next_time - prev_time);
    ((t - f64::from(prev_time)) / span).clamp(0.0, 1.0) as f32
}

/// Pose between `prev` and `next` at time `t`, eased by `mode`.
pub fn interpolate(
    prev_time: u32,
    prev: &State,
    next_time: u32,
    next: &State,
    mode: InterpolationMode,
    t: f64,
) -> State {
    let u = normalized(prev_time, next_time, t);
    blend_states(prev, next, mode.ease(u))
}
