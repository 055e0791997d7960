//! Camera drawable.

use serde::Serialize;

use crate::rig::joint::Vec2;
use crate::rig::state::{CameraState, State};

/// Viewport the camera layer frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Camera {
    pub width: u32,
    pub height: u32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Camera centred on its viewport at 1x zoom.
    pub fn rest_state(&self) -> State {
        State::Camera(CameraState {
            location: Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0),
            zoom: 1.0,
        })
    }
}
