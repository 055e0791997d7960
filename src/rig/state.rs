//! Pose snapshots.

use serde::Serialize;

use crate::rig::joint::Vec2;

/// Pose of one joint at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointPose {
    /// Absolute location.
    pub location: Vec2,
    pub thickness: f32,
}

/// Pose of every joint of a figure, indexed like the rig's arena.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FigureState {
    pub joints: Vec<JointPose>,
}

/// Camera framing at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraState {
    pub location: Vec2,
    pub zoom: f32,
}

/// Independent value snapshot of a drawable at one instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum State {
    Figure(FigureState),
    Camera(CameraState),
}

impl State {
    /// Number of joints posed (1 for a camera).
    pub fn joint_count(&self) -> usize {
        match self {
            State::Figure(figure) => figure.joints.len(),
            State::Camera(_) => 1,
        }
    }

    /// Whether two states can be blended component by component.
    pub fn is_compatible(&self, other: &State) -> bool {
        match (self, other) {
            (State::Figure(a), State::Figure(b)) => a.joints.len() == b.joints.len(),
            (State::Camera(_), State::Camera(_)) => true,
            _ => false,
        }
    }

    /// Move a single joint to `location`, leaving every other joint as is.
    pub fn with_joint_location(mut self, index: usize, location: Vec2) -> Self {
        match &mut self {
            State::Figure(figure) => {
                if let Some(joint) = figure.joints.get_mut(index) {
                    joint.location = location;
                }
            }
            State::Camera(camera) => camera.location = location,
        }
        self
    }

    /// Translate every joint by `delta`.
    pub fn translated(mut self, delta: Vec2) -> Self {
        match &mut self {
            State::Figure(figure) => {
                for joint in &mut figure.joints {
                    joint.location = joint.location + delta;
                }
            }
            State::Camera(camera) => camera.location = camera.location + delta,
        }
        self
    }
}
