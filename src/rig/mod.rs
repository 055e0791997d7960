//! Rig / Pose Model
//!
//! Joint rigs are flat, index-addressed arenas. A [`State`] is a plain
//! value snapshot of every joint (or of the camera) at one instant, so
//! copying a pose never clones a graph and never aliases the live rig.

pub mod camera;
pub mod joint;
pub mod state;

pub use camera::Camera;
pub use joint::{Joint, Rig, Vec2};
pub use state::{CameraState, FigureState, JointPose, State};
