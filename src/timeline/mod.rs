//! Temporal Data Model
//!
//! Project → Layer → Frameset → Keyframe, each level owning the next.
//! Framesets on a layer never overlap; keyframes inside a frameset are
//! strictly time-ordered and the first and last bound its span.

pub mod frameset;
pub mod keyframe;
pub mod layer;
pub mod project;

pub use frameset::Frameset;
pub use keyframe::Keyframe;
pub use layer::{Frame, Layer, LayerData, LayerKind, TimeClass};
pub use project::{Project, CAMERA_LAYER};
