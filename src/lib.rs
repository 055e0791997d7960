//! Frameline - Keyframe Timeline Engine for 2D Stick-Figure Animation
//!
//! Frameline is the temporal core of a stick-figure animation editor:
//! it stores what each layer looks like over time, resolves poses at any
//! query time, tracks the timeline selection and playback clock, wraps
//! every edit in a reversible command, and reads and writes the versioned
//! binary project format.
//!
//! # Architecture
//!
//! - `rig`: joint arenas and pose snapshots (`State`)
//! - `timeline`: Project → Layer → Frameset → Keyframe
//! - `interp`: easing and pose blending between keyframes
//! - `engine`: selection, playback clock, pointer mapping
//! - `state`: commands, undo/redo history, binary codec
//! - `editor`: the context value that owns all of the above

pub mod cli;
pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod interp;
pub mod rig;
pub mod state;
pub mod timeline;

pub use config::EditorConfig;
pub use editor::{DragState, Editor};
pub use error::{FramelineError, Result};
pub use interp::InterpolationMode;
pub use rig::{Camera, Joint, Rig, State, Vec2};
pub use state::{Command, History};
pub use timeline::{Frame, Frameset, Keyframe, Layer, Project};
