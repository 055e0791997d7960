//! Timeline Engine Module
//!
//! Interactive state that sits beside the project:
//! - Selection and navigation over layers and frames
//! - Playback clock
//! - Pointer / key input and the pointer-to-cell mapping

pub mod input;
pub mod selection;
pub mod transport;

pub use input::{Button, Cell, Key, KeyPress, PointerEvent, PointerPhase};
pub use selection::{FrameKind, Selection};
pub use transport::{PlaybackClock, PlaybackState};
