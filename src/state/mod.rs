//! State Management Module
//!
//! Reversible edit commands, undo/redo history, and the versioned binary
//! project format.

pub mod codec;
pub mod command;
pub mod migration;
pub mod undo;

pub use codec::{decode, digest, encode, load_project, save_project};
pub use command::Command;
pub use migration::{FormatLayout, FORMAT_VERSION};
pub use undo::{History, HistoryEntry};
