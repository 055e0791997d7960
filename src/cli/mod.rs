//! CLI Module
//!
//! Command-line interface for inspecting and editing Frameline project files.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Frameline - keyframe timeline tools for stick-figure animation projects
#[derive(Parser, Debug)]
#[command(name = "frameline")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Editor configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a project with a camera and one stick figure
    #[command(name = "new")]
    New {
        /// Path for the new project file
        path: PathBuf,
    },

    /// Show a project summary
    #[command(name = "info")]
    Info {
        /// Path to the project file
        path: PathBuf,
    },

    /// Dump the project tree as JSON
    #[command(name = "print")]
    Print {
        /// Path to the project file
        path: PathBuf,
    },

    /// Resolve what one layer shows at a time
    #[command(name = "resolve")]
    Resolve {
        /// Path to the project file
        path: PathBuf,

        /// Layer index
        #[arg(short, long)]
        layer: usize,

        /// Query time (may be fractional)
        #[arg(short, long)]
        time: f32,
    },

    /// Resolve one frame per integer time in a range
    #[command(name = "frames")]
    Frames {
        /// Path to the project file
        path: PathBuf,

        /// Layer index
        #[arg(short, long)]
        layer: usize,

        /// First frame
        #[arg(long, default_value_t = 0)]
        from: u32,

        /// Last frame (defaults to the project's last frame)
        #[arg(long)]
        to: Option<u32>,
    },

    /// Rewrite a project file in the current format version
    #[command(name = "upgrade")]
    Upgrade {
        /// Path to the project file
        path: PathBuf,

        /// Output path (defaults to overwriting the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Insert a keyframe at a blank frame
    #[command(name = "insert-keyframe")]
    InsertKeyframe {
        /// Path to the project file
        path: PathBuf,

        /// Layer index
        #[arg(short, long)]
        layer: usize,

        /// Frame number
        #[arg(short, long)]
        time: u32,

        /// Use the interpolated pose instead of copying the previous keyframe
        #[arg(long)]
        current_pose: bool,
    },

    /// Remove an interior keyframe
    #[command(name = "remove-keyframe")]
    RemoveKeyframe {
        /// Path to the project file
        path: PathBuf,

        /// Layer index
        #[arg(short, long)]
        layer: usize,

        /// Frame number
        #[arg(short, long)]
        time: u32,
    },
}
