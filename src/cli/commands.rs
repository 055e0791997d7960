//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command.

use std::path::Path;

use log::{info, warn};

use crate::config::EditorConfig;
use crate::editor::Editor;
use crate::error::{FramelineError, Result};
use crate::state::{codec, migration};

/// Create a new project file holding a camera and one stick figure.
pub fn new_project(path: &Path, config: &EditorConfig) -> Result<()> {
    info!("Creating new project at: {}", path.display());

    let mut editor = Editor::new(config.clone());
    editor.add_figure_layer("Figure 1")?;
    editor.save(path)?;

    println!("Project created: {}", path.display());
    Ok(())
}

/// Print a project summary.
pub fn show_info(path: &Path) -> Result<()> {
    let bytes = read_bytes(path)?;
    let version = codec::peek_version(&bytes)?;
    let project = codec::decode(&bytes)?;

    println!("Project: {}", path.display());
    println!("Format version: {}", version);
    println!("Frame rate: {} fps", project.frame_rate);
    println!("Playback speed: {}x", project.playback_speed);
    println!("Last frame: {}", project.last_time());
    println!("SHA-256: {}", codec::digest(&project));
    println!("{:-<60}", "");
    for (index, layer) in project.layers().iter().enumerate() {
        let keyframes: usize = layer.framesets().iter().map(|f| f.len()).sum();
        println!(
            "{:>3} {:<20} {:<7} depth {:<3} {} framesets, {} keyframes{}",
            index,
            layer.name,
            format!("{:?}", layer.kind()),
            layer.depth,
            layer.framesets().len(),
            keyframes,
            if layer.visible { "" } else { " (hidden)" }
        );
    }
    Ok(())
}

/// Dump the project tree as pretty JSON.
pub fn print_project(path: &Path) -> Result<()> {
    let project = codec::load_project(path)?;
    println!("{}", serde_json::to_string_pretty(&project)?);
    Ok(())
}

/// Print the frame one layer shows at `time`.
pub fn resolve(path: &Path, layer: usize, time: f32) -> Result<()> {
    let project = codec::load_project(path)?;
    let frame = project.resolve(layer, time)?;
    println!("{}", serde_json::to_string_pretty(&frame)?);
    Ok(())
}

/// Print one frame per integer time in `[from, to]`.
pub fn frames(path: &Path, layer: usize, from: u32, to: Option<u32>) -> Result<()> {
    let project = codec::load_project(path)?;
    let to = to.unwrap_or_else(|| project.last_time());
    let frames = project.frames(layer, from, to)?;
    println!("{}", serde_json::to_string_pretty(&frames)?);
    Ok(())
}

/// Re-encode a project in the current format version.
pub fn upgrade(path: &Path, output: Option<&Path>) -> Result<()> {
    let bytes = read_bytes(path)?;
    let version = codec::peek_version(&bytes)?;
    let project = codec::decode(&bytes)?;
    if version == migration::FORMAT_VERSION && output.is_none() {
        println!("Already at format version {}", version);
        return Ok(());
    }
    let target = output.unwrap_or(path);
    codec::save_project(&project, target)?;
    println!(
        "Upgraded {} from version {} to {}",
        target.display(),
        version,
        migration::FORMAT_VERSION
    );
    Ok(())
}

/// Insert a keyframe at a blank frame and save.
pub fn insert_keyframe(
    path: &Path,
    layer: usize,
    time: u32,
    current_pose: bool,
    config: &EditorConfig,
) -> Result<()> {
    let mut editor = Editor::new(config.clone());
    editor.open(path)?;
    editor.select(layer, time)?;
    if let Err(e) = editor.insert_keyframe(current_pose) {
        warn!("Cannot insert keyframe at {} on layer {}: {}", time, layer, e);
        return Err(e);
    }
    editor.save(path)?;
    println!("Inserted keyframe at {} on layer {}", time, layer);
    Ok(())
}

/// Remove an interior keyframe and save.
pub fn remove_keyframe(path: &Path, layer: usize, time: u32, config: &EditorConfig) -> Result<()> {
    let mut editor = Editor::new(config.clone());
    editor.open(path)?;
    editor.select(layer, time)?;
    if let Err(e) = editor.remove_keyframe() {
        warn!("Cannot remove keyframe at {} on layer {}: {}", time, layer, e);
        return Err(e);
    }
    editor.save(path)?;
    println!("Removed keyframe at {} on layer {}", time, layer);
    Ok(())
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| FramelineError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })
}
