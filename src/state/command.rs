//! Reversible edit commands.
//!
//! Every mutation of a [`Project`] is expressed as a [`Command`] carrying
//! exactly the data needed to apply it and to build its inverse. Applying a
//! command either succeeds completely or leaves the project untouched.

use std::fmt;

use log::debug;

use crate::error::{FramelineError, Result};
use crate::interp::InterpolationMode;
use crate::rig::State;
use crate::timeline::{Frameset, Keyframe, Layer, Project};

/// A reversible edit.
///
/// Keyframes are addressed by `(layer, frameset index, time)`. Framesets in
/// add/remove/move commands are addressed by their start time, which stays
/// unique on a layer and survives re-sorting.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    KeyframeAdd {
        layer: usize,
        frameset: usize,
        keyframe: Keyframe,
    },
    KeyframeRemove {
        layer: usize,
        frameset: usize,
        keyframe: Keyframe,
    },
    KeyframeMove {
        layer: usize,
        frameset: usize,
        from: u32,
        to: u32,
    },
    FramesetAdd {
        layer: usize,
        frameset: Frameset,
    },
    FramesetRemove {
        layer: usize,
        frameset: Frameset,
    },
    FramesetMove {
        layer: usize,
        from_start: u32,
        to_start: u32,
    },
    LayerAdd {
        index: usize,
        layer: Box<Layer>,
    },
    LayerRemove {
        index: usize,
        layer: Box<Layer>,
    },
    LayerMove {
        from: usize,
        to: usize,
    },
    LayerRename {
        index: usize,
        from: String,
        to: String,
    },
    LayerVisibility {
        index: usize,
        from: bool,
        to: bool,
    },
    PoseUpdate {
        layer: usize,
        frameset: usize,
        time: u32,
        before: State,
        after: State,
    },
    InterpolationChange {
        layer: usize,
        frameset: usize,
        time: u32,
        before: InterpolationMode,
        after: InterpolationMode,
    },
}

impl Command {
    /// Remove the keyframe at `time`, capturing it for the inverse.
    pub fn remove_keyframe(project: &Project, layer: usize, frameset: usize, time: u32) -> Result<Self> {
        let fs = project.layer(layer)?.frameset(frameset)?;
        let index = fs.find_keyframe(time).ok_or_else(|| {
            FramelineError::not_found(format!("keyframe at time {}", time))
        })?;
        Ok(Command::KeyframeRemove {
            layer,
            frameset,
            keyframe: fs.keyframes()[index].clone(),
        })
    }

    /// Remove frameset `index`, capturing it for the inverse.
    pub fn remove_frameset(project: &Project, layer: usize, index: usize) -> Result<Self> {
        let frameset = project.layer(layer)?.frameset(index)?.clone();
        Ok(Command::FramesetRemove { layer, frameset })
    }

    /// Remove layer `index`, capturing it for the inverse.
    pub fn remove_layer(project: &Project, index: usize) -> Result<Self> {
        let layer = Box::new(project.layer(index)?.clone());
        Ok(Command::LayerRemove { index, layer })
    }

    /// Replace the pose of the keyframe at `time`.
    pub fn update_pose(
        project: &Project,
        layer: usize,
        frameset: usize,
        time: u32,
        after: State,
    ) -> Result<Self> {
        let before = keyframe_at(project, layer, frameset, time)?.state.clone();
        Ok(Command::PoseUpdate {
            layer,
            frameset,
            time,
            before,
            after,
        })
    }

    /// Change the easing of the keyframe at `time`.
    pub fn change_interpolation(
        project: &Project,
        layer: usize,
        frameset: usize,
        time: u32,
        after: InterpolationMode,
    ) -> Result<Self> {
        let before = keyframe_at(project, layer, frameset, time)?.mode;
        Ok(Command::InterpolationChange {
            layer,
            frameset,
            time,
            before,
            after,
        })
    }

    /// Apply the command to `project`.
    pub fn apply(&self, project: &mut Project) -> Result<()> {
        match self {
            Command::KeyframeAdd {
                layer,
                frameset,
                keyframe,
            } => {
                project
                    .layer_mut(*layer)?
                    .insert_keyframe(*frameset, keyframe.clone())?;
            }
            Command::KeyframeRemove {
                layer,
                frameset,
                keyframe,
            } => {
                project
                    .layer_mut(*layer)?
                    .remove_keyframe(*frameset, keyframe.time)?;
            }
            Command::KeyframeMove {
                layer,
                frameset,
                from,
                to,
            } => {
                project
                    .layer_mut(*layer)?
                    .move_keyframe(*frameset, *from, *to)?;
            }
            Command::FramesetAdd { layer, frameset } => {
                project.layer_mut(*layer)?.insert_frameset(frameset.clone())?;
            }
            Command::FramesetRemove { layer, frameset } => {
                let target = project.layer_mut(*layer)?;
                let index = frameset_starting_at(target, frameset.start_time())?;
                target.remove_frameset(index)?;
            }
            Command::FramesetMove {
                layer,
                from_start,
                to_start,
            } => {
                let target = project.layer_mut(*layer)?;
                let index = frameset_starting_at(target, *from_start)?;
                target.shift_frameset(index, *to_start as i64 - *from_start as i64)?;
            }
            Command::LayerAdd { index, layer } => {
                project.insert_layer(*index, layer.as_ref().clone())?;
            }
            Command::LayerRemove { index, .. } => {
                project.remove_layer(*index)?;
            }
            Command::LayerMove { from, to } => {
                project.move_layer(*from, *to)?;
            }
            Command::LayerRename { index, to, .. } => {
                project.rename_layer(*index, to.clone())?;
            }
            Command::LayerVisibility { index, to, .. } => {
                project.set_layer_visible(*index, *to)?;
            }
            Command::PoseUpdate {
                layer,
                frameset,
                time,
                after,
                ..
            } => {
                project
                    .layer_mut(*layer)?
                    .set_keyframe_state(*frameset, *time, after.clone())?;
            }
            Command::InterpolationChange {
                layer,
                frameset,
                time,
                after,
                ..
            } => {
                project
                    .layer_mut(*layer)?
                    .set_keyframe_mode(*frameset, *time, *after)?;
            }
        }
        debug!("[COMMAND] Applied: {}", self);
        Ok(())
    }

    /// The command that undoes this one.
    pub fn inverse(&self) -> Command {
        match self.clone() {
            Command::KeyframeAdd {
                layer,
                frameset,
                keyframe,
            } => Command::KeyframeRemove {
                layer,
                frameset,
                keyframe,
            },
            Command::KeyframeRemove {
                layer,
                frameset,
                keyframe,
            } => Command::KeyframeAdd {
                layer,
                frameset,
                keyframe,
            },
            Command::KeyframeMove {
                layer,
                frameset,
                from,
                to,
            } => Command::KeyframeMove {
                layer,
                frameset,
                from: to,
                to: from,
            },
            Command::FramesetAdd { layer, frameset } => Command::FramesetRemove { layer, frameset },
            Command::FramesetRemove { layer, frameset } => Command::FramesetAdd { layer, frameset },
            Command::FramesetMove {
                layer,
                from_start,
                to_start,
            } => Command::FramesetMove {
                layer,
                from_start: to_start,
                to_start: from_start,
            },
            Command::LayerAdd { index, layer } => Command::LayerRemove { index, layer },
            Command::LayerRemove { index, layer } => Command::LayerAdd { index, layer },
            Command::LayerMove { from, to } => Command::LayerMove { from: to, to: from },
            Command::LayerRename { index, from, to } => Command::LayerRename {
                index,
                from: to,
                to: from,
            },
            Command::LayerVisibility { index, from, to } => Command::LayerVisibility {
                index,
                from: to,
                to: from,
            },
            Command::PoseUpdate {
                layer,
                frameset,
                time,
                before,
                after,
            } => Command::PoseUpdate {
                layer,
                frameset,
                time,
                before: after,
                after: before,
            },
            Command::InterpolationChange {
                layer,
                frameset,
                time,
                before,
                after,
            } => Command::InterpolationChange {
                layer,
                frameset,
                time,
                before: after,
                after: before,
            },
        }
    }

    /// Short human-readable label for history views.
    pub fn description(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::KeyframeAdd { layer, keyframe, .. } => {
                write!(f, "Add keyframe at {} on layer {}", keyframe.time, layer)
            }
            Command::KeyframeRemove { layer, keyframe, .. } => {
                write!(f, "Remove keyframe at {} on layer {}", keyframe.time, layer)
            }
            Command::KeyframeMove { layer, from, to, .. } => {
                write!(f, "Move keyframe {} -> {} on layer {}", from, to, layer)
            }
            Command::FramesetAdd { layer, frameset } => write!(
                f,
                "Add frameset [{}, {}] on layer {}",
                frameset.start_time(),
                frameset.end_time(),
                layer
            ),
            Command::FramesetRemove { layer, frameset } => write!(
                f,
                "Remove frameset [{}, {}] on layer {}",
                frameset.start_time(),
                frameset.end_time(),
                layer
            ),
            Command::FramesetMove {
                layer,
                from_start,
                to_start,
            } => write!(
                f,
                "Move frameset {} -> {} on layer {}",
                from_start, to_start, layer
            ),
            Command::LayerAdd { index, layer } => {
                write!(f, "Add layer '{}' at {}", layer.name, index)
            }
            Command::LayerRemove { index, layer } => {
                write!(f, "Remove layer '{}' at {}", layer.name, index)
            }
            Command::LayerMove { from, to } => write!(f, "Move layer {} -> {}", from, to),
            Command::LayerRename { from, to, .. } => {
                write!(f, "Rename layer '{}' to '{}'", from, to)
            }
            Command::LayerVisibility { index, to, .. } => {
                let verb = if *to { "Show" } else { "Hide" };
                write!(f, "{} layer {}", verb, index)
            }
            Command::PoseUpdate { layer, time, .. } => {
                write!(f, "Update pose at {} on layer {}", time, layer)
            }
            Command::InterpolationChange {
                layer, time, after, ..
            } => write!(
                f,
                "Set interpolation at {} on layer {} to {}",
                time, layer, after
            ),
        }
    }
}

fn keyframe_at(project: &Project, layer: usize, frameset: usize, time: u32) -> Result<&Keyframe> {
    let fs = project.layer(layer)?.frameset(frameset)?;
    fs.find_keyframe(time)
        .and_then(|i| fs.keyframe(i))
        .ok_or_else(|| FramelineError::not_found(format!("keyframe at time {}", time)))
}

fn frameset_starting_at(layer: &Layer, start: u32) -> Result<usize> {
    layer.frameset_index_starting_at(start).ok_or_else(|| {
        FramelineError::not_found(format!("frameset starting at {}", start))
    })
}
