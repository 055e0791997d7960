//! Project root: frame rate, playback speed and the ordered layer stack.
//!
//! Layer 0 is always the camera. It cannot be removed, renamed or reordered.

use serde::Serialize;

use crate::config::{DEFAULT_FRAME_RATE, DEFAULT_PLAYBACK_SPEED};
use crate::error::{FramelineError, Result};
use crate::rig::Camera;
use crate::timeline::layer::{Frame, Layer};

/// Index of the reserved camera layer.
pub const CAMERA_LAYER: usize = 0;

/// Complete animation document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Project {
    /// Frames per second.
    pub frame_rate: f32,

    /// Playback speed multiplier.
    pub playback_speed: f32,

    layers: Vec<Layer>,
}

impl Default for Project {
    fn default() -> Self {
        Self::new(DEFAULT_FRAME_RATE, DEFAULT_PLAYBACK_SPEED)
    }
}

impl Project {
    /// New project holding only the camera layer.
    pub fn new(frame_rate: f32, playback_speed: f32) -> Self {
        Self {
            frame_rate,
            playback_speed,
            layers: vec![Layer::camera(Camera::default())],
        }
    }

    /// Assemble a project from decoded parts, validating every invariant.
    pub fn from_parts(frame_rate: f32, playback_speed: f32, layers: Vec<Layer>) -> Result<Self> {
        let project = Self {
            frame_rate,
            playback_speed,
            layers,
        };
        project.validate()?;
        Ok(project)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.frame_rate > 0.0) {
            return Err(FramelineError::invariant(format!(
                "frame rate must be positive, got {}",
                self.frame_rate
            )));
        }
        match self.layers.first() {
            Some(layer) if layer.is_camera() => {}
            _ => {
                return Err(FramelineError::invariant(
                    "layer 0 must be the camera layer",
                ))
            }
        }
        if self.layers.iter().skip(1).any(|l| l.is_camera()) {
            return Err(FramelineError::invariant(
                "only layer 0 may be a camera layer",
            ));
        }
        for layer in &self.layers {
            layer.validate()?;
        }
        Ok(())
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn layer(&self, index: usize) -> Result<&Layer> {
        self.layers
            .get(index)
            .ok_or_else(|| FramelineError::not_found(format!("layer {}", index)))
    }

    pub(crate) fn layer_mut(&mut self, index: usize) -> Result<&mut Layer> {
        self.layers
            .get_mut(index)
            .ok_or_else(|| FramelineError::not_found(format!("layer {}", index)))
    }

    /// Latest frameset end over all entity layers.
    pub fn last_time(&self) -> u32 {
        self.layers
            .iter()
            .filter(|l| !l.is_camera())
            .map(|l| l.last_time())
            .max()
            .unwrap_or(0)
    }

    /// Earliest frameset start over all layers.
    pub fn first_time(&self) -> u32 {
        self.layers
            .iter()
            .map(|l| l.first_time())
            .min()
            .unwrap_or(0)
    }

    // ========================================================================
    // Queries for renderers and exporters
    // ========================================================================

    pub fn resolve(&self, layer: usize, t: f32) -> Result<Frame> {
        Ok(self.layer(layer)?.resolve(t))
    }

    /// Frames of every visible layer at `t`, ordered back to front by depth.
    pub fn resolve_all(&self, t: f32) -> Vec<(usize, Frame)> {
        let mut order: Vec<usize> = (0..self.layers.len())
            .filter(|&i| self.layers[i].visible)
            .collect();
        order.sort_by_key(|&i| self.layers[i].depth);
        order
            .into_iter()
            .map(|i| (i, self.layers[i].resolve(t)))
            .collect()
    }

    /// One frame per integer time in `[from, to]`.
    pub fn frames(&self, layer: usize, from: u32, to: u32) -> Result<Vec<Frame>> {
        let layer = self.layer(layer)?;
        if from > to {
            return Err(FramelineError::invariant(format!(
                "empty range {}..={}",
                from, to
            )));
        }
        Ok((from..=to).map(|t| layer.resolve_frame(t)).collect())
    }

    // ========================================================================
    // Layer stack edits
    // ========================================================================

    /// Insert an entity layer at `index` (1..=len).
    pub fn insert_layer(&mut self, index: usize, layer: Layer) -> Result<()> {
        if index == CAMERA_LAYER {
            return Err(FramelineError::boundary(
                "layer 0 is reserved for the camera",
            ));
        }
        if index > self.layers.len() {
            return Err(FramelineError::not_found(format!("layer slot {}", index)));
        }
        if layer.is_camera() {
            return Err(FramelineError::boundary(
                "a project has exactly one camera layer",
            ));
        }
        layer.validate()?;
        self.layers.insert(index, layer);
        Ok(())
    }

    pub fn remove_layer(&mut self, index: usize) -> Result<Layer> {
        self.check_not_camera(index, "removed")?;
        self.layer(index)?;
        Ok(self.layers.remove(index))
    }

    /// Move the layer at `from` so that it ends up at `to`.
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<()> {
        self.check_not_camera(from, "reordered")?;
        self.check_not_camera(to, "reordered")?;
        self.layer(from)?;
        self.layer(to)?;
        let layer = self.layers.remove(from);
        self.layers.insert(to, layer);
        Ok(())
    }

    /// Rename a layer, returning the old name.
    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> Result<String> {
        self.check_not_camera(index, "renamed")?;
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.name, name.into()))
    }

    /// Set visibility, returning the previous flag.
    pub fn set_layer_visible(&mut self, index: usize, visible: bool) -> Result<bool> {
        let layer = self.layer_mut(index)?;
        Ok(std::mem::replace(&mut layer.visible, visible))
    }

    fn check_not_camera(&self, index: usize, action: &str) -> Result<()> {
        if index == CAMERA_LAYER {
            return Err(FramelineError::boundary(format!(
                "the camera layer cannot be {}",
                action
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{Rig, Vec2};

    fn project_with_figures(n: usize) -> Project {
        let mut project = Project::default();
        for i in 0..n {
            let layer = Layer::figure(format!("figure {}", i), Rig::stick_figure(Vec2::default()))
                .with_depth(i as u32 + 1);
            project.insert_layer(project.layer_count(), layer).unwrap();
        }
        project
    }

    #[test]
    fn test_new_project_has_camera() {
        let project = Project::default();
        assert_eq!(project.layer_count(), 1);
        assert!(project.layer(0).unwrap().is_camera());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_camera_layer_is_fixed() {
        let mut project = project_with_figures(2);
        assert!(matches!(
            project.remove_layer(0),
            Err(FramelineError::BoundaryViolation { .. })
        ));
        assert!(project.move_layer(0, 1).is_err());
        assert!(project.move_layer(1, 0).is_err());
        assert!(project.rename_layer(0, "cam").is_err());
        assert_eq!(project.layer(0).unwrap().name, "Camera");
    }

    #[test]
    fn test_move_layer() {
        let mut project = project_with_figures(3);
        project.move_layer(1, 3).unwrap();
        let names: Vec<&str> = project.layers().iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["Camera", "figure 1", "figure 2", "figure 0"]);
        project.move_layer(3, 1).unwrap();
        assert_eq!(project.layer(1).unwrap().name, "figure 0");
    }

    #[test]
    fn test_insert_second_camera_rejected() {
        let mut project = Project::default();
        let err = project
            .insert_layer(1, Layer::camera(Camera::default()))
            .unwrap_err();
        assert!(err.is_rejection());
    }

    #[test]
    fn test_last_time_ignores_camera() {
        let project = project_with_figures(1);
        assert_eq!(project.last_time(), 20);
        assert_eq!(project.frames(1, 0, 25).unwrap().len(), 26);
        assert!(project.frames(1, 25, 0).is_err());
    }

    #[test]
    fn test_resolve_all_orders_by_depth() {
        let mut project = project_with_figures(2);
        project.set_layer_visible(1, false).unwrap();
        let frames = project.resolve_all(0.0);
        let indices: Vec<usize> = frames.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 2]);
    }
}
