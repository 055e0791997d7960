//! Layers: one drawable plus its non-overlapping framesets.

use serde::Serialize;

use crate::error::{FramelineError, Result};
use crate::interp::InterpolationMode;
use crate::rig::{Camera, Rig, State};
use crate::timeline::frameset::Frameset;
use crate::timeline::keyframe::Keyframe;

/// Span of the frameset every new layer starts with.
pub const INITIAL_FRAMESET_END: u32 = 20;

/// Layer type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Entity,
    Camera,
}

impl LayerKind {
    pub fn tag(self) -> u8 {
        match self {
            LayerKind::Entity => 0,
            LayerKind::Camera => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            0 => Ok(LayerKind::Entity),
            1 => Ok(LayerKind::Camera),
            other => Err(FramelineError::format(format!("unknown layer type {}", other))),
        }
    }
}

/// The drawable a layer animates.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerData {
    Figure(Rig),
    Camera(Camera),
}

impl LayerData {
    pub fn kind(&self) -> LayerKind {
        match self {
            LayerData::Figure(_) => LayerKind::Entity,
            LayerData::Camera(_) => LayerKind::Camera,
        }
    }

    /// Pose used for freshly created framesets.
    pub fn default_state(&self) -> State {
        match self {
            LayerData::Figure(rig) => rig.rest_state(),
            LayerData::Camera(camera) => camera.rest_state(),
        }
    }

    /// Whether `state` can pose this drawable.
    pub fn accepts(&self, state: &State) -> bool {
        match self {
            LayerData::Figure(rig) => rig.accepts(state),
            LayerData::Camera(_) => matches!(state, State::Camera(_)),
        }
    }
}

/// Classification of a frame number on one layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeClass {
    /// Outside every frameset.
    Null,
    /// Inside a frameset, not on a keyframe.
    Blank { frameset: usize },
    /// On a keyframe.
    Key { frameset: usize, keyframe: usize },
}

/// What a layer shows at a queried time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "frame", rename_all = "snake_case")]
pub enum Frame {
    /// Nothing drawn.
    Null,
    /// Blended pose between two keyframes.
    Blank { frameset: usize, state: State },
    /// Exact stored pose of a keyframe.
    Key {
        frameset: usize,
        keyframe: usize,
        state: State,
    },
}

impl Frame {
    pub fn state(&self) -> Option<&State> {
        match self {
            Frame::Null => None,
            Frame::Blank { state, .. } | Frame::Key { state, .. } => Some(state),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Frame::Null)
    }
}

/// A named, ordered track of framesets animating one drawable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    pub depth: u32,
    data: LayerData,
    framesets: Vec<Frameset>,
}

impl Layer {
    /// Build a layer, validating its framesets against the drawable.
    pub fn new(
        name: impl Into<String>,
        data: LayerData,
        framesets: Vec<Frameset>,
    ) -> Result<Self> {
        let layer = Self {
            name: name.into(),
            visible: true,
            depth: 0,
            data,
            framesets,
        };
        layer.validate()?;
        Ok(layer)
    }

    /// Figure layer with one frameset `[0, 20]` at the rig's rest pose.
    pub fn figure(name: impl Into<String>, rig: Rig) -> Self {
        Self::with_initial_frameset(name, LayerData::Figure(rig))
    }

    /// Camera layer with one frameset `[0, 20]`.
    pub fn camera(camera: Camera) -> Self {
        Self::with_initial_frameset("Camera", LayerData::Camera(camera))
    }

    fn with_initial_frameset(name: impl Into<String>, data: LayerData) -> Self {
        let state = data.default_state();
        let framesets = vec![Frameset::pair(0, INITIAL_FRAMESET_END, state)];
        Self {
            name: name.into(),
            visible: true,
            depth: 0,
            data,
            framesets,
        }
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn kind(&self) -> LayerKind {
        self.data.kind()
    }

    pub fn is_camera(&self) -> bool {
        self.kind() == LayerKind::Camera
    }

    pub fn data(&self) -> &LayerData {
        &self.data
    }

    pub fn framesets(&self) -> &[Frameset] {
        &self.framesets
    }

    pub fn frameset(&self, index: usize) -> Result<&Frameset> {
        self.framesets
            .get(index)
            .ok_or_else(|| FramelineError::not_found(format!("frameset {}", index)))
    }

    fn frameset_mut(&mut self, index: usize) -> Result<&mut Frameset> {
        self.framesets
            .get_mut(index)
            .ok_or_else(|| FramelineError::not_found(format!("frameset {}", index)))
    }

    /// Check every layer invariant.
    pub fn validate(&self) -> Result<()> {
        if self.framesets.is_empty() {
            return Err(FramelineError::invariant(format!(
                "layer '{}' has no frameset",
                self.name
            )));
        }
        if let LayerData::Figure(rig) = &self.data {
            rig.validate()?;
        }
        for frameset in &self.framesets {
            frameset.validate()?;
            if let Some(k) = frameset
                .keyframes()
                .iter()
                .find(|k| !self.data.accepts(&k.state))
            {
                return Err(FramelineError::invariant(format!(
                    "keyframe {} of layer '{}' does not match its drawable",
                    k.time, self.name
                )));
            }
        }
        for pair in self.framesets.windows(2) {
            if pair[0].end_time() >= pair[1].start_time() {
                return Err(FramelineError::invariant(format!(
                    "framesets [{}, {}] and [{}, {}] overlap or are out of order",
                    pair[0].start_time(),
                    pair[0].end_time(),
                    pair[1].start_time(),
                    pair[1].end_time()
                )));
            }
        }
        Ok(())
    }

    /// End time of the last frameset.
    pub fn last_time(&self) -> u32 {
        self.framesets.last().map(|f| f.end_time()).unwrap_or(0)
    }

    /// First time covered by any frameset.
    pub fn first_time(&self) -> u32 {
        self.framesets.first().map(|f| f.start_time()).unwrap_or(0)
    }

    /// Index of the first frameset containing `time`.
    pub fn frameset_index_at(&self, time: u32) -> Option<usize> {
        self.framesets.iter().position(|f| f.contains(time))
    }

    /// Index of the frameset whose span starts at `start`.
    pub fn frameset_index_starting_at(&self, start: u32) -> Option<usize> {
        self.framesets.iter().position(|f| f.start_time() == start)
    }

    /// Classify a frame number by scanning framesets in order.
    pub fn classify(&self, time: u32) -> TimeClass {
        match self.frameset_index_at(time) {
            None => TimeClass::Null,
            Some(frameset) => match self.framesets[frameset].find_keyframe(time) {
                Some(keyframe) => TimeClass::Key { frameset, keyframe },
                None => TimeClass::Blank { frameset },
            },
        }
    }

    /// What this layer shows at time `t`.
    ///
    /// `f32` holds every integer frame only up to 2^24; use
    /// [`Layer::resolve_frame`] for exact lookups beyond that.
    pub fn resolve(&self, t: f32) -> Frame {
        self.resolve_at(f64::from(t))
    }

    /// What this layer shows at integer frame `time`.
    pub fn resolve_frame(&self, time: u32) -> Frame {
        self.resolve_at(f64::from(time))
    }

    fn resolve_at(&self, t: f64) -> Frame {
        for (index, frameset) in self.framesets.iter().enumerate() {
            if let Some(state) = frameset.state_at(t) {
                return match frameset
                    .keyframes()
                    .iter()
                    .position(|k| f64::from(k.time) == t)
                {
                    Some(keyframe) => Frame::Key {
                        frameset: index,
                        keyframe,
                        state,
                    },
                    None => Frame::Blank {
                        frameset: index,
                        state,
                    },
                };
            }
        }
        Frame::Null
    }

    // ========================================================================
    // Keyframe edits
    // ========================================================================

    pub fn insert_keyframe(&mut self, frameset: usize, keyframe: Keyframe) -> Result<usize> {
        if !self.data.accepts(&keyframe.state) {
            return Err(FramelineError::invariant(
                "keyframe state does not match the layer's drawable",
            ));
        }
        self.frameset_mut(frameset)?.insert_keyframe(keyframe)
    }

    pub fn remove_keyframe(&mut self, frameset: usize, time: u32) -> Result<(usize, Keyframe)> {
        self.frameset_mut(frameset)?.remove_keyframe(time)
    }

    /// Check a keyframe retime against its own frameset and both neighbours.
    pub fn check_move_keyframe(&self, frameset: usize, from: u32, to: u32) -> Result<usize> {
        let index = self.frameset(frameset)?.check_move(from, to)?;
        if frameset > 0 && to <= self.framesets[frameset - 1].end_time() {
            return Err(FramelineError::invariant(format!(
                "time {} collides with the preceding frameset",
                to
            )));
        }
        if let Some(next) = self.framesets.get(frameset + 1) {
            if to >= next.start_time() {
                return Err(FramelineError::invariant(format!(
                    "time {} collides with the following frameset",
                    to
                )));
            }
        }
        Ok(index)
    }

    pub fn move_keyframe(&mut self, frameset: usize, from: u32, to: u32) -> Result<()> {
        let index = self.check_move_keyframe(frameset, from, to)?;
        self.framesets[frameset].retime_keyframe(index, to);
        Ok(())
    }

    pub fn set_keyframe_state(&mut self, frameset: usize, time: u32, state: State) -> Result<State> {
        if !self.data.accepts(&state) {
            return Err(FramelineError::invariant(
                "state does not match the layer's drawable",
            ));
        }
        self.frameset_mut(frameset)?.replace_state(time, state)
    }

    pub fn set_keyframe_mode(
        &mut self,
        frameset: usize,
        time: u32,
        mode: InterpolationMode,
    ) -> Result<InterpolationMode> {
        self.frameset_mut(frameset)?.replace_mode(time, mode)
    }

    // ========================================================================
    // Frameset edits
    // ========================================================================

    /// Check that shifting frameset `index` by `delta` keeps the layer valid.
    pub fn check_shift_frameset(&self, index: usize, delta: i64) -> Result<()> {
        let frameset = self.frameset(index)?;
        let start = frameset.start_time() as i64 + delta;
        let end = frameset.end_time() as i64 + delta;
        if start < 0 {
            return Err(FramelineError::invariant(format!(
                "frameset would start at negative time {}",
                start
            )));
        }
        if end > u32::MAX as i64 {
            return Err(FramelineError::invariant("frameset would end past the last representable frame"));
        }
        let (start, end) = (start as u32, end as u32);
        let collides = self
            .framesets
            .iter()
            .enumerate()
            .any(|(i, other)| i != index && other.overlaps_span(start, end));
        if collides {
            return Err(FramelineError::invariant(format!(
                "span [{}, {}] overlaps another frameset",
                start, end
            )));
        }
        Ok(())
    }

    /// Shift a frameset in time; returns its index after re-sorting.
    pub fn shift_frameset(&mut self, index: usize, delta: i64) -> Result<usize> {
        self.check_shift_frameset(index, delta)?;
        let start = (self.framesets[index].start_time() as i64 + delta) as u32;
        self.framesets[index].shift(delta);
        self.framesets.sort_by_key(|f| f.end_time());
        Ok(self
            .frameset_index_starting_at(start)
            .unwrap_or(index))
    }

    /// True when `time` lies in a gap wide enough for a new two-keyframe frameset.
    pub fn can_insert_frameset_at(&self, time: u32) -> bool {
        if self.frameset_index_at(time).is_some() {
            return false;
        }
        match self.framesets.iter().find(|f| f.start_time() > time) {
            None => time < u32::MAX,
            Some(next) => next.start_time() >= time.saturating_add(2),
        }
    }

    /// Frameset that "insert frameset" would create at `time`.
    pub fn new_frameset_at(&self, time: u32, span: u32) -> Result<Frameset> {
        if !self.can_insert_frameset_at(time) {
            return Err(FramelineError::invariant(format!(
                "no room for a frameset at {}",
                time
            )));
        }
        let mut end = time.saturating_add(span.max(1));
        if let Some(next) = self.framesets.iter().find(|f| f.start_time() > time) {
            end = end.min(next.start_time() - 1);
        }
        Frameset::spanning(time, end, self.data.default_state())
    }

    /// Insert a frameset into a free gap; returns its index.
    pub fn insert_frameset(&mut self, frameset: Frameset) -> Result<usize> {
        frameset.validate()?;
        if self.framesets.iter().any(|f| f.overlaps(&frameset)) {
            return Err(FramelineError::invariant(format!(
                "span [{}, {}] overlaps another frameset",
                frameset.start_time(),
                frameset.end_time()
            )));
        }
        if let Some(k) = frameset
            .keyframes()
            .iter()
            .find(|k| !self.data.accepts(&k.state))
        {
            return Err(FramelineError::invariant(format!(
                "keyframe {} does not match the layer's drawable",
                k.time
            )));
        }
        let index = self
            .framesets
            .iter()
            .position(|f| f.start_time() > frameset.end_time())
            .unwrap_or(self.framesets.len());
        self.framesets.insert(index, frameset);
        Ok(index)
    }

    /// Remove a frameset; the last one is structural.
    pub fn remove_frameset(&mut self, index: usize) -> Result<Frameset> {
        self.frameset(index)?;
        if self.framesets.len() == 1 {
            return Err(FramelineError::boundary(format!(
                "layer '{}' must keep at least one frameset",
                self.name
            )));
        }
        Ok(self.framesets.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::Vec2;

    fn layer_with(spans: &[(u32, u32)]) -> Layer {
        let rig = Rig::stick_figure(Vec2::new(0.0, 0.0));
        let state = rig.rest_state();
        let framesets = spans
            .iter()
            .map(|&(s, e)| Frameset::spanning(s, e, state.clone()).unwrap())
            .collect();
        Layer::new("figure", LayerData::Figure(rig), framesets).unwrap()
    }

    #[test]
    fn test_new_rejects_overlap() {
        let rig = Rig::stick_figure(Vec2::default());
        let state = rig.rest_state();
        let framesets = vec![
            Frameset::spanning(0, 10, state.clone()).unwrap(),
            Frameset::spanning(10, 20, state).unwrap(),
        ];
        assert!(Layer::new("bad", LayerData::Figure(rig), framesets).is_err());
    }

    #[test]
    fn test_classify() {
        let layer = layer_with(&[(0, 10), (20, 30)]);
        assert_eq!(layer.classify(0), TimeClass::Key { frameset: 0, keyframe: 0 });
        assert_eq!(layer.classify(5), TimeClass::Blank { frameset: 0 });
        assert_eq!(layer.classify(15), TimeClass::Null);
        assert_eq!(layer.classify(30), TimeClass::Key { frameset: 1, keyframe: 1 });
    }

    #[test]
    fn test_resolve_outside_is_null() {
        let layer = layer_with(&[(5, 10)]);
        assert!(layer.resolve(2.0).is_null());
        assert!(matches!(layer.resolve(7.5), Frame::Blank { frameset: 0, .. }));
    }

    #[test]
    fn test_resolve_frame_exact_past_f32_precision() {
        let mut layer = layer_with(&[(16_777_216, 16_777_218)]);
        let pose = layer.framesets()[0].keyframes()[0].state.clone();
        assert_eq!(layer.insert_keyframe(0, Keyframe::new(16_777_217, pose)).unwrap(), 1);

        assert!(matches!(
            layer.resolve_frame(16_777_217),
            Frame::Key { frameset: 0, keyframe: 1, .. }
        ));
        assert!(matches!(
            layer.resolve_frame(16_777_218),
            Frame::Key { frameset: 0, keyframe: 2, .. }
        ));
        assert!(layer.resolve_frame(16_777_219).is_null());
    }

    #[test]
    fn test_move_keyframe_into_neighbour_rejected() {
        let mut layer = layer_with(&[(0, 10), (20, 30)]);
        assert!(layer.move_keyframe(0, 10, 20).is_err());
        assert!(layer.move_keyframe(1, 20, 10).is_err());
        assert!(layer.move_keyframe(0, 10, 19).is_ok());
        assert_eq!(layer.frameset(0).unwrap().end_time(), 19);
    }

    #[test]
    fn test_shift_frameset() {
        let mut layer = layer_with(&[(0, 10), (20, 30)]);
        assert!(layer.shift_frameset(1, -10).is_err()); // overlap at 10
        assert!(layer.shift_frameset(0, -1).is_err()); // negative
        assert_eq!(layer.shift_frameset(1, -9).unwrap(), 1);
        assert_eq!(layer.frameset(1).unwrap().start_time(), 11);
    }

    #[test]
    fn test_shift_frameset_past_sibling_resorts() {
        let mut layer = layer_with(&[(0, 10), (20, 30)]);
        let index = layer.shift_frameset(0, 40).unwrap();
        assert_eq!(index, 1);
        assert_eq!(layer.frameset(0).unwrap().start_time(), 20);
        assert_eq!(layer.frameset(1).unwrap().start_time(), 40);
        assert!(layer.validate().is_ok());
    }

    #[test]
    fn test_can_insert_frameset_needs_two_frames() {
        let layer = layer_with(&[(0, 10), (13, 20)]);
        assert!(!layer.can_insert_frameset_at(5));
        assert!(layer.can_insert_frameset_at(11));
        assert!(!layer.can_insert_frameset_at(12));
        assert!(layer.can_insert_frameset_at(50));
    }

    #[test]
    fn test_new_frameset_clamped_to_gap() {
        let layer = layer_with(&[(0, 10), (16, 20)]);
        let fs = layer.new_frameset_at(11, 20).unwrap();
        assert_eq!((fs.start_time(), fs.end_time()), (11, 15));
    }

    #[test]
    fn test_remove_last_frameset_rejected() {
        let mut layer = layer_with(&[(0, 10)]);
        assert!(matches!(
            layer.remove_frameset(0),
            Err(FramelineError::BoundaryViolation { .. })
        ));
        assert_eq!(layer.framesets().len(), 1);
    }

    #[test]
    fn test_camera_layer_rejects_figure_state() {
        let mut layer = Layer::camera(Camera::default());
        let figure = Rig::stick_figure(Vec2::default()).rest_state();
        assert!(layer
            .insert_keyframe(0, Keyframe::new(5, figure))
            .is_err());
    }
}
