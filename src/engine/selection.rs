//! Timeline selection and navigation.
//!
//! A selection names a layer and, usually, a frame number on it. Timed
//! selections are classified against the layer's framesets so the editor
//! knows whether the cursor sits on nothing, inside a span or on a keyframe.

use std::fmt;

use crate::timeline::{Layer, TimeClass};

/// What the user currently has selected on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    Empty,
    /// A layer without a time (label column).
    Layer { layer: usize },
    /// A time outside every frameset of `layer`.
    NullTime { layer: usize, time: u32 },
    /// A time inside `frameset` that is not on a keyframe.
    BlankTime {
        layer: usize,
        frameset: usize,
        time: u32,
    },
    /// The keyframe at `time` in `frameset`.
    Keyframe {
        layer: usize,
        frameset: usize,
        time: u32,
    },
}

/// Kind of frame under a timed selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    Null,
    Blank,
    Key,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Null => write!(f, "null frame"),
            FrameKind::Blank => write!(f, "blank frame"),
            FrameKind::Key => write!(f, "keyframe"),
        }
    }
}

impl Selection {
    /// Classify `time` on `layer` (stored at `layer_index`).
    pub fn at(layer_index: usize, layer: &Layer, time: u32) -> Self {
        match layer.classify(time) {
            TimeClass::Null => Selection::NullTime {
                layer: layer_index,
                time,
            },
            TimeClass::Blank { frameset } => Selection::BlankTime {
                layer: layer_index,
                frameset,
                time,
            },
            TimeClass::Key { frameset, .. } => Selection::Keyframe {
                layer: layer_index,
                frameset,
                time,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::Empty)
    }

    pub fn layer(&self) -> Option<usize> {
        match *self {
            Selection::Empty => None,
            Selection::Layer { layer }
            | Selection::NullTime { layer, .. }
            | Selection::BlankTime { layer, .. }
            | Selection::Keyframe { layer, .. } => Some(layer),
        }
    }

    pub fn time(&self) -> Option<u32> {
        match *self {
            Selection::NullTime { time, .. }
            | Selection::BlankTime { time, .. }
            | Selection::Keyframe { time, .. } => Some(time),
            _ => None,
        }
    }

    pub fn frameset(&self) -> Option<usize> {
        match *self {
            Selection::BlankTime { frameset, .. } | Selection::Keyframe { frameset, .. } => {
                Some(frameset)
            }
            _ => None,
        }
    }

    /// `(layer, frameset, time)` of a selected keyframe.
    pub fn keyframe(&self) -> Option<(usize, usize, u32)> {
        match *self {
            Selection::Keyframe {
                layer,
                frameset,
                time,
            } => Some((layer, frameset, time)),
            _ => None,
        }
    }

    pub fn frame_kind(&self) -> Option<FrameKind> {
        match self {
            Selection::NullTime { .. } => Some(FrameKind::Null),
            Selection::BlankTime { .. } => Some(FrameKind::Blank),
            Selection::Keyframe { .. } => Some(FrameKind::Key),
            _ => None,
        }
    }

    /// Re-classify the same layer and time, e.g. after an edit moved things.
    pub fn refreshed(self, layer: &Layer) -> Self {
        match (self.layer(), self.time()) {
            (Some(index), Some(time)) => Selection::at(index, layer, time),
            _ => self,
        }
    }

    /// Step the selected time by `delta` frames and re-classify.
    ///
    /// Returns `None` when there is no timed selection or the step would
    /// go below frame 0.
    pub fn stepped(self, layer: &Layer, delta: i64) -> Option<Self> {
        let (index, time) = (self.layer()?, self.time()?);
        let target = time as i64 + delta;
        if target < 0 || target > u32::MAX as i64 {
            return None;
        }
        Some(Selection::at(index, layer, target as u32))
    }

    /// Keyframe after the selected time within the selected frameset only.
    pub fn next_keyframe(self, layer: &Layer) -> Option<Self> {
        let (index, frameset, time) = self.timed_in_frameset()?;
        let keyframes = layer.frameset(frameset).ok()?.keyframes();
        let next = keyframes.iter().find(|k| k.time > time)?;
        Some(Selection::Keyframe {
            layer: index,
            frameset,
            time: next.time,
        })
    }

    /// Keyframe before the selected time within the selected frameset only.
    pub fn prev_keyframe(self, layer: &Layer) -> Option<Self> {
        let (index, frameset, time) = self.timed_in_frameset()?;
        let keyframes = layer.frameset(frameset).ok()?.keyframes();
        let prev = keyframes.iter().rev().find(|k| k.time < time)?;
        Some(Selection::Keyframe {
            layer: index,
            frameset,
            time: prev.time,
        })
    }

    fn timed_in_frameset(&self) -> Option<(usize, usize, u32)> {
        match *self {
            Selection::BlankTime {
                layer,
                frameset,
                time,
            }
            | Selection::Keyframe {
                layer,
                frameset,
                time,
            } => Some((layer, frameset, time)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{Rig, Vec2};
    use crate::timeline::{Frameset, LayerData};

    fn layer() -> Layer {
        let rig = Rig::stick_figure(Vec2::default());
        let state = rig.rest_state();
        let mut first = Frameset::spanning(0, 10, state.clone()).unwrap();
        first
            .insert_keyframe(crate::timeline::Keyframe::new(5, state.clone()))
            .unwrap();
        let second = Frameset::spanning(12, 20, state).unwrap();
        Layer::new("figure", LayerData::Figure(rig), vec![first, second]).unwrap()
    }

    #[test]
    fn test_classification() {
        let layer = layer();
        assert_eq!(
            Selection::at(1, &layer, 5),
            Selection::Keyframe { layer: 1, frameset: 0, time: 5 }
        );
        assert_eq!(
            Selection::at(1, &layer, 7),
            Selection::BlankTime { layer: 1, frameset: 0, time: 7 }
        );
        assert_eq!(Selection::at(1, &layer, 11).frame_kind(), Some(FrameKind::Null));
    }

    #[test]
    fn test_step_crosses_frameset_boundary() {
        let layer = layer();
        let sel = Selection::at(1, &layer, 10);
        let next = sel.stepped(&layer, 1).unwrap();
        assert_eq!(next, Selection::NullTime { layer: 1, time: 11 });
        let next = next.stepped(&layer, 1).unwrap();
        assert_eq!(next.frameset(), Some(1));
        assert!(Selection::at(1, &layer, 0).stepped(&layer, -1).is_none());
    }

    #[test]
    fn test_keyframe_navigation_stays_in_frameset() {
        let layer = layer();
        let sel = Selection::at(1, &layer, 7);
        assert_eq!(sel.next_keyframe(&layer).and_then(|s| s.time()), Some(10));
        assert_eq!(sel.prev_keyframe(&layer).and_then(|s| s.time()), Some(5));

        let last = Selection::at(1, &layer, 10);
        assert!(last.next_keyframe(&layer).is_none());
        let first = Selection::at(1, &layer, 12);
        assert!(first.prev_keyframe(&layer).is_none());
    }

    #[test]
    fn test_null_time_has_no_keyframe_navigation() {
        let layer = layer();
        let sel = Selection::at(1, &layer, 11);
        assert!(sel.next_keyframe(&layer).is_none());
        assert!(Selection::Empty.stepped(&layer, 1).is_none());
    }
}
