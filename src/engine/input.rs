//! Discrete input events and the pointer-to-cell mapping.

use crate::config::TimelineLayout;

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Left,
    Right,
}

/// Pointer event phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer event in timeline widget coordinates (scroll already applied).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f32,
    pub y: f32,
    pub button: Button,
}

impl PointerEvent {
    pub fn down(x: f32, y: f32, button: Button) -> Self {
        Self {
            phase: PointerPhase::Down,
            x,
            y,
            button,
        }
    }

    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            phase: PointerPhase::Move,
            x,
            y,
            button: Button::Left,
        }
    }

    pub fn up(x: f32, y: f32, button: Button) -> Self {
        Self {
            phase: PointerPhase::Up,
            x,
            y,
            button,
        }
    }
}

/// Keys the timeline reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Space,
    Left,
    Right,
    Home,
    End,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub ctrl: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self { key, ctrl: false }
    }

    pub fn ctrl(key: Key) -> Self {
        Self { key, ctrl: true }
    }
}

/// A timeline cell under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Layer row, `None` when the pointer is over the header.
    pub layer: Option<usize>,
    pub time: u32,
}

impl TimelineLayout {
    /// Whether `x` lies in the frame area rather than the label column.
    pub fn in_frame_area(&self, x: f32) -> bool {
        x > self.splitter
    }

    /// Frame number under `x`, never negative.
    pub fn time_at(&self, x: f32) -> u32 {
        let frame = ((x - self.splitter - 1.0) / self.frame_width).floor();
        frame.max(0.0) as u32
    }

    /// Layer row under `y`, `None` over the header.
    pub fn layer_at(&self, y: f32) -> Option<usize> {
        let row = ((y - self.header_height) / self.layer_height).floor();
        if row < 0.0 {
            None
        } else {
            Some(row as usize)
        }
    }

    pub fn cell_at(&self, x: f32, y: f32) -> Cell {
        Cell {
            layer: self.layer_at(y),
            time: self.time_at(x),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(81.0, 0 ; "first pixel of frame area")]
    #[test_case(89.9, 0 ; "inside first cell")]
    #[test_case(90.0, 1 ; "second cell")]
    #[test_case(10.0, 0 ; "label column clamps to zero")]
    #[test_case(81.0 + 9.0 * 20.0, 20 ; "frame twenty")]
    fn test_time_at(x: f32, expected: u32) {
        assert_eq!(TimelineLayout::default().time_at(x), expected);
    }

    #[test]
    fn test_layer_rows() {
        let layout = TimelineLayout::default();
        assert_eq!(layout.layer_at(8.0), None);
        assert_eq!(layout.layer_at(16.0), Some(0));
        assert_eq!(layout.layer_at(40.0), Some(1));
        assert!(layout.in_frame_area(81.0));
        assert!(!layout.in_frame_area(80.0));
    }
}
