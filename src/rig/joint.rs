//! Joint arena for stick-figure rigs.

use std::ops::{Add, Sub};

use serde::Serialize;

use crate::error::{FramelineError, Result};
use crate::rig::state::{FigureState, JointPose, State};

/// Default stroke thickness of a joint segment.
pub const DEFAULT_THICKNESS: f32 = 6.0;

/// Default handle colour (RGBA).
pub const DEFAULT_HANDLE_COLOR: [u8; 4] = [0, 0, 255, 255];

const YELLOW: [u8; 4] = [255, 255, 0, 255];
const RED: [u8; 4] = [255, 0, 0, 255];

/// 2D point / offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// One joint of a rig.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Joint {
    /// Display name.
    pub name: String,

    /// Index of the parent joint, `None` for the root.
    pub parent: Option<usize>,

    /// Offset from the parent; absolute location for the root.
    pub offset: Vec2,

    /// Stroke thickness of the segment ending at this joint.
    pub thickness: f32,

    /// Colour of the manipulation handle (RGBA).
    pub handle_color: [u8; 4],

    /// Draw the segment as a circle (heads).
    pub is_circle: bool,
}

impl Joint {
    /// Create the root joint at an absolute location.
    pub fn root(name: impl Into<String>, location: Vec2) -> Self {
        Self {
            name: name.into(),
            parent: None,
            offset: location,
            thickness: DEFAULT_THICKNESS,
            handle_color: DEFAULT_HANDLE_COLOR,
            is_circle: false,
        }
    }

    /// Create a joint positioned relative to `parent`.
    pub fn relative_to(name: impl Into<String>, parent: usize, offset: Vec2) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            offset,
            thickness: DEFAULT_THICKNESS,
            handle_color: DEFAULT_HANDLE_COLOR,
            is_circle: false,
        }
    }

    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.handle_color = color;
        self
    }

    pub fn with_circle(mut self, is_circle: bool) -> Self {
        self.is_circle = is_circle;
        self
    }
}

/// A tree of joints stored as a flat arena.
///
/// Joint 0 is the only root and every parent index is smaller than its
/// child's index, which rules out cycles and forests by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Rig {
    joints: Vec<Joint>,
}

impl Rig {
    pub fn new() -> Self {
        Self { joints: Vec::new() }
    }

    /// Build a rig from a joint list, validating the arena shape.
    pub fn from_joints(joints: Vec<Joint>) -> Result<Self> {
        let rig = Self { joints };
        rig.validate()?;
        Ok(rig)
    }

    /// The standard eleven-joint stick figure with its hip at `origin`.
    pub fn stick_figure(origin: Vec2) -> Self {
        let joints = vec![
            Joint::root("hip", origin).with_color(YELLOW),
            Joint::relative_to("shoulder", 0, Vec2::new(0.0, -53.0)).with_color(YELLOW),
            Joint::relative_to("left elbow", 1, Vec2::new(-21.0, 22.0)),
            Joint::relative_to("left hand", 2, Vec2::new(-5.0, 35.0)),
            Joint::relative_to("right elbow", 1, Vec2::new(21.0, 22.0)).with_color(RED),
            Joint::relative_to("right hand", 4, Vec2::new(5.0, 35.0)).with_color(RED),
            Joint::relative_to("left knee", 0, Vec2::new(-16.0, 33.0)),
            Joint::relative_to("left foot", 6, Vec2::new(-5.0, 41.0)),
            Joint::relative_to("right knee", 0, Vec2::new(16.0, 33.0)).with_color(RED),
            Joint::relative_to("right foot", 8, Vec2::new(5.0, 41.0)).with_color(RED),
            Joint::relative_to("head", 1, Vec2::new(0.0, -36.0))
                .with_color(YELLOW)
                .with_circle(true),
        ];
        Self { joints }
    }

    /// Append a joint and return its index.
    pub fn add_joint(&mut self, joint: Joint) -> Result<usize> {
        let index = self.joints.len();
        check_parent(index, joint.parent)?;
        self.joints.push(joint);
        Ok(index)
    }

    /// Check the arena invariants.
    pub fn validate(&self) -> Result<()> {
        for (index, joint) in self.joints.iter().enumerate() {
            check_parent(index, joint.parent)?;
        }
        Ok(())
    }

    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    pub fn joint(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Indices of the direct children of `index`.
    pub fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.joints
            .iter()
            .enumerate()
            .filter(move |(_, j)| j.parent == Some(index))
            .map(|(i, _)| i)
    }

    /// Absolute joint locations of the rest pose.
    pub fn rest_locations(&self) -> Vec<Vec2> {
        let mut locations: Vec<Vec2> = Vec::with_capacity(self.joints.len());
        for joint in &self.joints {
            let location = match joint.parent {
                Some(parent) => locations[parent] + joint.offset,
                None => joint.offset,
            };
            locations.push(location);
        }
        locations
    }

    /// Snapshot of the rest pose.
    pub fn rest_state(&self) -> State {
        let joints = self
            .rest_locations()
            .into_iter()
            .zip(&self.joints)
            .map(|(location, joint)| JointPose {
                location,
                thickness: joint.thickness,
            })
            .collect();
        State::Figure(FigureState { joints })
    }

    /// Whether `state` can pose this rig.
    pub fn accepts(&self, state: &State) -> bool {
        matches!(state, State::Figure(figure) if figure.joints.len() == self.joints.len())
    }
}

fn check_parent(index: usize, parent: Option<usize>) -> Result<()> {
    match parent {
        None if index == 0 => Ok(()),
        None => Err(FramelineError::invariant(format!(
            "joint {} has no parent but joint 0 is already the root",
            index
        ))),
        Some(_) if index == 0 => Err(FramelineError::invariant(
            "joint 0 must be the root",
        )),
        Some(p) if p >= index => Err(FramelineError::invariant(format!(
            "joint {} refers to parent {} which does not precede it",
            index, p
        ))),
        Some(_) => Ok(()),
    }
}
