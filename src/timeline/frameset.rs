//! Framesets: contiguous animated spans bounded by their first and last keyframe.

use serde::Serialize;

use crate::error::{FramelineError, Result};
use crate::interp::{self, InterpolationMode};
use crate::rig::State;
use crate::timeline::keyframe::Keyframe;

/// Minimum number of keyframes in a frameset.
pub const MIN_KEYFRAMES: usize = 2;

/// A time-ordered run of keyframes.
///
/// Invariants: at least two keyframes, strictly increasing times. The
/// span is always `[first.time, last.time]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frameset {
    keyframes: Vec<Keyframe>,
}

impl Frameset {
    /// Build a frameset, validating count and ordering.
    pub fn new(keyframes: Vec<Keyframe>) -> Result<Self> {
        let frameset = Self { keyframes };
        frameset.validate()?;
        Ok(frameset)
    }

    /// Two keyframes holding `state` at `start` and `end`.
    pub fn spanning(start: u32, end: u32, state: State) -> Result<Self> {
        Self::new(vec![
            Keyframe::new(start, state.clone()),
            Keyframe::new(end, state),
        ])
    }

    /// Two-keyframe frameset for spans known to be valid (`start < end`).
    pub(crate) fn pair(start: u32, end: u32, state: State) -> Self {
        debug_assert!(start < end);
        Self {
            keyframes: vec![Keyframe::new(start, state.clone()), Keyframe::new(end, state)],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.keyframes.len() < MIN_KEYFRAMES {
            return Err(FramelineError::invariant(format!(
                "a frameset needs at least {} keyframes, found {}",
                MIN_KEYFRAMES,
                self.keyframes.len()
            )));
        }
        for pair in self.keyframes.windows(2) {
            if pair[0].time >= pair[1].time {
                return Err(FramelineError::invariant(format!(
                    "keyframe times must increase strictly ({} then {})",
                    pair[0].time, pair[1].time
                )));
            }
        }
        Ok(())
    }

    pub fn start_time(&self) -> u32 {
        self.keyframes[0].time
    }

    pub fn end_time(&self) -> u32 {
        self.keyframes[self.keyframes.len() - 1].time
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn keyframe(&self, index: usize) -> Option<&Keyframe> {
        self.keyframes.get(index)
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always false; a frameset holds at least two keyframes.
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Closed-interval containment.
    pub fn contains(&self, time: u32) -> bool {
        self.start_time() <= time && time <= self.end_time()
    }

    fn contains_at(&self, t: f64) -> bool {
        f64::from(self.start_time()) <= t && t <= f64::from(self.end_time())
    }

    /// Closed-interval overlap with the span `[start, end]`.
    pub fn overlaps_span(&self, start: u32, end: u32) -> bool {
        self.start_time() <= end && start <= self.end_time()
    }

    pub fn overlaps(&self, other: &Frameset) -> bool {
        self.overlaps_span(other.start_time(), other.end_time())
    }

    pub fn is_boundary(&self, time: u32) -> bool {
        time == self.start_time() || time == self.end_time()
    }

    /// Index of the keyframe at exactly `time`.
    pub fn find_keyframe(&self, time: u32) -> Option<usize> {
        self.keyframes
            .binary_search_by_key(&time, |k| k.time)
            .ok()
    }

    /// Indices of the keyframes strictly bracketing `t`.
    pub fn bracket(&self, t: f64) -> Option<(usize, usize)> {
        self.keyframes.windows(2).enumerate().find_map(|(i, pair)| {
            if f64::from(pair[0].time) < t && t < f64::from(pair[1].time) {
                Some((i, i + 1))
            } else {
                None
            }
        })
    }

    /// Pose at time `t`, or `None` outside the span.
    ///
    /// On a keyframe the stored state is returned unmodified.
    pub fn state_at(&self, t: f64) -> Option<State> {
        if !self.contains_at(t) {
            return None;
        }
        if let Some(key) = self.keyframes.iter().find(|k| f64::from(k.time) == t) {
            return Some(key.state.clone());
        }
        let (p, n) = self.bracket(t)?;
        let (prev, next) = (&self.keyframes[p], &self.keyframes[n]);
        Some(interp::interpolate(
            prev.time,
            &prev.state,
            next.time,
            &next.state,
            next.mode,
            t,
        ))
    }

    /// Keyframe that would be inserted at `time`.
    ///
    /// With `use_current_pose` the state is the pose currently shown at
    /// `time`; without it the predecessor's pose is copied.
    pub fn interpolated_keyframe(&self, time: u32, use_current_pose: bool) -> Result<Keyframe> {
        let (p, n) = self.bracket(f64::from(time)).ok_or_else(|| {
            FramelineError::invariant(format!(
                "time {} is not strictly between two keyframes",
                time
            ))
        })?;
        let (prev, next) = (&self.keyframes[p], &self.keyframes[n]);
        let state = if use_current_pose {
            interp::interpolate(
                prev.time,
                &prev.state,
                next.time,
                &next.state,
                next.mode,
                f64::from(time),
            )
        } else {
            prev.state.clone()
        };
        Ok(Keyframe::new(time, state).with_mode(next.mode))
    }

    /// Insert a keyframe strictly between two existing ones.
    pub fn insert_keyframe(&mut self, keyframe: Keyframe) -> Result<usize> {
        let (_, n) = self.bracket(f64::from(keyframe.time)).ok_or_else(|| {
            FramelineError::invariant(format!(
                "time {} is not strictly between two keyframes",
                keyframe.time
            ))
        })?;
        self.keyframes.insert(n, keyframe);
        Ok(n)
    }

    /// Remove the interior keyframe at `time`.
    pub fn remove_keyframe(&mut self, time: u32) -> Result<(usize, Keyframe)> {
        let index = self.require_keyframe(time)?;
        if self.is_boundary(time) {
            return Err(FramelineError::boundary(format!(
                "keyframe {} bounds its frameset and cannot be removed",
                time
            )));
        }
        Ok((index, self.keyframes.remove(index)))
    }

    /// Check that the keyframe at `from` may move to `to` within this
    /// frameset, keeping its boundary role.
    pub fn check_move(&self, from: u32, to: u32) -> Result<usize> {
        let index = self.require_keyframe(from)?;
        if from == to {
            return Ok(index);
        }
        if let Some(other) = self.find_keyframe(to) {
            if other != index {
                return Err(FramelineError::invariant(format!(
                    "a keyframe already exists at {}",
                    to
                )));
            }
        }
        let last = self.keyframes.len() - 1;
        if index == 0 {
            if to >= self.keyframes[1].time {
                return Err(FramelineError::boundary(
                    "the first keyframe must stay before the second",
                ));
            }
        } else if index == last {
            if to <= self.keyframes[last - 1].time {
                return Err(FramelineError::boundary(
                    "the last keyframe must stay after the penultimate",
                ));
            }
        } else if to <= self.start_time() || to >= self.end_time() {
            return Err(FramelineError::boundary(format!(
                "interior keyframe cannot leave the span [{}, {}]",
                self.start_time(),
                self.end_time()
            )));
        }
        Ok(index)
    }

    /// Retime a keyframe after [`Frameset::check_move`] succeeded.
    pub(crate) fn retime_keyframe(&mut self, index: usize, to: u32) {
        self.keyframes[index].time = to;
        self.keyframes.sort_by_key(|k| k.time);
    }

    /// Shift every keyframe by `delta`. Caller guarantees the result is non-negative.
    pub(crate) fn shift(&mut self, delta: i64) {
        for keyframe in &mut self.keyframes {
            keyframe.time = (keyframe.time as i64 + delta) as u32;
        }
    }

    /// Replace the pose at `time`, returning the previous one.
    pub(crate) fn replace_state(&mut self, time: u32, state: State) -> Result<State> {
        let index = self.require_keyframe(time)?;
        Ok(std::mem::replace(&mut self.keyframes[index].state, state))
    }

    /// Replace the easing mode at `time`, returning the previous one.
    pub(crate) fn replace_mode(&mut self, time: u32, mode: InterpolationMode) -> Result<InterpolationMode> {
        let index = self.require_keyframe(time)?;
        Ok(std::mem::replace(&mut self.keyframes[index].mode, mode))
    }

    fn require_keyframe(&self, time: u32) -> Result<usize> {
        self.find_keyframe(time)
            .ok_or_else(|| FramelineError::not_found(format!("keyframe at time {}", time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{Rig, Vec2};

    fn pose(x: f32) -> State {
        Rig::stick_figure(Vec2::new(x, 0.0)).rest_state()
    }

    fn frameset(times: &[u32]) -> Frameset {
        Frameset::new(
            times
                .iter()
                .map(|&t| Keyframe::new(t, pose(t as f32)))
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_requires_two_keyframes() {
        let err = Frameset::new(vec![Keyframe::new(0, pose(0.0))]).unwrap_err();
        assert!(matches!(err, FramelineError::InvariantViolation { .. }));
    }

    #[test]
    fn test_new_rejects_duplicate_times() {
        let keyframes = vec![Keyframe::new(0, pose(0.0)), Keyframe::new(0, pose(1.0))];
        assert!(Frameset::new(keyframes).is_err());
    }

    #[test]
    fn test_span_tracks_boundaries() {
        let fs = frameset(&[4, 10, 30]);
        assert_eq!(fs.start_time(), 4);
        assert_eq!(fs.end_time(), 30);
        assert!(fs.contains(4) && fs.contains(30));
        assert!(!fs.contains(31));
    }

    #[test]
    fn test_insert_only_strictly_inside() {
        let mut fs = frameset(&[0, 20]);
        assert!(fs.insert_keyframe(Keyframe::new(0, pose(0.0))).is_err());
        assert!(fs.insert_keyframe(Keyframe::new(25, pose(0.0))).is_err());
        assert_eq!(fs.insert_keyframe(Keyframe::new(7, pose(0.0))).unwrap(), 1);
        assert_eq!(fs.len(), 3);
        assert!(fs.validate().is_ok());
    }

    #[test]
    fn test_remove_boundary_rejected() {
        let mut fs = frameset(&[0, 10, 20]);
        assert!(matches!(
            fs.remove_keyframe(0),
            Err(FramelineError::BoundaryViolation { .. })
        ));
        assert!(matches!(
            fs.remove_keyframe(20),
            Err(FramelineError::BoundaryViolation { .. })
        ));
        assert!(matches!(
            fs.remove_keyframe(5),
            Err(FramelineError::NotFound { .. })
        ));
        let (index, removed) = fs.remove_keyframe(10).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.time, 10);
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn test_check_move_rules() {
        let fs = frameset(&[0, 10, 20]);
        // duplicate
        assert!(fs.check_move(10, 20).is_err());
        // interior leaving the span
        assert!(fs.check_move(10, 0).is_err());
        assert!(fs.check_move(10, 25).is_err());
        // boundary losing its role
        assert!(fs.check_move(0, 12).is_err());
        assert!(fs.check_move(20, 9).is_err());
        // fine
        assert_eq!(fs.check_move(10, 15).unwrap(), 1);
        assert_eq!(fs.check_move(20, 40).unwrap(), 2);
    }

    #[test]
    fn test_retime_resorts() {
        let mut fs = frameset(&[0, 5, 10, 20]);
        let index = fs.check_move(5, 15).unwrap();
        fs.retime_keyframe(index, 15);
        let times: Vec<u32> = fs.keyframes().iter().map(|k| k.time).collect();
        assert_eq!(times, vec![0, 10, 15, 20]);
    }

    #[test]
    fn test_state_at_keyframe_is_exact() {
        let fs = frameset(&[0, 20]);
        assert_eq!(fs.state_at(20.0).unwrap(), fs.keyframes()[1].state);
        assert!(fs.state_at(21.0).is_none());
    }
}
