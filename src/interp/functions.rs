//! Blend helpers:
//! - lerp_f32 / lerp_vec2 (component-wise linear)
//! - blend_states (figure joints and camera framing)

use crate::rig::{CameraState, FigureState, JointPose, State, Vec2};

/// Linear interpolation of scalars.
#[inline]
pub fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
pub fn lerp_vec2(a: Vec2, b: Vec2, t: f32) -> Vec2 {
    Vec2::new(lerp_f32(a.x, b.x, t), lerp_f32(a.y, b.y, t))
}

#[inline]
fn lerp_joint(a: &JointPose, b: &JointPose, t: f32) -> JointPose {
    JointPose {
        location: lerp_vec2(a.location, b.location, t),
        thickness: lerp_f32(a.thickness, b.thickness, t),
    }
}

/// Blend two states at an already-eased parameter `t`.
///
/// `t == 0` and `t == 1` return exact copies of the endpoints. States that
/// cannot be blended (different kinds or joint counts) hold `a`.
pub fn blend_states(a: &State, b: &State, t: f32) -> State {
    if t <= 0.0 {
        return a.clone();
    }
    if t >= 1.0 {
        return b.clone();
    }
    match (a, b) {
        (State::Figure(fa), State::Figure(fb)) if fa.joints.len() == fb.joints.len() => {
            State::Figure(FigureState {
                joints: fa
                    .joints
                    .iter()
                    .zip(&fb.joints)
                    .map(|(ja, jb)| lerp_joint(ja, jb, t))
                    .collect(),
            })
        }
        (State::Camera(ca), State::Camera(cb)) => State::Camera(CameraState {
            location: lerp_vec2(ca.location, cb.location, t),
            zoom: lerp_f32(ca.zoom, cb.zoom, t),
        }),
        _ => a.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::Rig;
    use approx::assert_relative_eq;

    #[test]
    fn test_lerp_scalar() {
        assert_eq!(lerp_f32(0.0, 10.0, 0.5), 5.0);
        assert_eq!(lerp_f32(-2.0, 2.0, 0.25), -1.0);
    }

    #[test]
    fn test_blend_figure_midpoint() {
        let a = Rig::stick_figure(Vec2::new(0.0, 0.0)).rest_state();
        let b = a.clone().translated(Vec2::new(10.0, -20.0));
        let mid = blend_states(&a, &b, 0.5);
        match (&a, &mid) {
            (State::Figure(fa), State::Figure(fm)) => {
                for (ja, jm) in fa.joints.iter().zip(&fm.joints) {
                    assert_relative_eq!(jm.location.x, ja.location.x + 5.0);
                    assert_relative_eq!(jm.location.y, ja.location.y - 10.0);
                }
            }
            _ => panic!("expected figure states"),
        }
    }

    #[test]
    fn test_blend_mismatched_holds_first() {
        let figure = Rig::stick_figure(Vec2::default()).rest_state();
        let camera = State::Camera(CameraState {
            location: Vec2::default(),
            zoom: 2.0,
        });
        assert_eq!(blend_states(&figure, &camera, 0.5), figure);
    }

    #[test]
    fn test_blend_camera_zoom() {
        let a = State::Camera(CameraState {
            location: Vec2::new(0.0, 0.0),
            zoom: 1.0,
        });
        let b = State::Camera(CameraState {
            location: Vec2::new(100.0, 50.0),
            zoom: 3.0,
        });
        match blend_states(&a, &b, 0.5) {
            State::Camera(c) => {
                assert_relative_eq!(c.zoom, 2.0);
                assert_relative_eq!(c.location.x, 50.0);
            }
            _ => panic!("expected camera state"),
        }
    }
}
