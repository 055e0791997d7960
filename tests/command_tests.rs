//! Command Tests
//!
//! Every edit command must restore the project exactly when its inverse is
//! applied, and must survive an undo/redo cycle through the history.

use pretty_assertions::assert_eq;

use frameline::interp::InterpolationMode;
use frameline::rig::{Rig, Vec2};
use frameline::state::{Command, History};
use frameline::timeline::{Frameset, Keyframe, Layer, Project};
use frameline::FramelineError;

/// Camera plus two figure layers; layer 1 has framesets [0, 20] and [40, 60]
/// with an interior keyframe at 10.
fn sample_project() -> Project {
    let mut project = Project::default();
    let rig = Rig::stick_figure(Vec2::new(200.0, 200.0));
    let rest = rig.rest_state();
    let raised = rest.clone().with_joint_location(3, Vec2::new(150.0, 120.0));

    let mut runner = Layer::figure("Runner", rig.clone()).with_depth(1);
    runner
        .insert_keyframe(0, Keyframe::new(10, raised))
        .unwrap();
    runner
        .insert_frameset(Frameset::spanning(40, 60, rest).unwrap())
        .unwrap();
    project.insert_layer(1, runner).unwrap();
    project
        .insert_layer(2, Layer::figure("Walker", rig).with_depth(2))
        .unwrap();
    project
}

fn assert_apply_then_inverse_restores(command: Command) {
    let mut project = sample_project();
    let before = project.clone();
    command.apply(&mut project).unwrap();
    assert_ne!(project, before, "{} did not change the project", command);
    command.inverse().apply(&mut project).unwrap();
    assert_eq!(project, before);
}

fn assert_undo_redo_round_trip(command: Command) {
    let mut project = sample_project();
    let before = project.clone();
    let mut history = History::new(10);

    history.execute(&mut project, command).unwrap();
    let after = project.clone();

    history.undo(&mut project).unwrap();
    assert_eq!(project, before);
    history.redo(&mut project).unwrap();
    assert_eq!(project, after);
    history.undo(&mut project).unwrap();
    assert_eq!(project, before);
}

fn all_commands(project: &Project) -> Vec<Command> {
    let rest = Rig::stick_figure(Vec2::new(0.0, 0.0)).rest_state();
    vec![
        Command::KeyframeAdd {
            layer: 1,
            frameset: 0,
            keyframe: Keyframe::new(15, rest.clone()),
        },
        Command::remove_keyframe(project, 1, 0, 10).unwrap(),
        Command::KeyframeMove {
            layer: 1,
            frameset: 0,
            from: 10,
            to: 12,
        },
        Command::KeyframeMove {
            layer: 1,
            frameset: 0,
            from: 20,
            to: 30,
        },
        Command::FramesetAdd {
            layer: 2,
            frameset: Frameset::spanning(30, 35, rest.clone()).unwrap(),
        },
        Command::remove_frameset(project, 1, 1).unwrap(),
        Command::FramesetMove {
            layer: 1,
            from_start: 40,
            to_start: 70,
        },
        Command::LayerAdd {
            index: 3,
            layer: Box::new(Layer::figure("Extra", Rig::stick_figure(Vec2::new(0.0, 0.0)))),
        },
        Command::remove_layer(project, 2).unwrap(),
        Command::LayerMove { from: 1, to: 2 },
        Command::LayerRename {
            index: 1,
            from: "Runner".to_string(),
            to: "Sprinter".to_string(),
        },
        Command::LayerVisibility {
            index: 2,
            from: true,
            to: false,
        },
        Command::update_pose(project, 1, 0, 10, rest).unwrap(),
        Command::change_interpolation(project, 1, 0, 20, InterpolationMode::EaseOut).unwrap(),
    ]
}

// === Inverse Tests ===

#[test]
fn test_every_command_inverse_restores_project() {
    let project = sample_project();
    for command in all_commands(&project) {
        assert_apply_then_inverse_restores(command);
    }
}

#[test]
fn test_every_command_survives_undo_redo() {
    let project = sample_project();
    for command in all_commands(&project) {
        assert_undo_redo_round_trip(command);
    }
}

#[test]
fn test_inverse_of_inverse_is_original() {
    let project = sample_project();
    for command in all_commands(&project) {
        assert_eq!(command.inverse().inverse(), command);
    }
}

// === Rejection Tests ===

#[test]
fn test_rejected_command_leaves_project_untouched() {
    let mut project = sample_project();
    let before = project.clone();
    let mut history = History::new(10);

    let rejected = [
        // boundary keyframe
        Command::remove_keyframe(&project, 1, 0, 0).unwrap(),
        // only frameset on the layer
        Command::remove_frameset(&project, 2, 0).unwrap(),
        // collides with the next frameset
        Command::FramesetMove {
            layer: 1,
            from_start: 0,
            to_start: 30,
        },
        // past the second keyframe
        Command::KeyframeMove {
            layer: 1,
            frameset: 0,
            from: 0,
            to: 10,
        },
        Command::LayerMove { from: 0, to: 1 },
        Command::LayerMove { from: 2, to: 0 },
    ];
    for command in rejected {
        let err = history.execute(&mut project, command).unwrap_err();
        assert!(err.is_rejection(), "{}", err);
        assert_eq!(project, before);
    }
    assert!(!history.can_undo());
}

#[test]
fn test_camera_layer_cannot_be_removed() {
    let mut project = sample_project();
    let command = Command::remove_layer(&project, 0).unwrap();
    let err = command.apply(&mut project).unwrap_err();
    assert!(matches!(err, FramelineError::BoundaryViolation { .. }));
}

// === History Tests ===

#[test]
fn test_new_command_clears_redo() {
    let mut project = sample_project();
    let mut history = History::new(10);
    history
        .execute(
            &mut project,
            Command::LayerVisibility {
                index: 1,
                from: true,
                to: false,
            },
        )
        .unwrap();
    history.undo(&mut project).unwrap();
    assert!(history.can_redo());

    history
        .execute(&mut project, Command::LayerMove { from: 1, to: 2 })
        .unwrap();
    assert!(!history.can_redo());
    assert!(matches!(
        history.redo(&mut project),
        Err(FramelineError::NothingToRedo)
    ));
}

#[test]
fn test_sequence_undoes_in_reverse_order() {
    let mut project = sample_project();
    let original = project.clone();
    let mut history = History::new(10);

    for command in [
        Command::KeyframeMove {
            layer: 1,
            frameset: 0,
            from: 10,
            to: 5,
        },
        Command::FramesetMove {
            layer: 1,
            from_start: 40,
            to_start: 25,
        },
        Command::LayerRename {
            index: 2,
            from: "Walker".to_string(),
            to: "Stroller".to_string(),
        },
    ] {
        history.execute(&mut project, command).unwrap();
    }
    assert_eq!(history.undo_count(), 3);

    while history.can_undo() {
        history.undo(&mut project).unwrap();
    }
    assert_eq!(project, original);
    assert_eq!(history.redo_count(), 3);
}
