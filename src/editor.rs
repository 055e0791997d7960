//! Editor context.
//!
//! [`Editor`] is the single owner of the open project and everything the
//! timeline needs around it: undo history, selection, playback clock and
//! the in-progress pointer drag. Every user-level action goes through it,
//! and every project mutation goes through [`History`].

use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info};

use crate::config::EditorConfig;
use crate::engine::{Button, Key, KeyPress, PlaybackClock, PointerEvent, PointerPhase, Selection};
use crate::error::{FramelineError, Result};
use crate::interp::InterpolationMode;
use crate::rig::{Rig, State, Vec2};
use crate::state::{codec, Command, History};
use crate::timeline::{Frame, Layer, Project};

/// Where a new stick figure's hip is placed.
const NEW_FIGURE_ORIGIN: Vec2 = Vec2::new(200.0, 200.0);

/// Pointer drag in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    /// Moving the playhead with the pointer.
    Scrub,
    /// Retiming a keyframe; `start` is its time when the drag began.
    Keyframe {
        layer: usize,
        frameset: usize,
        start: u32,
        current: u32,
    },
    /// Shifting a frameset; `anchor` is the frame under the pointer at the
    /// last accepted step.
    Frameset {
        layer: usize,
        frameset: usize,
        original_start: u32,
        anchor: u32,
    },
}

/// The editing session.
#[derive(Debug)]
pub struct Editor {
    project: Project,
    history: History,
    selection: Selection,
    clock: PlaybackClock,
    drag: DragState,
    pointer_down: bool,
    config: EditorConfig,
    path: Option<PathBuf>,
    saved_digest: Option<String>,
}

impl Editor {
    /// New session with an empty project (camera layer only).
    pub fn new(config: EditorConfig) -> Self {
        let project = Project::new(config.frame_rate, config.playback_speed);
        Self::with_project(project, config)
    }

    /// Session over an existing project. It counts as unsaved.
    pub fn with_project(project: Project, config: EditorConfig) -> Self {
        Self {
            project,
            history: History::new(config.max_undo_levels),
            selection: Selection::Empty,
            clock: PlaybackClock::new(),
            drag: DragState::Idle,
            pointer_down: false,
            config,
            path: None,
            saved_digest: None,
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn drag(&self) -> DragState {
        self.drag
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_playing()
    }

    // ========================================================================
    // Files
    // ========================================================================

    /// Replace the session's project with the one stored at `path`.
    ///
    /// On failure the current project, history and selection are kept.
    pub fn open(&mut self, path: &Path) -> Result<()> {
        let project = codec::load_project(path)?;
        self.saved_digest = Some(codec::digest(&project));
        self.project = project;
        self.history.clear();
        self.selection = Selection::Empty;
        self.clock = PlaybackClock::new();
        self.drag = DragState::Idle;
        self.pointer_down = false;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    pub fn save(&mut self, path: &Path) -> Result<()> {
        codec::save_project(&self.project, path)?;
        self.saved_digest = Some(codec::digest(&self.project));
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    /// True when the project differs from what was last saved or opened.
    pub fn is_dirty(&self) -> bool {
        match &self.saved_digest {
            Some(saved) => *saved != codec::digest(&self.project),
            None => true,
        }
    }

    // ========================================================================
    // Time and rendering queries
    // ========================================================================

    /// Time shown at `now`: the selected frame if there is one, otherwise
    /// the playback clock.
    pub fn current_time(&self, now: Instant) -> f32 {
        match self.selection.time() {
            Some(time) => time as f32,
            None => self.clock.current_time(
                now,
                self.project.frame_rate,
                self.project.playback_speed,
            ),
        }
    }

    /// What each visible layer shows at `now`, back to front.
    pub fn frames_at(&self, now: Instant) -> Vec<(usize, Frame)> {
        self.project.resolve_all(self.current_time(now))
    }

    // ========================================================================
    // Seeking and playback
    // ========================================================================

    pub fn seek_start(&mut self, now: Instant) {
        self.clock.seek(0.0, now);
        self.selection = Selection::Empty;
    }

    pub fn seek_first_frame(&mut self, now: Instant) {
        self.clock.seek(self.project.first_time() as f32, now);
        self.selection = Selection::Empty;
    }

    pub fn seek_last_frame(&mut self, now: Instant) {
        let last = self
            .project
            .layers()
            .iter()
            .map(|l| l.last_time())
            .max()
            .unwrap_or(0);
        self.clock.seek(last as f32, now);
        self.selection = Selection::Empty;
    }

    pub fn seek_next_frame(&mut self) {
        self.step_selection(1);
        self.clock.step(1.0);
    }

    pub fn seek_prev_frame(&mut self) {
        self.step_selection(-1);
        self.clock.step(-1.0);
    }

    fn step_selection(&mut self, delta: i64) {
        if let Some(index) = self.selection.layer() {
            if let Ok(layer) = self.project.layer(index) {
                if let Some(next) = self.selection.stepped(layer, delta) {
                    self.selection = next;
                }
            }
        }
    }

    /// Select `time` on layer `layer`, as a click on that cell would.
    pub fn select(&mut self, layer: usize, time: u32) -> Result<()> {
        self.selection = Selection::at(layer, self.project.layer(layer)?, time);
        Ok(())
    }

    pub fn select_layer(&mut self, layer: usize) -> Result<()> {
        self.project.layer(layer)?;
        self.selection = Selection::Layer { layer };
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Empty;
    }

    /// Jump to the next keyframe of the selected frameset.
    pub fn next_keyframe(&mut self) {
        if let Some(next) = self.with_selected_layer(|sel, layer| sel.next_keyframe(layer)) {
            self.selection = next;
        }
    }

    /// Jump to the previous keyframe of the selected frameset.
    pub fn prev_keyframe(&mut self) {
        if let Some(prev) = self.with_selected_layer(|sel, layer| sel.prev_keyframe(layer)) {
            self.selection = prev;
        }
    }

    fn with_selected_layer<T>(&self, f: impl FnOnce(Selection, &Layer) -> Option<T>) -> Option<T> {
        let layer = self.project.layer(self.selection.layer()?).ok()?;
        f(self.selection, layer)
    }

    pub fn toggle_play(&mut self, now: Instant) {
        self.selection = Selection::Empty;
        self.clock
            .toggle(now, self.project.frame_rate, self.project.playback_speed);
    }

    // ========================================================================
    // Input
    // ========================================================================

    pub fn handle_pointer(&mut self, event: PointerEvent, now: Instant) {
        match event.phase {
            PointerPhase::Down => self.pointer_down(event.x, event.y, event.button, now),
            PointerPhase::Move => self.pointer_move(event.x, now),
            PointerPhase::Up => self.pointer_up(event.button),
        }
    }

    fn pointer_down(&mut self, x: f32, y: f32, button: Button, now: Instant) {
        self.pointer_down = true;
        if self.clock.is_playing() {
            return;
        }
        let layout = self.config.layout;
        if !layout.in_frame_area(x) {
            if let Some(index) = layout.layer_at(y) {
                if index < self.project.layer_count() {
                    self.selection = Selection::Layer { layer: index };
                }
            }
            return;
        }

        let cell = layout.cell_at(x, y);
        self.clock.seek(cell.time as f32, now);
        self.selection = Selection::Empty;

        let index = match cell.layer {
            Some(index) if index < self.project.layer_count() => index,
            Some(_) => return,
            None => {
                self.drag = DragState::Scrub;
                return;
            }
        };
        let layer = &self.project.layers()[index];
        self.selection = Selection::at(index, layer, cell.time);

        if button == Button::Right {
            return;
        }
        self.drag = match self.selection {
            Selection::Keyframe {
                layer,
                frameset,
                time,
            } => DragState::Keyframe {
                layer,
                frameset,
                start: time,
                current: time,
            },
            Selection::BlankTime {
                layer: l, frameset, ..
            } => DragState::Frameset {
                layer: l,
                frameset,
                original_start: layer.framesets()[frameset].start_time(),
                anchor: cell.time,
            },
            _ => DragState::Scrub,
        };
    }

    fn pointer_move(&mut self, x: f32, now: Instant) {
        if !self.pointer_down || !self.config.layout.in_frame_area(x) {
            return;
        }
        let target = self.config.layout.time_at(x);
        match self.drag {
            DragState::Keyframe {
                layer,
                frameset,
                start,
                current,
            } => {
                if target == current {
                    return;
                }
                let moved = self
                    .project
                    .layer_mut(layer)
                    .and_then(|l| l.move_keyframe(frameset, current, target));
                match moved {
                    Ok(()) => {
                        self.drag = DragState::Keyframe {
                            layer,
                            frameset,
                            start,
                            current: target,
                        };
                        self.selection = Selection::Keyframe {
                            layer,
                            frameset,
                            time: target,
                        };
                    }
                    Err(e) => debug!("[DRAG] Keyframe stays at {}: {}", current, e),
                }
            }
            DragState::Frameset {
                layer,
                frameset,
                original_start,
                anchor,
            } => {
                let delta = target as i64 - anchor as i64;
                if delta == 0 {
                    return;
                }
                let shifted = self
                    .project
                    .layer_mut(layer)
                    .and_then(|l| l.shift_frameset(frameset, delta));
                match shifted {
                    Ok(new_index) => {
                        self.drag = DragState::Frameset {
                            layer,
                            frameset: new_index,
                            original_start,
                            anchor: target,
                        };
                        if let Ok(l) = self.project.layer(layer) {
                            self.selection = Selection::at(layer, l, target);
                        }
                    }
                    Err(e) => debug!("[DRAG] Frameset not shifted by {}: {}", delta, e),
                }
            }
            DragState::Scrub | DragState::Idle => {
                self.clock.seek(target as f32, now);
            }
        }
    }

    fn pointer_up(&mut self, button: Button) {
        if button == Button::Left {
            match self.drag {
                DragState::Keyframe {
                    layer,
                    frameset,
                    start,
                    current,
                } if start != current => {
                    self.history.record(Command::KeyframeMove {
                        layer,
                        frameset,
                        from: start,
                        to: current,
                    });
                }
                DragState::Frameset {
                    layer,
                    frameset,
                    original_start,
                    ..
                } => {
                    let current = self
                        .project
                        .layer(layer)
                        .and_then(|l| l.frameset(frameset))
                        .map(|f| f.start_time());
                    if let Ok(current) = current {
                        if current != original_start {
                            self.history.record(Command::FramesetMove {
                                layer,
                                from_start: original_start,
                                to_start: current,
                            });
                        }
                    }
                }
                _ => {}
            }
        }
        self.pointer_down = false;
        self.drag = DragState::Idle;
    }

    /// Keyboard shortcuts.
    pub fn handle_key(&mut self, press: KeyPress, now: Instant) -> Result<()> {
        match (press.key, press.ctrl) {
            (Key::Char('z'), true) => self.undo().map(|_| ()),
            (Key::Char('y'), true) => self.redo().map(|_| ()),
            (Key::Char('q'), false) => {
                self.seek_start(now);
                Ok(())
            }
            (Key::Space, _) => {
                self.toggle_play(now);
                Ok(())
            }
            (Key::Left, _) => {
                self.seek_prev_frame();
                Ok(())
            }
            (Key::Right, _) => {
                self.seek_next_frame();
                Ok(())
            }
            (Key::Home, _) => {
                self.seek_first_frame(now);
                Ok(())
            }
            (Key::End, _) => {
                self.seek_last_frame(now);
                Ok(())
            }
            (Key::Delete, _) => self.remove_keyframe(),
            _ => Ok(()),
        }
    }

    // ========================================================================
    // Edits
    // ========================================================================

    /// Apply `command` through the history and keep the selection valid.
    pub fn execute(&mut self, command: Command) -> Result<()> {
        self.history.execute(&mut self.project, command)?;
        self.refresh_selection();
        Ok(())
    }

    pub fn undo(&mut self) -> Result<String> {
        let description = self.history.undo(&mut self.project)?;
        self.refresh_selection();
        Ok(description)
    }

    pub fn redo(&mut self) -> Result<String> {
        let description = self.history.redo(&mut self.project)?;
        self.refresh_selection();
        Ok(description)
    }

    fn refresh_selection(&mut self) {
        self.selection = match self.selection.layer() {
            Some(index) => match self.project.layer(index) {
                Ok(layer) => self.selection.refreshed(layer),
                Err(_) => Selection::Empty,
            },
            None => self.selection,
        };
    }

    /// Insert a keyframe at the selected blank frame.
    ///
    /// Without `use_current_pose` the new keyframe copies its predecessor's
    /// pose; with it, the pose currently shown at that time.
    pub fn insert_keyframe(&mut self, use_current_pose: bool) -> Result<()> {
        let (layer, frameset, time) = self.selected_blank()?;
        let keyframe = self
            .project
            .layer(layer)?
            .frameset(frameset)?
            .interpolated_keyframe(time, use_current_pose)?;
        self.execute(Command::KeyframeAdd {
            layer,
            frameset,
            keyframe,
        })
    }

    /// Remove the selected keyframe.
    pub fn remove_keyframe(&mut self) -> Result<()> {
        let (layer, frameset, time) = self.selected_keyframe()?;
        let command = Command::remove_keyframe(&self.project, layer, frameset, time)?;
        self.execute(command)
    }

    /// Copy the previous keyframe's pose onto the selected keyframe.
    pub fn set_pose_to_previous(&mut self) -> Result<()> {
        self.copy_neighbour_pose(-1)
    }

    /// Copy the next keyframe's pose onto the selected keyframe.
    pub fn set_pose_to_next(&mut self) -> Result<()> {
        self.copy_neighbour_pose(1)
    }

    fn copy_neighbour_pose(&mut self, offset: isize) -> Result<()> {
        let (layer, frameset, time) = self.selected_keyframe()?;
        let fs = self.project.layer(layer)?.frameset(frameset)?;
        let neighbour = fs
            .find_keyframe(time)
            .and_then(|i| i.checked_add_signed(offset))
            .and_then(|i| fs.keyframe(i))
            .ok_or_else(|| FramelineError::boundary("no neighbouring keyframe in this frameset"))?;
        let state = neighbour.state.clone();
        let command = Command::update_pose(&self.project, layer, frameset, time, state)?;
        self.execute(command)
    }

    /// Replace the selected keyframe's pose, e.g. after a canvas edit.
    pub fn update_selected_pose(&mut self, state: State) -> Result<()> {
        let (layer, frameset, time) = self.selected_keyframe()?;
        let command = Command::update_pose(&self.project, layer, frameset, time, state)?;
        self.execute(command)
    }

    /// Change the easing of the selected keyframe.
    pub fn change_interpolation(&mut self, mode: InterpolationMode) -> Result<()> {
        let (layer, frameset, time) = self.selected_keyframe()?;
        let command = Command::change_interpolation(&self.project, layer, frameset, time, mode)?;
        self.execute(command)
    }

    /// Whether a frameset can be inserted at the selected null frame.
    pub fn can_insert_frameset(&self) -> bool {
        match self.selection {
            Selection::NullTime { layer, time } => self
                .project
                .layer(layer)
                .map(|l| !l.is_camera() && l.can_insert_frameset_at(time))
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn insert_frameset(&mut self) -> Result<()> {
        let (layer, time) = match self.selection {
            Selection::NullTime { layer, time } if self.can_insert_frameset() => (layer, time),
            _ => {
                return Err(FramelineError::invariant(
                    "a frameset can only be inserted on an empty frame with room for it",
                ))
            }
        };
        let frameset = self
            .project
            .layer(layer)?
            .new_frameset_at(time, self.config.new_frameset_span)?;
        self.execute(Command::FramesetAdd { layer, frameset })
    }

    /// Remove the frameset under the selection.
    pub fn remove_frameset(&mut self) -> Result<()> {
        let (layer, frameset) = match (self.selection.layer(), self.selection.frameset()) {
            (Some(layer), Some(frameset)) => (layer, frameset),
            _ => return Err(FramelineError::not_found("selected frameset")),
        };
        let command = Command::remove_frameset(&self.project, layer, frameset)?;
        self.execute(command)
    }

    pub fn move_layer_up(&mut self) -> Result<()> {
        let index = self.selected_layer()?;
        if index == 0 {
            return Err(FramelineError::boundary("the camera layer cannot be reordered"));
        }
        self.move_selected_layer(index, index - 1)
    }

    pub fn move_layer_down(&mut self) -> Result<()> {
        let index = self.selected_layer()?;
        self.move_selected_layer(index, index + 1)
    }

    fn move_selected_layer(&mut self, from: usize, to: usize) -> Result<()> {
        self.history
            .execute(&mut self.project, Command::LayerMove { from, to })?;
        self.selection = Selection::Layer { layer: to };
        Ok(())
    }

    /// Append a layer on top of the stack and select it.
    pub fn add_layer(&mut self, layer: Layer) -> Result<usize> {
        let index = self.project.layer_count();
        self.history.execute(
            &mut self.project,
            Command::LayerAdd {
                index,
                layer: Box::new(layer),
            },
        )?;
        self.selection = Selection::Layer { layer: index };
        info!("Added layer {}", index);
        Ok(index)
    }

    /// Append a stick-figure layer named `name`.
    pub fn add_figure_layer(&mut self, name: impl Into<String>) -> Result<usize> {
        let depth = self.project.layer_count() as u32;
        self.add_layer(Layer::figure(name, Rig::stick_figure(NEW_FIGURE_ORIGIN)).with_depth(depth))
    }

    pub fn remove_layer(&mut self) -> Result<()> {
        let index = self.selected_layer()?;
        let command = Command::remove_layer(&self.project, index)?;
        self.history.execute(&mut self.project, command)?;
        self.selection = Selection::Empty;
        Ok(())
    }

    pub fn rename_layer(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let from = self.project.layer(index)?.name.clone();
        self.execute(Command::LayerRename {
            index,
            from,
            to: name.into(),
        })
    }

    pub fn toggle_visibility(&mut self, index: usize) -> Result<()> {
        let from = self.project.layer(index)?.visible;
        self.execute(Command::LayerVisibility {
            index,
            from,
            to: !from,
        })
    }

    fn selected_layer(&self) -> Result<usize> {
        self.selection
            .layer()
            .ok_or_else(|| FramelineError::not_found("selected layer"))
    }

    fn selected_keyframe(&self) -> Result<(usize, usize, u32)> {
        self.selection
            .keyframe()
            .ok_or_else(|| FramelineError::not_found("selected keyframe"))
    }

    fn selected_blank(&self) -> Result<(usize, usize, u32)> {
        match self.selection {
            Selection::BlankTime {
                layer,
                frameset,
                time,
            } => Ok((layer, frameset, time)),
            _ => Err(FramelineError::not_found("selected blank frame")),
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW1: f32 = 16.0 + 16.0 + 4.0;

    fn x_for(time: u32) -> f32 {
        81.0 + 9.0 * time as f32 + 4.0
    }

    fn editor() -> Editor {
        let mut editor = Editor::default();
        editor.add_figure_layer("figure").unwrap();
        editor
    }

    #[test]
    fn test_new_editor_is_dirty_until_saved() {
        let editor = Editor::default();
        assert!(editor.is_dirty());
        assert_eq!(editor.project().layer_count(), 1);
    }

    #[test]
    fn test_click_selects_cell() {
        let mut editor = editor();
        let now = Instant::now();
        editor.handle_pointer(PointerEvent::down(x_for(5), ROW1, Button::Left), now);
        assert_eq!(
            editor.selection(),
            Selection::BlankTime { layer: 1, frameset: 0, time: 5 }
        );
        assert_eq!(editor.current_time(now), 5.0);
        editor.handle_pointer(PointerEvent::up(x_for(5), ROW1, Button::Left), now);
        assert_eq!(editor.history().undo_count(), 1); // only the layer add
    }

    #[test]
    fn test_drag_keyframe_records_one_move() {
        let mut editor = editor();
        let now = Instant::now();
        editor.handle_pointer(PointerEvent::down(x_for(20), ROW1, Button::Left), now);
        for t in [21, 22, 25] {
            editor.handle_pointer(PointerEvent::moved(x_for(t), ROW1), now);
        }
        editor.handle_pointer(PointerEvent::up(x_for(25), ROW1, Button::Left), now);

        let layer = editor.project().layer(1).unwrap();
        assert_eq!(layer.frameset(0).unwrap().end_time(), 25);
        assert_eq!(editor.history().undo_count(), 2);

        editor.undo().unwrap();
        let layer = editor.project().layer(1).unwrap();
        assert_eq!(layer.frameset(0).unwrap().end_time(), 20);
    }

    #[test]
    fn test_drag_frameset_shifts_span() {
        let mut editor = editor();
        let now = Instant::now();
        editor.handle_pointer(PointerEvent::down(x_for(10), ROW1, Button::Left), now);
        editor.handle_pointer(PointerEvent::moved(x_for(14), ROW1), now);
        editor.handle_pointer(PointerEvent::up(x_for(14), ROW1, Button::Left), now);

        let fs = editor.project().layer(1).unwrap().frameset(0).unwrap().clone();
        assert_eq!((fs.start_time(), fs.end_time()), (4, 24));
        assert!(matches!(
            editor.history().peek_undo().map(|e| &e.command),
            Some(Command::FramesetMove { from_start: 0, to_start: 4, .. })
        ));
    }

    #[test]
    fn test_pointer_ignored_while_playing() {
        let mut editor = editor();
        let now = Instant::now();
        editor.toggle_play(now);
        editor.handle_pointer(PointerEvent::down(x_for(5), ROW1, Button::Left), now);
        assert!(editor.selection().is_empty());
    }

    #[test]
    fn test_move_camera_layer_rejected() {
        let mut editor = editor();
        editor.handle_pointer(PointerEvent::down(10.0, 20.0, Button::Left), Instant::now());
        assert_eq!(editor.selection(), Selection::Layer { layer: 0 });
        assert!(editor.move_layer_down().is_err());
        assert!(editor.move_layer_up().is_err());
        assert!(editor.project().layer(0).unwrap().is_camera());
    }

    #[test]
    fn test_insert_frameset_in_gap() {
        let mut editor = editor();
        let now = Instant::now();
        editor.handle_pointer(PointerEvent::down(x_for(30), ROW1, Button::Left), now);
        editor.handle_pointer(PointerEvent::up(x_for(30), ROW1, Button::Left), now);
        assert!(editor.can_insert_frameset());
        editor.insert_frameset().unwrap();
        let layer = editor.project().layer(1).unwrap();
        assert_eq!(layer.framesets().len(), 2);
        assert_eq!(layer.framesets()[1].start_time(), 30);
        assert_eq!(layer.framesets()[1].end_time(), 50);
    }

    #[test]
    fn test_key_shortcuts() {
        let mut editor = editor();
        let now = Instant::now();
        editor.rename_layer(1, "hero").unwrap();
        editor.handle_key(KeyPress::ctrl(Key::Char('z')), now).unwrap();
        assert_eq!(editor.project().layer(1).unwrap().name, "figure");
        editor.handle_key(KeyPress::ctrl(Key::Char('y')), now).unwrap();
        assert_eq!(editor.project().layer(1).unwrap().name, "hero");
        editor.handle_key(KeyPress::plain(Key::Space), now).unwrap();
        assert!(editor.is_playing());
    }
}
