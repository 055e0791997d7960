//! Undo/Redo System
//!
//! Command-based undo/redo. Each entry stores the command that was applied;
//! undoing applies its inverse, redoing re-applies it. Two stacks, with the
//! redo stack cleared whenever a new command is recorded.

use chrono::{DateTime, Utc};
use log::{debug, warn};
use uuid::Uuid;

use crate::config::DEFAULT_MAX_UNDO_LEVELS;
use crate::error::{FramelineError, Result};
use crate::state::command::Command;
use crate::timeline::Project;

/// A single undoable command with bookkeeping.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    /// Unique identifier for this entry.
    pub id: Uuid,

    /// Human-readable description of the edit.
    pub description: String,

    /// When the edit was performed.
    pub timestamp: DateTime<Utc>,

    /// The command as originally applied.
    pub command: Command,
}

impl HistoryEntry {
    /// Create a new entry with a generated UUID.
    pub fn new(command: Command) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: command.description(),
            timestamp: Utc::now(),
            command,
        }
    }
}

/// Manages undo/redo for one project.
///
/// The history maintains:
/// - An undo stack of recent entries (limited by max_undo_levels)
/// - A redo stack of undone entries
/// - The number of entries discarded by trimming
#[derive(Debug, Clone)]
pub struct History {
    /// Entries that can be undone, oldest first.
    undo_stack: Vec<HistoryEntry>,

    /// Entries that can be redone, most recently undone last.
    redo_stack: Vec<HistoryEntry>,

    /// Maximum number of undo levels to keep.
    max_undo_levels: usize,

    /// Entries dropped from the bottom of the undo stack.
    discarded: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_UNDO_LEVELS)
    }
}

impl History {
    /// Create a history keeping at most `max_levels` undo entries.
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_undo_levels: max_levels,
            discarded: 0,
        }
    }

    /// Apply `command` to `project` and record it.
    ///
    /// A rejected command is not recorded and leaves both the project and
    /// the redo stack untouched.
    pub fn execute(&mut self, project: &mut Project, command: Command) -> Result<()> {
        if let Err(e) = command.apply(project) {
            warn!("[HISTORY] Rejected '{}': {}", command, e);
            return Err(e);
        }
        self.record(command);
        Ok(())
    }

    /// Record a command whose effect is already present in the project,
    /// e.g. a drag that mutated the project live.
    pub fn record(&mut self, command: Command) {
        self.redo_stack.clear();
        self.undo_stack.push(HistoryEntry::new(command));
        self.trim_history();
    }

    /// Undo the most recent entry. Returns its description.
    pub fn undo(&mut self, project: &mut Project) -> Result<String> {
        let entry = self.undo_stack.pop().ok_or(FramelineError::NothingToUndo)?;
        if let Err(e) = entry.command.inverse().apply(project) {
            self.undo_stack.push(entry);
            return Err(e);
        }
        debug!("[HISTORY] Undid '{}'", entry.description);
        let description = entry.description.clone();
        self.redo_stack.push(entry);
        Ok(description)
    }

    /// Redo the most recently undone entry. Returns its description.
    pub fn redo(&mut self, project: &mut Project) -> Result<String> {
        let entry = self.redo_stack.pop().ok_or(FramelineError::NothingToRedo)?;
        if let Err(e) = entry.command.apply(project) {
            self.redo_stack.push(entry);
            return Err(e);
        }
        debug!("[HISTORY] Redid '{}'", entry.description);
        let description = entry.description.clone();
        self.undo_stack.push(entry);
        Ok(description)
    }

    /// Get the number of entries that can be undone.
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of entries that can be redone.
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn peek_undo(&self) -> Option<&HistoryEntry> {
        self.undo_stack.last()
    }

    pub fn peek_redo(&self) -> Option<&HistoryEntry> {
        self.redo_stack.last()
    }

    /// Drop the oldest entries beyond max_undo_levels.
    fn trim_history(&mut self) {
        if self.undo_stack.len() > self.max_undo_levels {
            let excess = self.undo_stack.len() - self.max_undo_levels;
            self.undo_stack.drain(..excess);
            self.discarded += excess;
        }
    }

    pub fn max_undo_levels(&self) -> usize {
        self.max_undo_levels
    }

    /// Number of entries discarded by trimming so far.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Clear all undo/redo history (new or freshly opened project).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// `(id, description)` of undoable entries, most recent first.
    pub fn undo_summary(&self) -> Vec<(Uuid, String)> {
        self.undo_stack
            .iter()
            .rev()
            .map(|e| (e.id, e.description.clone()))
            .collect()
    }

    /// `(id, description)` of redoable entries, most recently undone first.
    pub fn redo_summary(&self) -> Vec<(Uuid, String)> {
        self.redo_stack
            .iter()
            .rev()
            .map(|e| (e.id, e.description.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rig::{Rig, Vec2};
    use crate::timeline::Layer;
    use pretty_assertions::assert_eq;

    fn project() -> Project {
        let mut project = Project::default();
        project
            .insert_layer(1, Layer::figure("figure", Rig::stick_figure(Vec2::default())))
            .unwrap();
        project
    }

    fn rename(to: &str, from: &str) -> Command {
        Command::LayerRename {
            index: 1,
            from: from.into(),
            to: to.into(),
        }
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = History::default();
        assert!(!history.can_undo());
        assert!(!history.can_redo());
        assert_eq!(history.max_undo_levels(), DEFAULT_MAX_UNDO_LEVELS);
    }

    #[test]
    fn test_undo_redo_cycle() {
        let mut project = project();
        let mut history = History::default();
        let original = project.clone();

        history.execute(&mut project, rename("a", "figure")).unwrap();
        let after = project.clone();

        assert_eq!(history.undo(&mut project).unwrap(), "Rename layer 'figure' to 'a'");
        assert_eq!(project, original);
        history.redo(&mut project).unwrap();
        assert_eq!(project, after);
    }

    #[test]
    fn test_new_command_clears_redo() {
        let mut project = project();
        let mut history = History::default();
        history.execute(&mut project, rename("a", "figure")).unwrap();
        history.undo(&mut project).unwrap();
        assert!(history.can_redo());

        history.execute(&mut project, rename("b", "figure")).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.undo_count(), 1);
    }

    #[test]
    fn test_rejected_command_not_recorded() {
        let mut project = project();
        let mut history = History::default();
        let err = history
            .execute(&mut project, Command::LayerMove { from: 0, to: 1 })
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(history.undo_count(), 0);
    }

    #[test]
    fn test_empty_stacks_error() {
        let mut project = project();
        let mut history = History::default();
        assert!(matches!(
            history.undo(&mut project),
            Err(FramelineError::NothingToUndo)
        ));
        assert!(matches!(
            history.redo(&mut project),
            Err(FramelineError::NothingToRedo)
        ));
    }

    #[test]
    fn test_trim_history() {
        let mut project = project();
        let mut history = History::new(3);
        let names = ["figure", "a", "b", "c", "d", "e"];
        for pair in names.windows(2) {
            history
                .execute(&mut project, rename(pair[1], pair[0]))
                .unwrap();
        }
        assert_eq!(history.undo_count(), 3);
        assert_eq!(history.discarded(), 2);
        let summary = history.undo_summary();
        assert_eq!(summary[0].1, "Rename layer 'd' to 'e'");
    }

    #[test]
    fn test_summaries_and_peek_after_undo() {
        let mut project = project();
        let mut history = History::default();
        for (to, from) in [("a", "figure"), ("b", "a"), ("c", "b")] {
            history.execute(&mut project, rename(to, from)).unwrap();
        }
        let ids: Vec<Uuid> = history.undo_summary().into_iter().map(|(id, _)| id).collect();

        history.undo(&mut project).unwrap();
        history.undo(&mut project).unwrap();

        assert_eq!(
            history.peek_undo().map(|e| e.description.as_str()),
            Some("Rename layer 'figure' to 'a'")
        );
        assert_eq!(
            history.peek_redo().map(|e| e.description.as_str()),
            Some("Rename layer 'a' to 'b'")
        );
        assert_eq!(
            history.undo_summary(),
            vec![(ids[2], "Rename layer 'figure' to 'a'".to_string())]
        );
        assert_eq!(
            history.redo_summary(),
            vec![
                (ids[1], "Rename layer 'a' to 'b'".to_string()),
                (ids[0], "Rename layer 'b' to 'c'".to_string()),
            ]
        );

        history.redo(&mut project).unwrap();
        assert_eq!(history.peek_undo().map(|e| e.id), Some(ids[1]));
        assert_eq!(history.redo_summary(), vec![(ids[0], "Rename layer 'b' to 'c'".to_string())]);
    }

    #[test]
    fn test_record_does_not_apply() {
        let mut project = project();
        let mut history = History::default();
        project.rename_layer(1, "dragged").unwrap();
        history.record(rename("dragged", "figure"));
        history.undo(&mut project).unwrap();
        assert_eq!(project.layer(1).unwrap().name, "figure");
    }
}
