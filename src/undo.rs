//! Undo/Redo history for control point edits.
//!
//! Snapshots are immutable values, so history simply keeps the snapshots
//! that were current before each structural change.

use crate::state::ControlPointState;

/// Default number of snapshots kept in history.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Configuration for the undo stack
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoConfig {
    /// Maximum number of snapshots to keep in history
    pub max_history: usize,
}

impl Default for UndoConfig {
    fn default() -> Self {
        Self {
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

/// The undo/redo history stack.
///
/// - `undo_stack`: snapshots to go back to (most recent at the end)
/// - `redo_stack`: snapshots undone, to go forward to (most recent at the end)
///
/// Recording a new snapshot clears the redo stack.
#[derive(Debug, Clone, Default)]
pub struct UndoStack {
    undo_stack: Vec<ControlPointState>,
    redo_stack: Vec<ControlPointState>,
    config: UndoConfig,
}

impl UndoStack {
    /// Create a new empty undo stack
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom configuration
    pub fn with_config(config: UndoConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    /// Record the snapshot that was current before a change.
    pub fn push(&mut self, previous: ControlPointState) {
        self.undo_stack.push(previous);
        self.redo_stack.clear();

        while self.undo_stack.len() > self.config.max_history {
            self.undo_stack.remove(0);
        }
        log::debug!("📝 Undo: {} snapshots in history", self.undo_stack.len());
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Step back: returns the snapshot to restore and keeps `current` for redo.
    pub fn undo(&mut self, current: ControlPointState) -> Option<ControlPointState> {
        let previous = self.undo_stack.pop()?;
        log::debug!("⏪ Undo");
        self.redo_stack.push(current);
        Some(previous)
    }

    /// Step forward: returns the snapshot to restore and keeps `current` for undo.
    pub fn redo(&mut self, current: ControlPointState) -> Option<ControlPointState> {
        let next = self.redo_stack.pop()?;
        log::debug!("⏩ Redo");
        self.undo_stack.push(current);
        Some(next)
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        log::debug!("🗑️ Undo history cleared");
    }

    /// Get the number of snapshots in undo history
    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of snapshots in redo history
    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }
}
