//! Top-level control point store.
//!
//! Owns the current snapshot for the whole editing session, feeds every
//! message through [`reduce`] and keeps undo history of structural changes.

use crate::config::AppConfig;
use crate::crs::{ProjProjector, Projector};
use crate::format::FormatError;
use crate::message::Message;
use crate::reducer::reduce;
use crate::state::ControlPointState;
use crate::undo::UndoStack;

/// Session-wide owner of control point state.
pub struct Store {
    state: ControlPointState,
    config: AppConfig,
    projector: Box<dyn Projector>,
    history: UndoStack,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

impl Store {
    /// Create an empty store using the PROJ backend.
    pub fn new(config: AppConfig) -> Self {
        Self::with_projector(config, Box::new(ProjProjector))
    }

    /// Create an empty store with a specific projection backend.
    pub fn with_projector(config: AppConfig, projector: Box<dyn Projector>) -> Self {
        Self {
            state: ControlPointState::new(config.validation),
            history: UndoStack::with_config(config.history.into()),
            config,
            projector,
        }
    }

    /// The current snapshot.
    pub fn state(&self) -> &ControlPointState {
        &self.state
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    /// Apply `message`. Returns whether the snapshot changed.
    ///
    /// On error the snapshot is left as it was.
    pub fn dispatch(&mut self, message: Message) -> Result<bool, FormatError> {
        let message = self.fill_default_projection(message);
        let next = reduce(&self.state, message, self.projector.as_ref())?;
        if next == self.state {
            return Ok(false);
        }

        let structural = next.points != self.state.points || next.joins != self.state.joins;
        let previous = std::mem::replace(&mut self.state, next);
        if structural {
            self.history.push(previous);
        }
        Ok(true)
    }

    fn fill_default_projection(&self, message: Message) -> Message {
        match message {
            Message::SyncListToImages {
                images,
                rows,
                source_projection: None,
            } => Message::SyncListToImages {
                images,
                rows,
                source_projection: Some(self.config.preferences.default_projection.clone()),
            },
            other => other,
        }
    }

    /// Restore the snapshot before the last structural change.
    pub fn undo(&mut self) -> bool {
        let current = self.state.clone();
        match self.history.undo(current) {
            Some(previous) => {
                self.state = previous.with_thresholds(self.config.validation);
                true
            }
            None => false,
        }
    }

    /// Re-apply the last undone change.
    pub fn redo(&mut self) -> bool {
        let current = self.state.clone();
        match self.history.redo(current) {
            Some(next) => {
                self.state = next.with_thresholds(self.config.validation);
                true
            }
            None => false,
        }
    }

    /// Replace the configuration; status is re-evaluated against the new thresholds.
    pub fn set_config(&mut self, config: AppConfig) {
        self.state = self.state.with_thresholds(config.validation);
        self.history = UndoStack::with_config(config.history.into());
        self.config = config;
    }
}
