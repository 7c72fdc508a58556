//! The bank: live session, its undo history and where it is saved.

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::{
    error::{HistoryError, ValidationError},
    history::History,
    ledger::Action,
    save::SessionStore,
    session::{codec, Session},
};

/// Outcome handed to the front-end after every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    /// Whether the command took effect.
    pub success: bool,
    /// Message to show the players.
    pub message: String,
}

impl Feedback {
    /// Successful outcome.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// Failed outcome.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Owns the live [`Session`], its [`History`] and the store it is saved to.
///
/// The snapshot under the history cursor always equals the live session.
pub struct Bank<S> {
    session: Session,
    history: History<Session>,
    store: S,
    autosave: bool,
}

impl<S: SessionStore> Bank<S> {
    /// Empty bank backed by `store`. Nothing is read from the store.
    pub fn new(store: S) -> Self {
        let session = Session::new();
        let history = History::new(&session);
        Self {
            session,
            history,
            store,
            autosave: false,
        }
    }

    /// Open a bank, restoring the saved session when one is readable.
    pub fn open(store: S) -> (Self, Feedback) {
        let mut bank = Self::new(store);
        let feedback = bank.load();
        (bank, feedback)
    }

    /// Write the session after every successful change.
    pub fn with_autosave(mut self, enabled: bool) -> Self {
        self.autosave = enabled;
        self
    }

    /// Read-only view of the live session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Undo history of the live session.
    pub fn history(&self) -> &History<Session> {
        &self.history
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run `action`, recording a snapshot when it succeeds.
    pub fn try_execute(&mut self, action: &Action) -> Result<String, ValidationError> {
        let message = action.apply(&mut self.session)?;
        self.history.record(&self.session);
        debug!(
            action = action.name(),
            position = self.history.cursor(),
            "Snapshot recorded"
        );
        Ok(message)
    }

    /// Run `action` and describe the outcome.
    pub fn execute(&mut self, action: &Action) -> Feedback {
        match self.try_execute(action) {
            Ok(message) => self.after_change(message),
            Err(err) => {
                warn!(action = action.name(), %err, "Action rejected");
                Feedback::error(err.to_string())
            }
        }
    }

    /// Restore the previous snapshot.
    pub fn try_undo(&mut self) -> Result<(), HistoryError> {
        self.session = self.history.undo()?;
        debug!(position = self.history.cursor(), "Undo applied");
        Ok(())
    }

    /// Restore the previous snapshot and describe the outcome.
    pub fn undo(&mut self) -> Feedback {
        match self.try_undo() {
            Ok(()) => self.after_change("Undid last action.".to_string()),
            Err(err) => Feedback::error(err.to_string()),
        }
    }

    /// Re-apply the next snapshot.
    pub fn try_redo(&mut self) -> Result<(), HistoryError> {
        self.session = self.history.redo()?;
        debug!(position = self.history.cursor(), "Redo applied");
        Ok(())
    }

    /// Re-apply the next snapshot and describe the outcome.
    pub fn redo(&mut self) -> Feedback {
        match self.try_redo() {
            Ok(()) => self.after_change("Redid action.".to_string()),
            Err(err) => Feedback::error(err.to_string()),
        }
    }

    /// Write the live session to the store.
    pub fn try_save(&self) -> Result<()> {
        let bytes = codec::encode(&self.session)?;
        self.store.save(&bytes)?;
        info!(store = %self.store.describe(), players = self.session.players.len(), "Session saved");
        Ok(())
    }

    /// Write the live session and describe the outcome.
    pub fn save(&self) -> Feedback {
        match self.try_save() {
            Ok(()) => Feedback::ok("Game data saved."),
            Err(err) => {
                warn!(?err, "Save failed");
                Feedback::error(format!("Failed to save game data: {err:#}"))
            }
        }
    }

    /// Replace the live session with the stored one and restart history.
    ///
    /// Returns `Ok(false)` when nothing is stored; the live session is left
    /// untouched in that case and on any error.
    pub fn try_load(&mut self) -> Result<bool> {
        let Some(bytes) = self.store.load()? else {
            return Ok(false);
        };
        let session = codec::decode(&bytes)?;
        self.history.reset(&session);
        self.session = session;
        info!(store = %self.store.describe(), players = self.session.players.len(), "Session loaded");
        Ok(true)
    }

    /// Load the stored session. Unreadable data counts as no data.
    pub fn load(&mut self) -> Feedback {
        match self.try_load() {
            Ok(true) => Feedback::ok("Game data loaded."),
            Ok(false) => Feedback::error("No saved data found."),
            Err(err) => {
                warn!(?err, store = %self.store.describe(), "Ignoring unreadable saved session");
                Feedback::error("No saved data found.")
            }
        }
    }

    /// Clear the store and start an empty session with fresh history.
    pub fn try_reset(&mut self) -> Result<()> {
        self.store.clear()?;
        self.session = Session::new();
        self.history.reset(&self.session);
        info!(store = %self.store.describe(), "Session reset");
        Ok(())
    }

    /// Reset and describe the outcome.
    pub fn reset(&mut self) -> Feedback {
        match self.try_reset() {
            Ok(()) => Feedback::ok("Game data has been reset."),
            Err(err) => {
                warn!(?err, "Reset failed");
                Feedback::error(format!("Failed to reset game data: {err:#}"))
            }
        }
    }

    fn after_change(&self, message: String) -> Feedback {
        if !self.autosave {
            return Feedback::ok(message);
        }
        match self.try_save() {
            Ok(()) => Feedback::ok(message),
            Err(err) => {
                warn!(?err, "Autosave failed");
                Feedback::ok(format!("{message} (autosave failed: {err:#})"))
            }
        }
    }
}
