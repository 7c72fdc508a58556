#![warn(clippy::all, missing_docs)]

//! Core domain logic for the board-game banker.
//!
//! This crate hosts the session model, the money and deed operations,
//! the undo history, configuration handling and the persistence layer
//! used by the terminal UI and any future frontends.

pub mod bank;
pub mod config;
pub mod error;
pub mod history;
pub mod ledger;
pub mod models;
pub mod save;
pub mod session;

pub use bank::{Bank, Feedback};
pub use config::AppConfig;
pub use error::{HistoryError, ValidationError};
pub use history::History;
pub use ledger::Action;
pub use models::{FineDestination, Player, Property, Transaction, TransactionKind};
pub use save::{FileStore, MemoryStore, SessionStore};
pub use session::Session;
