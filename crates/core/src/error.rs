//! Error types reported back to the front-end.

use rust_decimal::Decimal;
use thiserror::Error;

/// Reasons an operation was rejected before touching the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required text input was empty.
    #[error("Enter a {0}.")]
    MissingField(&'static str),

    /// A numeric input could not be understood as an amount.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// A player with the same name (ignoring case) is already seated.
    #[error("Player {0} already exists.")]
    DuplicatePlayer(String),

    /// No player matches the given name.
    #[error("Player {0} not found.")]
    PlayerNotFound(String),

    /// No property matches the given name.
    #[error("Property {0} not found.")]
    PropertyNotFound(String),

    /// The property is still held by the bank.
    #[error("{0} is not owned. Buy it before building.")]
    PropertyUnowned(String),

    /// The property already belongs to a player.
    #[error("{property} is already owned by {owner}.")]
    AlreadyOwned {
        /// Property the purchase targeted.
        property: String,
        /// Current owner.
        owner: String,
    },

    /// The named player is not the property's owner.
    #[error("{player} does not own {property}.")]
    NotOwner {
        /// Player claimed to own the property.
        player: String,
        /// Property being transferred.
        property: String,
    },

    /// The checked balance does not cover the amount.
    #[error("Insufficient balance for {player}: has {balance}, needs {required}.")]
    InsufficientBalance {
        /// Player whose balance was checked.
        player: String,
        /// Balance at the time of the check.
        balance: Decimal,
        /// Amount the operation required.
        required: Decimal,
    },

    /// Applying the amount would overflow a balance.
    #[error("Amount {amount} is out of range for {player}'s balance.")]
    AmountOutOfRange {
        /// Player whose balance would overflow.
        player: String,
        /// Amount that was rejected.
        amount: Decimal,
    },
}

/// Undo/redo requested past either end of the history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Cursor already sits on the oldest snapshot.
    #[error("Cannot undo further.")]
    CannotUndo,
    /// Cursor already sits on the newest snapshot.
    #[error("Cannot redo further.")]
    CannotRedo,
}
