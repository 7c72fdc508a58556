//! Shared domain models.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Cash every player starts with.
pub const STARTING_BALANCE: Decimal = dec!(25000);

/// Building label for a property nothing has been built on.
pub const NO_BUILDING: &str = "None";

/// Pseudo-recipient for fines that go to the middle of the board.
pub const FREE_PARKING: &str = "Free Parking";

/// A seated player and their cash.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    /// Display name, unique ignoring case.
    pub name: String,
    /// Current cash balance.
    pub balance: Decimal,
}

impl Player {
    /// New player holding the starting balance.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            balance: STARTING_BALANCE,
        }
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }
}

/// A deed on the board, possibly held by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Property name, unique ignoring case.
    pub name: String,
    /// Owning player's name; `None` while the bank holds it.
    #[serde(default)]
    pub owner: Option<String>,
    /// Label of the most recent building.
    #[serde(default = "default_building")]
    pub building: String,
    /// Amount spent on the most recent building.
    #[serde(default)]
    pub build_price: Decimal,
}

impl Property {
    /// Unowned property with nothing built on it.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            building: default_building(),
            build_price: Decimal::ZERO,
        }
    }

    /// Case-insensitive name comparison.
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// True when `player` holds the deed, ignoring case.
    pub fn is_owned_by(&self, player: &str) -> bool {
        self.owner
            .as_deref()
            .map(|owner| names_match(owner, player))
            .unwrap_or(false)
    }
}

fn default_building() -> String {
    NO_BUILDING.to_string()
}

/// Category of a ledger entry, serialized in snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Cash handed to a player by the bank.
    MoneyAdded,
    /// Cash taken from a player by the bank.
    MoneyDeducted,
    /// Property bought from the bank.
    PropertyBuy,
    /// Building placed on an owned property.
    Build,
    /// Rent paid between players.
    Rent,
    /// Fine paid to the bank or Free Parking.
    Fine,
    /// Property moved between players.
    PropertyTransfer,
}

impl TransactionKind {
    /// Wire label, as stored in saved sessions.
    pub fn label(&self) -> &'static str {
        match self {
            TransactionKind::MoneyAdded => "money_added",
            TransactionKind::MoneyDeducted => "money_deducted",
            TransactionKind::PropertyBuy => "property_buy",
            TransactionKind::Build => "build",
            TransactionKind::Rent => "rent",
            TransactionKind::Fine => "fine",
            TransactionKind::PropertyTransfer => "property_transfer",
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Append-only record of one successful operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Entry category, stored under `type`.
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    /// Amount moved.
    pub amount: Decimal,
    /// Paying player, if any.
    #[serde(default)]
    pub from: Option<String>,
    /// Receiving party, if any.
    #[serde(default)]
    pub to: Option<String>,
    /// Property involved, if any.
    #[serde(default)]
    pub property: Option<String>,
    /// Free-text description.
    #[serde(default)]
    pub desc: String,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    /// Record stamped with the current time.
    pub fn new(kind: TransactionKind, amount: Decimal, desc: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            from: None,
            to: None,
            property: None,
            desc: desc.into(),
            timestamp: Utc::now(),
        }
    }

    /// Set the paying player.
    pub fn from_player(mut self, name: impl Into<String>) -> Self {
        self.from = Some(name.into());
        self
    }

    /// Set the receiving party.
    pub fn to_party(mut self, name: impl Into<String>) -> Self {
        self.to = Some(name.into());
        self
    }

    /// Set the property involved.
    pub fn on_property(mut self, name: impl Into<String>) -> Self {
        self.property = Some(name.into());
        self
    }
}

/// Where a fine ends up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FineDestination {
    /// Paid to the bank; the ledger records no recipient.
    #[default]
    Bank,
    /// Placed on Free Parking. Nobody is credited.
    FreeParking,
}

impl FineDestination {
    /// Choose the destination from a "to bank" flag.
    pub fn from_to_bank(to_bank: bool) -> Self {
        if to_bank {
            FineDestination::Bank
        } else {
            FineDestination::FreeParking
        }
    }

    /// Recipient recorded on the transaction.
    pub fn recipient(&self) -> Option<&'static str> {
        match self {
            FineDestination::Bank => None,
            FineDestination::FreeParking => Some(FREE_PARKING),
        }
    }

    /// Transaction description for this destination.
    pub fn description(&self) -> &'static str {
        match self {
            FineDestination::Bank => "Fine paid to bank",
            FineDestination::FreeParking => "Fine paid to Free Parking",
        }
    }
}

/// Name comparison used for every player and property key.
pub fn names_match(left: &str, right: &str) -> bool {
    left.to_lowercase() == right.to_lowercase()
}
