#![allow(missing_docs)]

use serde::{Deserialize, Serialize};

use crate::models::{Player, Property, Transaction};

/// Everything the bank tracks for one game: seats, deeds and the ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub players: Vec<Player>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.properties.is_empty() && self.transactions.is_empty()
    }

    pub fn find_player(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|player| player.is_named(name))
    }

    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|property| property.is_named(name))
    }

    pub fn player_index(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|player| player.is_named(name))
    }

    pub fn property_index(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|property| property.is_named(name))
    }

    /// Properties currently held by `player`, in board order.
    pub fn properties_of<'a>(&'a self, player: &'a str) -> impl Iterator<Item = &'a Property> {
        self.properties
            .iter()
            .filter(move |property| property.is_owned_by(player))
    }

    /// Ledger entries, most recent first.
    pub fn recent_transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().rev()
    }
}
