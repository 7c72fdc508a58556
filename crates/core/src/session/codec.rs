//! Byte encoding of a session for the persistence gateway.

use anyhow::{Context, Result};

use super::models::Session;

/// Serialize a session to the JSON layout used by saved games.
pub fn encode(session: &Session) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(session).context("failed to serialize session")
}

/// Parse a saved session. Missing collections default to empty.
pub fn decode(bytes: &[u8]) -> Result<Session> {
    serde_json::from_slice(bytes).context("failed to parse saved session")
}
