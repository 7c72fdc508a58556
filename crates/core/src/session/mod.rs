//! Session aggregate and its byte encoding.

pub mod codec;
mod models;

pub use models::Session;
