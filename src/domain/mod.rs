//! Domain layer containing the API's data types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (IDs, credentials, errors)
//! - `bot` - Bot definitions sent to the server and bot records received from it
//! - `conversation` - Chat messages, replies, and conversation state

pub mod bot;
pub mod conversation;
pub mod foundation;
