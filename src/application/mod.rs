//! Application layer - the client and bot handle callers work with.
//!
//! Orchestrates domain types and the HTTP transport port: token handling,
//! request retry on token expiry, and decoding of responses.

mod auth;
mod bot;
mod client;

pub use auth::is_token_error;
pub use bot::Bot;
pub use client::Sarufi;
