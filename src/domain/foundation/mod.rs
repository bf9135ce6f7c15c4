//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, credentials and error types that form the vocabulary
//! of the SDK.

mod credentials;
mod errors;
mod ids;

pub use credentials::Credentials;
pub use errors::{SarufiError, ValidationError};
pub use ids::{BotId, ChatId};
