//! Bot resource types.
//!
//! - [`BotDefinition`] is what the client sends to create or update a bot.
//! - [`BotRecord`] is what the server returns.

mod definition;
mod record;

pub use definition::{BotDefinition, BotMetadata, Flow, FlowState, Intents, PLACEHOLDER_BOT_NAME};
pub use record::BotRecord;
