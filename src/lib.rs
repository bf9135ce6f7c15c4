//! Sarufi - async client for the Sarufi conversational-AI platform
//!
//! This crate manages chatbots (create, update, fetch, list, delete), drives
//! conversations with them, and queries or moves conversation state.
//!
//! # Layout
//!
//! - `config` - credentials, base URL, and timeout loaded from the environment
//! - `domain` - bot definitions and records, chat messages and replies
//! - `ports` - the `HttpTransport` seam
//! - `adapters` - reqwest and mock transports, definition file loading
//! - `application` - the [`Sarufi`] client and the [`Bot`] handle

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

pub use adapters::DefinitionFiles;
pub use application::{Bot, Sarufi};
pub use config::SarufiConfig;
pub use domain::bot::{BotDefinition, Flow, FlowState, Intents};
pub use domain::conversation::{
    Channel, ChatMessage, ChatReply, ChatStatus, IntentPrediction, MessageType,
};
pub use domain::foundation::{BotId, ChatId, Credentials, SarufiError, ValidationError};
