//! Conversation types. All state lives on the server; these are the request
//! bodies and thin wrappers over what it sends back.

mod message;
mod state;

pub(crate) use message::PredictIntentRequest;
pub use message::{ChatMessage, ChatReply, Channel, IntentPrediction, MessageType};
pub(crate) use state::{ChatStatusRequest, StateTransition};
pub use state::ChatStatus;
