//! Server-side conversation state: status queries and explicit transitions.

use serde::Serialize;
use serde_json::Value;

use crate::domain::foundation::{BotId, ChatId, ValidationError};

/// Body of a chat status query. The endpoint expects the bot id as a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct ChatStatusRequest {
    pub chat_id: ChatId,
    pub bot_id: String,
}

impl ChatStatusRequest {
    pub fn new(bot_id: BotId, chat_id: ChatId) -> Self {
        Self {
            chat_id,
            bot_id: bot_id.to_string(),
        }
    }
}

/// Body of an explicit state transition. The bot id is sent as a string.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub(crate) struct StateTransition {
    pub chat_id: ChatId,
    pub bot_id: String,
    pub next_state: String,
}

impl StateTransition {
    pub fn new(
        bot_id: BotId,
        chat_id: ChatId,
        next_state: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let next_state = next_state.into();
        if next_state.trim().is_empty() {
            return Err(ValidationError::empty_field("next_state"));
        }
        Ok(Self {
            chat_id,
            bot_id: bot_id.to_string(),
            next_state,
        })
    }
}

/// Where a chat session currently stands, as reported by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatStatus(Value);

impl ChatStatus {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    pub fn current_state(&self) -> Option<&str> {
        self.0.get("current_state").and_then(Value::as_str)
    }

    pub fn next_state(&self) -> Option<&str> {
        self.0.get("next_state").and_then(Value::as_str)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_request_sends_bot_id_as_string() {
        let req = ChatStatusRequest::new(BotId::new(5), ChatId::new("abc").unwrap());
        assert_eq!(
            serde_json::to_value(req).unwrap(),
            json!({"chat_id": "abc", "bot_id": "5"})
        );
    }

    #[test]
    fn transition_requires_next_state() {
        let err = StateTransition::new(BotId::new(5), ChatId::new("abc").unwrap(), " ");
        assert_eq!(err.unwrap_err(), ValidationError::empty_field("next_state"));
    }

    #[test]
    fn transition_body_shape() {
        let t = StateTransition::new(BotId::new(5), ChatId::new("abc").unwrap(), "greetings")
            .unwrap();
        assert_eq!(
            serde_json::to_value(t).unwrap(),
            json!({"chat_id": "abc", "bot_id": "5", "next_state": "greetings"})
        );
    }

    #[test]
    fn status_accessors() {
        let status = ChatStatus::new(json!({"current_state": "greetings", "next_state": "end"}));
        assert_eq!(status.current_state(), Some("greetings"));
        assert_eq!(status.next_state(), Some("end"));
    }
}
