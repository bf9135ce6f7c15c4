//! Chat message requests and replies.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::foundation::{BotId, ChatId};

/// Kind of content carried by a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    #[default]
    Text,
    Image,
    Audio,
    Video,
    File,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Audio => "audio",
            MessageType::Video => "video",
            MessageType::File => "file",
        };
        write!(f, "{}", s)
    }
}

/// Channel the conversation takes place on.
///
/// WhatsApp conversations use a dedicated endpoint so the server formats
/// replies for that platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    #[default]
    General,
    Whatsapp,
}

impl Channel {
    /// Endpoint path, relative to the API base URL.
    pub fn path(&self) -> &'static str {
        match self {
            Channel::General => "conversation/",
            Channel::Whatsapp => "conversation/whatsapp/",
        }
    }
}

/// A message sent to a bot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub chat_id: ChatId,
    pub bot_id: BotId,
    pub message: String,
    pub message_type: MessageType,
    /// Selects the endpoint; not part of the body.
    #[serde(skip)]
    pub channel: Channel,
}

impl ChatMessage {
    /// A text message on the general channel, in a freshly generated chat session.
    pub fn new(bot_id: BotId, message: impl Into<String>) -> Self {
        Self {
            chat_id: ChatId::generate(),
            bot_id,
            message: message.into(),
            message_type: MessageType::Text,
            channel: Channel::General,
        }
    }

    pub fn with_chat_id(mut self, chat_id: ChatId) -> Self {
        self.chat_id = chat_id;
        self
    }

    pub fn with_message_type(mut self, message_type: MessageType) -> Self {
        self.message_type = message_type;
        self
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channel = channel;
        self
    }
}

/// The bot's answer to a chat message.
///
/// The payload is owned by the server; the accessors cover the fields it
/// currently sends (`message`, `next_state`, `memory`).
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply(Value);

impl ChatReply {
    pub fn new(payload: Value) -> Self {
        Self(payload)
    }

    /// Reply messages. A single string reply is returned as one element.
    pub fn messages(&self) -> Vec<String> {
        match self.0.get("message") {
            Some(Value::String(s)) => vec![s.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn next_state(&self) -> Option<&str> {
        self.0.get("next_state").and_then(Value::as_str)
    }

    /// Session memory the server keeps for this chat.
    pub fn memory(&self) -> Option<&Value> {
        self.0.get("memory")
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

/// Result of an intent prediction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IntentPrediction {
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct PredictIntentRequest<'a> {
    pub bot_id: BotId,
    pub message: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_message_body_excludes_channel() {
        let msg = ChatMessage::new(BotId::new(5), "Hello")
            .with_chat_id(ChatId::new("furaha").unwrap())
            .with_channel(Channel::Whatsapp);

        let body = serde_json::to_value(&msg).unwrap();
        assert_eq!(
            body,
            json!({
                "chat_id": "furaha",
                "bot_id": 5,
                "message": "Hello",
                "message_type": "text"
            })
        );
    }

    #[test]
    fn channel_selects_endpoint() {
        assert_eq!(Channel::General.path(), "conversation/");
        assert_eq!(Channel::Whatsapp.path(), "conversation/whatsapp/");
    }

    #[test]
    fn message_type_serializes_lowercase() {
        assert_eq!(serde_json::to_value(MessageType::Audio).unwrap(), json!("audio"));
        assert_eq!(MessageType::File.to_string(), "file");
    }

    #[test]
    fn reply_reads_string_message() {
        let reply = ChatReply::new(json!({
            "message": "Ungependa kutuma kiasi gani ?",
            "next_state": "send_money_amount",
            "memory": {"data": {"send_money": "Tuma hela"}}
        }));

        assert_eq!(reply.messages(), vec!["Ungependa kutuma kiasi gani ?"]);
        assert_eq!(reply.next_state(), Some("send_money_amount"));
        assert_eq!(reply.memory().unwrap()["data"]["send_money"], "Tuma hela");
    }

    #[test]
    fn reply_reads_list_message() {
        let reply = ChatReply::new(json!({"message": ["Hi", "Karibu"], "next_state": "end"}));
        assert_eq!(reply.messages(), vec!["Hi", "Karibu"]);
    }

    #[test]
    fn reply_without_message_is_empty() {
        let reply = ChatReply::new(json!({}));
        assert!(reply.messages().is_empty());
        assert!(reply.next_state().is_none());
    }

    #[test]
    fn intent_prediction_tolerates_missing_fields() {
        let p: IntentPrediction =
            serde_json::from_value(json!({"intent": "greeting", "confidence": 0.75})).unwrap();
        assert_eq!(p.intent.as_deref(), Some("greeting"));
        assert_eq!(p.status, None);
        assert_eq!(p.confidence, Some(0.75));
    }
}
