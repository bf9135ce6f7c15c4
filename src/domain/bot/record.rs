//! Response-side bot payload with typed accessors.

use serde_json::{Map, Value};
use std::fmt;

use super::definition::{BotDefinition, Flow, Intents};
use crate::domain::foundation::{BotId, SarufiError};

/// A bot as returned by the server.
///
/// Keeps the full JSON object so fields this SDK does not know about survive a
/// round trip; accessors read the well-known ones.
#[derive(Debug, Clone, PartialEq)]
pub struct BotRecord {
    id: BotId,
    data: Map<String, Value>,
}

impl BotRecord {
    /// Wraps a server payload. The payload must be an object with an integer `id`.
    pub fn from_value(value: Value) -> Result<Self, SarufiError> {
        let data = match value {
            Value::Object(map) => map,
            other => {
                return Err(SarufiError::decode(format!(
                    "expected a bot object, got {}",
                    other
                )))
            }
        };

        let id = data
            .get("id")
            .and_then(Value::as_i64)
            .map(BotId::new)
            .ok_or_else(|| SarufiError::decode("bot payload has no integer 'id'"))?;

        Ok(Self { id, data })
    }

    pub fn id(&self) -> BotId {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn industry(&self) -> Option<&str> {
        self.str_field("industry")
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.str_field("webhook_url")
    }

    pub fn visible_on_community(&self) -> Option<bool> {
        self.data.get("visible_on_community").and_then(Value::as_bool)
    }

    /// Intents keyed by name. Missing or malformed intents read as empty.
    pub fn intents(&self) -> Intents {
        self.data
            .get("intents")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Flow states keyed by name, read from the `flows` key.
    pub fn flow(&self) -> Flow {
        match self.data.get("flows") {
            Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Flow::new(),
        }
    }

    pub fn webhook_trigger_intents(&self) -> Vec<String> {
        self.data
            .get("webhook_trigger_intents")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }

    /// Model evaluation results, when the server has trained the bot.
    pub fn evaluation_metrics(&self) -> Option<&Value> {
        self.data.get("evaluation_metrics").filter(|v| !v.is_null())
    }

    /// Raw access to any field of the payload.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.data.clone())
    }

    /// Copies every field set in `definition` into the local payload.
    pub(crate) fn apply(&mut self, definition: &BotDefinition) {
        if let Ok(Value::Object(fields)) = serde_json::to_value(definition) {
            for (key, value) in fields {
                self.data.insert(key, value);
            }
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

impl fmt::Display for BotRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bot(id={}, name={})", self.id, self.name().unwrap_or(""))
    }
}
