//! Request-side bot types: the fields sent when creating or updating a bot.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::foundation::ValidationError;

/// Intent name mapped to its example utterances.
pub type Intents = BTreeMap<String, Vec<String>>;

/// State name mapped to the state definition interpreted by the server.
///
/// Values are kept as raw JSON so that server-side extensions (choices,
/// webhooks, slot filling) pass through untouched. [`FlowState`] builds the
/// common `message` + `next_state` shape.
pub type Flow = BTreeMap<String, Value>;

/// Placeholder name used when a bot is created from files without a name.
pub const PLACEHOLDER_BOT_NAME: &str = "put name here";

/// The common shape of a flow state: messages to send, then a transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowState {
    pub message: Vec<String>,
    pub next_state: String,
}

impl FlowState {
    pub fn new<I, S>(messages: I, next_state: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            message: messages.into_iter().map(Into::into).collect(),
            next_state: next_state.into(),
        }
    }
}

impl From<FlowState> for Value {
    fn from(state: FlowState) -> Self {
        serde_json::json!({
            "message": state.message,
            "next_state": state.next_state,
        })
    }
}

/// Fields of a bot as sent to the create and update endpoints.
///
/// Every field is optional; unset fields are left out of the request body so an
/// update only touches what the caller set.
///
/// # Example
///
/// ```
/// use sarufi::domain::bot::{BotDefinition, FlowState};
///
/// let bot = BotDefinition::named("Maria")
///     .with_description("Swahili mental health assistant")
///     .with_intent("greeting", ["hi", "mambo"])
///     .with_flow_state("greeting", FlowState::new(["Karibu!"], "end"));
///
/// assert_eq!(bot.name.as_deref(), Some("Maria"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BotDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub intents: Option<Intents>,

    /// Serialized under `flows`, the key the server expects.
    #[serde(rename = "flows", skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_trigger_intents: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_on_community: Option<bool>,
}

impl BotDefinition {
    /// Starts a definition with only a name set.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_intents(mut self, intents: Intents) -> Self {
        self.intents = Some(intents);
        self
    }

    /// Adds one intent, keeping any already set.
    pub fn with_intent<I, S>(mut self, name: impl Into<String>, utterances: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.intents
            .get_or_insert_with(Intents::new)
            .insert(name.into(), utterances.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_flow(mut self, flow: Flow) -> Self {
        self.flow = Some(flow);
        self
    }

    /// Adds one flow state, keeping any already set.
    pub fn with_flow_state(mut self, name: impl Into<String>, state: impl Into<Value>) -> Self {
        self.flow
            .get_or_insert_with(Flow::new)
            .insert(name.into(), state.into());
        self
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn with_webhook_trigger_intents<I, S>(mut self, intents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.webhook_trigger_intents = Some(intents.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_visible_on_community(mut self, visible: bool) -> Self {
        self.visible_on_community = Some(visible);
        self
    }

    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Checks the set fields without touching the network.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ValidationError::empty_field("name"));
            }
        }
        if let Some(url) = &self.webhook_url {
            validate_webhook_url(url)?;
        }
        if let Some(intents) = &self.intents {
            if intents.keys().any(|k| k.trim().is_empty()) {
                return Err(ValidationError::empty_field("intent name"));
            }
        }
        if let Some(flow) = &self.flow {
            if flow.keys().any(|k| k.trim().is_empty()) {
                return Err(ValidationError::empty_field("flow state name"));
            }
        }
        Ok(())
    }

    /// Builds a single-field definition from an untyped value.
    ///
    /// Used when the field name is only known at runtime. A value of the wrong
    /// JSON type is rejected with [`ValidationError::WrongType`].
    pub fn from_field(field: &str, value: Value) -> Result<Self, ValidationError> {
        let definition = Self::default();
        let definition = match field {
            "name" => definition.with_name(string_field(field, value)?),
            "description" => definition.with_description(string_field(field, value)?),
            "industry" => definition.with_industry(string_field(field, value)?),
            "webhook_url" => definition.with_webhook_url(string_field(field, value)?),
            "visible_on_community" => definition.with_visible_on_community(
                value
                    .as_bool()
                    .ok_or_else(|| ValidationError::wrong_type(field, "a boolean"))?,
            ),
            "intents" => definition.with_intents(serde_json::from_value(value).map_err(|_| {
                ValidationError::wrong_type(field, "a map of intent names to lists of utterances")
            })?),
            "flow" | "flows" => definition.with_flow(
                serde_json::from_value(value)
                    .map_err(|_| ValidationError::wrong_type("flow", "a map of state names"))?,
            ),
            "webhook_trigger_intents" => {
                let intents: Vec<String> = serde_json::from_value(value)
                    .map_err(|_| ValidationError::wrong_type(field, "a list of intent names"))?;
                definition.with_webhook_trigger_intents(intents)
            }
            other => {
                return Err(ValidationError::invalid_format(
                    "field",
                    format!("'{}' is not a writable bot field", other),
                ))
            }
        };
        definition.validate()?;
        Ok(definition)
    }
}

fn string_field(field: &str, value: Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s),
        _ => Err(ValidationError::wrong_type(field, "a string")),
    }
}

/// Webhook URLs must be absolute http(s) URLs.
fn validate_webhook_url(url: &str) -> Result<(), ValidationError> {
    let parsed =
        Url::parse(url).map_err(|e| ValidationError::invalid_format("webhook_url", e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::invalid_format(
            "webhook_url",
            format!("unsupported scheme '{}'", other),
        )),
    }
}

/// Bot metadata as stored in a definition file.
///
/// Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BotMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub webhook_trigger_intents: Option<Vec<String>>,
    #[serde(default)]
    pub visible_on_community: Option<bool>,
}

impl BotMetadata {
    /// Combines metadata with intents and flow into a definition.
    pub fn into_definition(self, intents: Option<Intents>, flow: Option<Flow>) -> BotDefinition {
        BotDefinition {
            name: self.name,
            description: self.description,
            industry: self.industry,
            intents,
            flow,
            webhook_url: self.webhook_url,
            webhook_trigger_intents: self.webhook_trigger_intents,
            visible_on_community: self.visible_on_community,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn unset_fields_are_omitted_from_body() {
        let body = serde_json::to_value(BotDefinition::named("Maria")).unwrap();
        assert_eq!(body, json!({"name": "Maria"}));
    }

    #[test]
    fn flow_is_sent_under_flows_key() {
        let def = BotDefinition::default()
            .with_flow_state("greeting", FlowState::new(["Hi"], "end"));
        let body = serde_json::to_value(def).unwrap();

        assert_eq!(
            body,
            json!({"flows": {"greeting": {"message": ["Hi"], "next_state": "end"}}})
        );
    }

    #[test]
    fn with_intent_accumulates() {
        let def = BotDefinition::default()
            .with_intent("greeting", ["hi", "hello"])
            .with_intent("goodbye", ["bye"]);

        let intents = def.intents.unwrap();
        assert_eq!(intents.len(), 2);
        assert_eq!(intents["greeting"], vec!["hi", "hello"]);
    }

    #[test]
    fn empty_definition_is_empty() {
        assert!(BotDefinition::default().is_empty());
        assert!(!BotDefinition::default().with_visible_on_community(false).is_empty());
    }

    #[test]
    fn validate_rejects_blank_name() {
        let err = BotDefinition::named("  ").validate().unwrap_err();
        assert_eq!(err, ValidationError::empty_field("name"));
    }

    #[test]
    fn validate_rejects_relative_webhook_url() {
        let def = BotDefinition::default().with_webhook_url("/hook");
        assert!(matches!(
            def.validate(),
            Err(ValidationError::InvalidFormat { ref field, .. }) if field == "webhook_url"
        ));
    }

    #[test]
    fn validate_rejects_non_http_webhook_url() {
        let def = BotDefinition::default().with_webhook_url("ftp://example.com/hook");
        assert!(def.validate().is_err());
    }

    #[test]
    fn validate_accepts_complete_definition() {
        let def = BotDefinition::named("iBank")
            .with_webhook_url("https://www.example.com/hook")
            .with_intent("balance", ["salio"])
            .with_flow_state("balance", FlowState::new(["Salio lako ni 0"], "end"));
        assert!(def.validate().is_ok());
    }

    #[test]
    fn from_field_builds_single_field_definitions() {
        let def = BotDefinition::from_field("industry", json!("health")).unwrap();
        assert_eq!(def, BotDefinition::default().with_industry("health"));

        let def = BotDefinition::from_field("flows", json!({"end": {"message": ["Bye"]}})).unwrap();
        assert_eq!(def.flow.unwrap()["end"]["message"][0], "Bye");
    }

    #[test]
    fn from_field_rejects_wrong_types() {
        assert_eq!(
            BotDefinition::from_field("name", json!(42)).unwrap_err(),
            ValidationError::wrong_type("name", "a string")
        );
        assert!(matches!(
            BotDefinition::from_field("intents", json!(["hi"])),
            Err(ValidationError::WrongType { .. })
        ));
        assert!(matches!(
            BotDefinition::from_field("visible_on_community", json!("yes")),
            Err(ValidationError::WrongType { .. })
        ));
    }

    #[test]
    fn from_field_rejects_unknown_and_read_only_fields() {
        assert!(matches!(
            BotDefinition::from_field("id", json!(3)),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn from_field_still_validates_values() {
        assert!(BotDefinition::from_field("webhook_url", json!("example.com")).is_err());
    }

    #[test]
    fn metadata_ignores_unknown_keys() {
        let meta: BotMetadata = serde_json::from_value(json!({
            "name": "Kibeti",
            "industry": "finance",
            "owner": "someone"
        }))
        .unwrap();

        let def = meta.into_definition(None, None);
        assert_eq!(def.name.as_deref(), Some("Kibeti"));
        assert_eq!(def.industry.as_deref(), Some("finance"));
        assert!(def.intents.is_none());
    }

    proptest! {
        #[test]
        fn serialized_definition_never_contains_nulls(
            name in proptest::option::of("[a-zA-Z ]{1,12}"),
            description in proptest::option::of(".{0,20}"),
            industry in proptest::option::of("[a-z]{1,8}"),
            visible in proptest::option::of(any::<bool>()),
        ) {
            let def = BotDefinition {
                name: name.clone(),
                description: description.clone(),
                industry: industry.clone(),
                visible_on_community: visible,
                ..Default::default()
            };
            let body = serde_json::to_value(&def).unwrap();
            let map = body.as_object().unwrap();

            prop_assert!(map.values().all(|v| !v.is_null()));
            let expected = [name.is_some(), description.is_some(), industry.is_some(), visible.is_some()]
                .iter()
                .filter(|set| **set)
                .count();
            prop_assert_eq!(map.len(), expected);
        }
    }
}
