//! A handle on one remote bot.

use serde_json::{Map, Value};
use std::fmt;

use super::client::Sarufi;
use crate::domain::bot::{BotDefinition, BotRecord, Flow, Intents};
use crate::domain::conversation::{ChatMessage, ChatReply, ChatStatus, IntentPrediction};
use crate::domain::foundation::{BotId, ChatId, SarufiError};

/// A bot fetched from or created on the server, bound to the client that loaded it.
///
/// The handle keeps a local copy of the bot's fields. Setters validate the new
/// value, write it into the local copy, then push it with an update request.
/// On success the local copy is replaced by what the server returned; on
/// failure it keeps the value that was attempted, so call [`Bot::refresh`] to
/// resynchronise.
///
/// Each handle also owns a chat session id, used by [`Bot::respond`] so that
/// consecutive messages continue the same conversation.
#[derive(Clone)]
pub struct Bot {
    record: BotRecord,
    chat_id: ChatId,
    client: Sarufi,
}

impl Bot {
    pub(crate) fn new(record: BotRecord, client: Sarufi) -> Self {
        Self {
            record,
            chat_id: ChatId::generate(),
            client,
        }
    }

    pub fn id(&self) -> BotId {
        self.record.id()
    }

    pub fn name(&self) -> Option<&str> {
        self.record.name()
    }

    pub fn description(&self) -> Option<&str> {
        self.record.description()
    }

    pub fn industry(&self) -> Option<&str> {
        self.record.industry()
    }

    pub fn intents(&self) -> Intents {
        self.record.intents()
    }

    pub fn flow(&self) -> Flow {
        self.record.flow()
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.record.webhook_url()
    }

    pub fn webhook_trigger_intents(&self) -> Vec<String> {
        self.record.webhook_trigger_intents()
    }

    pub fn visible_on_community(&self) -> Option<bool> {
        self.record.visible_on_community()
    }

    /// Model evaluation results, present once the server has trained the bot.
    pub fn evaluation_metrics(&self) -> Option<&Value> {
        self.record.evaluation_metrics()
    }

    /// The full payload as last received, including fields without an accessor.
    pub fn data(&self) -> &Map<String, Value> {
        self.record.data()
    }

    pub fn record(&self) -> &BotRecord {
        &self.record
    }

    /// Chat session used by [`Bot::respond`].
    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    /// Switches [`Bot::respond`] to another chat session.
    pub fn set_chat_id(&mut self, chat_id: ChatId) {
        self.chat_id = chat_id;
    }

    // -------------------------------------------------------------------------
    // Setters
    // -------------------------------------------------------------------------

    pub async fn set_name(&mut self, name: impl Into<String>) -> Result<(), SarufiError> {
        self.push(BotDefinition::default().with_name(name)).await
    }

    pub async fn set_description(
        &mut self,
        description: impl Into<String>,
    ) -> Result<(), SarufiError> {
        self.push(BotDefinition::default().with_description(description))
            .await
    }

    pub async fn set_industry(&mut self, industry: impl Into<String>) -> Result<(), SarufiError> {
        self.push(BotDefinition::default().with_industry(industry))
            .await
    }

    pub async fn set_visible_on_community(&mut self, visible: bool) -> Result<(), SarufiError> {
        self.push(BotDefinition::default().with_visible_on_community(visible))
            .await
    }

    /// Replaces all intents.
    pub async fn set_intents(&mut self, intents: Intents) -> Result<(), SarufiError> {
        self.push(BotDefinition::default().with_intents(intents))
            .await
    }

    /// Merges `intents` into the current ones. Existing names are overwritten.
    pub async fn add_intent(&mut self, intents: Intents) -> Result<(), SarufiError> {
        let mut merged = self.intents();
        merged.extend(intents);
        self.set_intents(merged).await
    }

    /// Replaces the whole flow.
    pub async fn set_flow(&mut self, flow: Flow) -> Result<(), SarufiError> {
        self.push(BotDefinition::default().with_flow(flow)).await
    }

    /// Merges `flow` into the current one. Existing states are overwritten.
    pub async fn add_flow(&mut self, flow: Flow) -> Result<(), SarufiError> {
        let mut merged = self.flow();
        merged.extend(flow);
        self.set_flow(merged).await
    }

    pub async fn set_webhook_url(&mut self, url: impl Into<String>) -> Result<(), SarufiError> {
        self.push(BotDefinition::default().with_webhook_url(url))
            .await
    }

    pub async fn set_webhook_trigger_intents<I, S>(&mut self, intents: I) -> Result<(), SarufiError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.push(BotDefinition::default().with_webhook_trigger_intents(intents))
            .await
    }

    /// Sets a field by name from an untyped value, e.g. one read from user input.
    pub async fn set(&mut self, field: &str, value: Value) -> Result<(), SarufiError> {
        let definition = BotDefinition::from_field(field, value)?;
        self.push(definition).await
    }

    /// Sends several field changes in one update request.
    pub async fn update(&mut self, definition: BotDefinition) -> Result<(), SarufiError> {
        self.push(definition).await
    }

    async fn push(&mut self, definition: BotDefinition) -> Result<(), SarufiError> {
        definition.validate()?;
        self.record.apply(&definition);
        self.record = self.client.update_record(self.id(), &definition).await?;
        Ok(())
    }

    /// Reloads the local copy from the server.
    pub async fn refresh(&mut self) -> Result<(), SarufiError> {
        let latest = self.client.get_bot(self.id()).await?;
        self.record = latest.record;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Conversation
    // -------------------------------------------------------------------------

    /// A text message to this bot in the handle's chat session.
    pub fn message(&self, text: impl Into<String>) -> ChatMessage {
        ChatMessage::new(self.id(), text).with_chat_id(self.chat_id.clone())
    }

    /// Sends a text message in the handle's chat session.
    pub async fn respond(&self, text: impl Into<String>) -> Result<ChatReply, SarufiError> {
        self.client.chat(&self.message(text)).await
    }

    /// Sends a fully specified message, e.g. with another channel or message type.
    ///
    /// The message is always addressed to this bot.
    pub async fn send(&self, message: ChatMessage) -> Result<ChatReply, SarufiError> {
        let message = ChatMessage {
            bot_id: self.id(),
            ..message
        };
        self.client.chat(&message).await
    }

    /// State of a chat session; defaults to the handle's own.
    pub async fn chat_state(&self, chat_id: Option<&ChatId>) -> Result<ChatStatus, SarufiError> {
        let chat_id = chat_id.unwrap_or(&self.chat_id);
        self.client.chat_status(self.id(), chat_id).await
    }

    /// Moves a chat session to `next_state`; defaults to the handle's own session.
    pub async fn update_conversation_state(
        &self,
        next_state: &str,
        chat_id: Option<&ChatId>,
    ) -> Result<ChatStatus, SarufiError> {
        let chat_id = chat_id.unwrap_or(&self.chat_id);
        self.client
            .update_conversation_state(self.id(), chat_id, next_state)
            .await
    }

    pub async fn predict_intent(&self, message: &str) -> Result<IntentPrediction, SarufiError> {
        self.client.predict_intent(self.id(), message).await
    }

    /// Deletes the bot on the server.
    pub async fn delete(self) -> Result<Value, SarufiError> {
        self.client.delete_bot(self.id()).await
    }
}

impl fmt::Display for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.record, f)
    }
}

impl fmt::Debug for Bot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bot")
            .field("id", &self.id())
            .field("name", &self.name())
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockTransport;
    use crate::config::SarufiConfig;
    use crate::ports::HttpMethod;
    use serde_json::json;
    use std::sync::Arc;

    fn client(transport: &MockTransport) -> Sarufi {
        Sarufi::with_transport(SarufiConfig::with_token("tok"), Arc::new(transport.clone()))
            .unwrap()
    }

    fn bot(transport: &MockTransport) -> Bot {
        let record = BotRecord::from_value(json!({
            "id": 9,
            "name": "iBank",
            "intents": {"greeting": ["hi"]},
            "flows": {"greeting": {"message": ["Hello"], "next_state": "end"}}
        }))
        .unwrap();
        Bot::new(record, client(transport))
    }

    #[test]
    fn display_shows_id_and_name() {
        let transport = MockTransport::new();
        assert_eq!(bot(&transport).to_string(), "Bot(id=9, name=iBank)");
    }

    #[test]
    fn each_handle_gets_its_own_chat_session() {
        let transport = MockTransport::new();
        assert_ne!(bot(&transport).chat_id(), bot(&transport).chat_id());
    }

    #[tokio::test]
    async fn invalid_setter_values_are_not_sent() {
        let transport = MockTransport::new();
        let mut bot = bot(&transport);

        let err = bot.set_webhook_url("not a url").await.unwrap_err();
        assert!(matches!(err, SarufiError::Validation(_)));
        assert!(bot.set("intents", json!("hi")).await.is_err());
        assert_eq!(transport.call_count(), 0);
        assert_eq!(bot.webhook_url(), None);
    }

    #[tokio::test]
    async fn failed_update_keeps_attempted_value_locally() {
        let transport = MockTransport::new().with_response(404, json!({"detail": "Not found"}));
        let mut bot = bot(&transport);

        let err = bot.set_industry("health").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(bot.industry(), Some("health"));
    }

    #[tokio::test]
    async fn add_intent_sends_merged_intents() {
        let transport = MockTransport::new().with_response(
            200,
            json!({"id": 9, "intents": {"greeting": ["hi"], "goodbye": ["bye"]}}),
        );
        let mut bot = bot(&transport);

        let mut extra = Intents::new();
        extra.insert("goodbye".to_string(), vec!["bye".to_string()]);
        bot.add_intent(extra).await.unwrap();

        let call = transport.last_call().unwrap();
        assert_eq!(
            call.body.unwrap()["intents"],
            json!({"greeting": ["hi"], "goodbye": ["bye"]})
        );
        assert_eq!(bot.intents().len(), 2);
    }

    #[tokio::test]
    async fn respond_reuses_the_handle_chat_id() {
        let transport = MockTransport::new()
            .with_response(200, json!({"message": ["Hello"]}))
            .with_response(200, json!({"message": ["Again"]}));
        let bot = bot(&transport);

        bot.respond("hi").await.unwrap();
        bot.respond("hi again").await.unwrap();

        let calls = transport.calls();
        let first = calls[0].body.as_ref().unwrap()["chat_id"].clone();
        let second = calls[1].body.as_ref().unwrap()["chat_id"].clone();
        assert_eq!(first, second);
        assert_eq!(first, json!(bot.chat_id().as_str()));
    }

    #[tokio::test]
    async fn send_always_targets_this_bot() {
        let transport = MockTransport::new().with_response(200, json!({"message": "ok"}));
        let bot = bot(&transport);

        bot.send(ChatMessage::new(BotId::new(1), "hi")).await.unwrap();
        assert_eq!(transport.last_call().unwrap().body.unwrap()["bot_id"], 9);
    }

    #[tokio::test]
    async fn add_flow_sends_merged_flows() {
        let transport = MockTransport::new().with_response(200, json!({"id": 9}));
        let mut bot = bot(&transport);

        let mut extra = Flow::new();
        extra.insert("goodbye".to_string(), json!({"message": ["Bye"], "next_state": "end"}));
        bot.add_flow(extra).await.unwrap();

        let call = transport.last_call().unwrap();
        assert_eq!(call.method, HttpMethod::Put);
        assert!(call.url.ends_with("chatbot/9"));
        assert_eq!(
            call.body,
            Some(json!({
                "flows": {
                    "greeting": {"message": ["Hello"], "next_state": "end"},
                    "goodbye": {"message": ["Bye"], "next_state": "end"}
                }
            }))
        );
    }

    #[tokio::test]
    async fn update_sends_set_fields_in_one_request() {
        let transport = MockTransport::new()
            .with_response(200, json!({"id": 9, "name": "Maria", "industry": "health"}));
        let mut bot = bot(&transport);

        bot.update(BotDefinition::named("Maria").with_industry("health"))
            .await
            .unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(
            transport.last_call().unwrap().body,
            Some(json!({"name": "Maria", "industry": "health"}))
        );
        assert_eq!(bot.name(), Some("Maria"));
        assert_eq!(bot.industry(), Some("health"));
    }

    #[tokio::test]
    async fn refresh_replaces_local_copy() {
        let transport = MockTransport::new()
            .with_response(404, json!({"detail": "Not found"}))
            .with_response(200, json!({"id": 9, "name": "fresh"}));
        let mut bot = bot(&transport);

        assert!(bot.set_name("attempted").await.is_err());
        assert_eq!(bot.name(), Some("attempted"));
        bot.refresh().await.unwrap();

        let gets = transport.calls_to(HttpMethod::Get, "chatbot/9");
        assert_eq!(gets.len(), 1);
        assert!(gets[0].body.is_none());
        assert_eq!(bot.name(), Some("fresh"));
        assert!(bot.intents().is_empty());
    }

    #[tokio::test]
    async fn update_conversation_state_defaults_to_handle_session() {
        let transport = MockTransport::new()
            .with_response(200, json!({"next_state": "end"}))
            .with_response(200, json!({"next_state": "start"}));
        let bot = bot(&transport);
        let other = ChatId::new("255700000000").unwrap();

        bot.update_conversation_state("end", None).await.unwrap();
        bot.update_conversation_state("start", Some(&other))
            .await
            .unwrap();

        let calls = transport.calls_to(HttpMethod::Post, "conversation-state");
        assert_eq!(
            calls[0].body,
            Some(json!({"chat_id": bot.chat_id().as_str(), "bot_id": "9", "next_state": "end"}))
        );
        assert_eq!(
            calls[1].body,
            Some(json!({"chat_id": "255700000000", "bot_id": "9", "next_state": "start"}))
        );
    }
}
