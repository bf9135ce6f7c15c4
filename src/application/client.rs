//! The Sarufi API client.

use reqwest::Url;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use super::auth::{is_token_error, TokenManager};
use super::bot::Bot;
use crate::adapters::http::ReqwestTransport;
use crate::adapters::storage::DefinitionFiles;
use crate::config::SarufiConfig;
use crate::domain::bot::{BotDefinition, BotRecord, PLACEHOLDER_BOT_NAME};
use crate::domain::conversation::{
    ChatMessage, ChatReply, ChatStatus, ChatStatusRequest, IntentPrediction, PredictIntentRequest,
    StateTransition,
};
use crate::domain::foundation::{BotId, ChatId, SarufiError, ValidationError};
use crate::ports::{ApiRequest, HttpMethod, HttpTransport};

const CHATBOT_PATH: &str = "chatbot";
const CHATBOTS_PATH: &str = "chatbots";
const CHAT_STATUS_PATH: &str = "conversation/allchannels/status";
const CONVERSATION_STATE_PATH: &str = "conversation-state";
const PREDICT_INTENT_PATH: &str = "predict/intent";

/// Client for the Sarufi chatbot API.
///
/// Cheap to clone; clones share the transport and the cached bearer token.
/// Every request carries `Authorization: Bearer <token>`. When the server
/// rejects the token and the client holds login credentials, it logs in again
/// and retries the request exactly once.
///
/// # Example
///
/// ```no_run
/// use sarufi::{BotDefinition, SarufiConfig, Sarufi};
///
/// # async fn run() -> Result<(), sarufi::SarufiError> {
/// let client = Sarufi::new(SarufiConfig::with_client_secret("id", "secret"))?;
/// let bot = client
///     .create_bot(BotDefinition::named("Maria").with_industry("health"))
///     .await?;
/// println!("{}", bot);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Sarufi {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    base_url: Url,
    transport: Arc<dyn HttpTransport>,
    tokens: TokenManager,
}

impl Sarufi {
    /// Builds a client talking HTTP through reqwest.
    pub fn new(config: SarufiConfig) -> Result<Self, SarufiError> {
        config.validate()?;
        let transport = ReqwestTransport::new(config.api.timeout())?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Builds a client from `SARUFI__*` environment variables.
    pub fn from_env() -> Result<Self, SarufiError> {
        Self::new(SarufiConfig::load()?)
    }

    /// Builds a client on top of any transport.
    pub fn with_transport(
        config: SarufiConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, SarufiError> {
        config.validate()?;
        let base_url = config.api.base_url()?;
        let credentials = config.auth.credentials()?;

        tracing::debug!(
            base_url = %base_url,
            credentials = credentials.kind(),
            "Created Sarufi client"
        );

        Ok(Self {
            inner: Arc::new(ClientInner {
                base_url,
                transport,
                tokens: TokenManager::new(credentials),
            }),
        })
    }

    /// Obtains a token now instead of on the first request.
    pub async fn login(&self) -> Result<(), SarufiError> {
        let stale = self.inner.tokens.current().await;
        self.inner
            .tokens
            .refresh(stale.as_deref(), &self.inner.base_url, self.inner.transport.as_ref())
            .await?;
        Ok(())
    }

    /// Whether a bearer token is currently cached.
    pub async fn has_token(&self) -> bool {
        self.inner.tokens.has_token().await
    }

    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    // -------------------------------------------------------------------------
    // Bots
    // -------------------------------------------------------------------------

    /// Creates a bot. A non-blank name is required.
    pub async fn create_bot(&self, definition: BotDefinition) -> Result<Bot, SarufiError> {
        match definition.name.as_deref() {
            Some(name) if !name.trim().is_empty() => {}
            _ => return Err(ValidationError::empty_field("name").into()),
        }
        definition.validate()?;

        tracing::info!(name = ?definition.name, "Creating bot");
        let body = self
            .send_json(HttpMethod::Post, CHATBOT_PATH, &definition)
            .await?;
        Ok(Bot::new(BotRecord::from_value(body)?, self.clone()))
    }

    /// Creates a bot from intents, flow and metadata files.
    ///
    /// Falls back to a placeholder name when the metadata has none.
    pub async fn create_from_file(&self, files: &DefinitionFiles) -> Result<Bot, SarufiError> {
        let mut definition = files.load().await?.into_definition();
        if definition
            .name
            .as_deref()
            .map_or(true, |name| name.trim().is_empty())
        {
            definition.name = Some(PLACEHOLDER_BOT_NAME.to_string());
        }
        self.create_bot(definition).await
    }

    /// Sends the set fields of `definition` to an existing bot.
    pub async fn update_bot(
        &self,
        id: BotId,
        definition: BotDefinition,
    ) -> Result<Bot, SarufiError> {
        let record = self.update_record(id, &definition).await?;
        Ok(Bot::new(record, self.clone()))
    }

    /// Updates a bot from intents, flow and metadata files.
    pub async fn update_from_file(
        &self,
        id: BotId,
        files: &DefinitionFiles,
    ) -> Result<Bot, SarufiError> {
        let definition = files.load().await?.into_definition();
        self.update_bot(id, definition).await
    }

    pub async fn get_bot(&self, id: BotId) -> Result<Bot, SarufiError> {
        let body = self
            .send(HttpMethod::Get, &bot_path(id), None)
            .await?;
        Ok(Bot::new(BotRecord::from_value(body)?, self.clone()))
    }

    /// Lists every bot owned by the authenticated account.
    pub async fn bots(&self) -> Result<Vec<Bot>, SarufiError> {
        let body = self.send(HttpMethod::Get, CHATBOTS_PATH, None).await?;
        let items = match body {
            Value::Array(items) => items,
            other => {
                return Err(SarufiError::decode(format!(
                    "expected a list of bots, got {}",
                    other
                )))
            }
        };

        items
            .into_iter()
            .map(|item| -> Result<Bot, SarufiError> {
                Ok(Bot::new(BotRecord::from_value(item)?, self.clone()))
            })
            .collect()
    }

    /// Deletes a bot and returns the server's confirmation payload.
    pub async fn delete_bot(&self, id: BotId) -> Result<Value, SarufiError> {
        tracing::info!(bot_id = %id, "Deleting bot");
        self.send(HttpMethod::Delete, &bot_path(id), None).await
    }

    pub(crate) async fn update_record(
        &self,
        id: BotId,
        definition: &BotDefinition,
    ) -> Result<BotRecord, SarufiError> {
        definition.validate()?;
        tracing::info!(bot_id = %id, "Updating bot");
        let body = self
            .send_json(HttpMethod::Put, &bot_path(id), definition)
            .await?;
        BotRecord::from_value(body)
    }

    // -------------------------------------------------------------------------
    // Conversations
    // -------------------------------------------------------------------------

    /// Sends one user message and returns the bot's reply.
    pub async fn chat(&self, message: &ChatMessage) -> Result<ChatReply, SarufiError> {
        let body = self
            .send_json(HttpMethod::Post, message.channel.path(), message)
            .await?;
        Ok(ChatReply::new(body))
    }

    /// Current and next state of a conversation.
    pub async fn chat_status(
        &self,
        bot_id: BotId,
        chat_id: &ChatId,
    ) -> Result<ChatStatus, SarufiError> {
        let request = ChatStatusRequest::new(bot_id, chat_id.clone());
        let body = self
            .send_json(HttpMethod::Post, CHAT_STATUS_PATH, &request)
            .await?;
        Ok(ChatStatus::new(body))
    }

    /// Moves a conversation to `next_state`.
    pub async fn update_conversation_state(
        &self,
        bot_id: BotId,
        chat_id: &ChatId,
        next_state: &str,
    ) -> Result<ChatStatus, SarufiError> {
        let request = StateTransition::new(bot_id, chat_id.clone(), next_state)?;
        let body = self
            .send_json(HttpMethod::Post, CONVERSATION_STATE_PATH, &request)
            .await?;
        Ok(ChatStatus::new(body))
    }

    /// Classifies `message` against the bot's intents without advancing any conversation.
    pub async fn predict_intent(
        &self,
        bot_id: BotId,
        message: &str,
    ) -> Result<IntentPrediction, SarufiError> {
        let request = PredictIntentRequest { bot_id, message };
        let body = self
            .send_json(HttpMethod::Post, PREDICT_INTENT_PATH, &request)
            .await?;
        serde_json::from_value(body)
            .map_err(|e| SarufiError::decode(format!("intent prediction: {}", e)))
    }

    // -------------------------------------------------------------------------
    // Request plumbing
    // -------------------------------------------------------------------------

    async fn bearer(&self) -> Result<String, SarufiError> {
        self.inner
            .tokens
            .bearer(&self.inner.base_url, self.inner.transport.as_ref())
            .await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &T,
    ) -> Result<Value, SarufiError> {
        let body = serde_json::to_value(body)
            .map_err(|e| SarufiError::decode(format!("request body: {}", e)))?;
        self.send(method, path, Some(body)).await
    }

    /// Executes an authenticated request and returns the body of a 200 response.
    async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, SarufiError> {
        let url = self
            .inner
            .base_url
            .join(path)
            .map_err(|e| SarufiError::config(format!("Invalid URL for {}: {}", path, e)))?;

        let mut token = self.bearer().await?;
        let mut retried = false;

        loop {
            let mut request = ApiRequest::new(method, url.as_str()).with_bearer(&token);
            if let Some(body) = &body {
                request = request.with_json(body.clone());
            }

            let response = self.inner.transport.execute(request).await?;
            if response.is_ok() {
                return Ok(response.body);
            }

            if !retried
                && is_token_error(&response)
                && self.inner.tokens.credentials().can_refresh()
            {
                tracing::info!(%method, path, "Token rejected, refreshing");
                token = self
                    .inner
                    .tokens
                    .refresh(Some(&token), &self.inner.base_url, self.inner.transport.as_ref())
                    .await?;
                retried = true;
                continue;
            }

            tracing::warn!(%method, path, status = response.status, "Sarufi API request failed");
            return Err(SarufiError::Api {
                status: response.status,
                body: response.body,
            });
        }
    }
}

impl std::fmt::Debug for Sarufi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sarufi")
            .field("base_url", &self.inner.base_url.as_str())
            .field("credentials", &self.inner.tokens.credentials().kind())
            .finish()
    }
}

fn bot_path(id: BotId) -> String {
    format!("{}/{}", CHATBOT_PATH, id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::MockTransport;
    use serde_json::json;

    fn client(transport: &MockTransport) -> Sarufi {
        Sarufi::with_transport(
            SarufiConfig::with_token("tok").base_url("http://localhost:8000"),
            Arc::new(transport.clone()),
        )
        .unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = Sarufi::with_transport(SarufiConfig::default(), Arc::new(MockTransport::new()))
            .unwrap_err();
        assert!(matches!(err, SarufiError::Config(_)));
    }

    #[test]
    fn bot_path_includes_id() {
        assert_eq!(bot_path(BotId::new(7)), "chatbot/7");
    }

    #[tokio::test]
    async fn requests_join_the_base_url() {
        let transport = MockTransport::new().with_response(200, json!([]));
        let bots = client(&transport).bots().await.unwrap();

        assert!(bots.is_empty());
        assert_eq!(
            transport.last_call().unwrap().url,
            "http://localhost:8000/chatbots"
        );
    }

    #[tokio::test]
    async fn non_list_bots_response_is_a_decode_error() {
        let transport = MockTransport::new().with_response(200, json!({"detail": "odd"}));
        let err = client(&transport).bots().await.unwrap_err();
        assert!(matches!(err, SarufiError::Decode(_)));
    }

    #[tokio::test]
    async fn create_bot_requires_a_name() {
        let transport = MockTransport::new();
        let err = client(&transport)
            .create_bot(BotDefinition::default().with_industry("health"))
            .await
            .unwrap_err();

        assert!(matches!(err, SarufiError::Validation(_)));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn transport_failures_surface_as_transport_errors() {
        let transport = MockTransport::new()
            .with_error(crate::ports::TransportError::Timeout { timeout_secs: 30 });
        let err = client(&transport).get_bot(BotId::new(1)).await.unwrap_err();
        assert!(matches!(err, SarufiError::Transport(_)));
    }

    #[test]
    fn debug_hides_credentials() {
        let transport = MockTransport::new();
        let debug = format!("{:?}", client(&transport));
        assert!(debug.contains("token"));
        assert!(!debug.contains("tok\""));
    }
}
