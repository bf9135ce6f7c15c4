//! Mock transport for testing.
//!
//! Provides a scripted implementation of the `HttpTransport` port so client
//! behaviour can be verified without a network.
//!
//! # Features
//!
//! - Pre-configured responses, consumed in order
//! - Transport error injection
//! - Request recording for verification
//!
//! # Example
//!
//! ```ignore
//! let transport = MockTransport::new()
//!     .with_response(400, json!({"detail": "Token Expired"}))
//!     .with_response(200, json!({"access_token": "fresh"}))
//!     .with_response(200, json!([]));
//!
//! let client = Sarufi::with_transport(config, Arc::new(transport.clone()))?;
//! client.bots().await?;
//! assert_eq!(transport.call_count(), 3);
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::ports::{ApiRequest, ApiResponse, HttpMethod, HttpTransport, TransportError};

/// Scripted HTTP transport. Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    /// Pre-configured replies (consumed in order).
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    /// Call history for verification.
    calls: Arc<Mutex<Vec<ApiRequest>>>,
}

/// A configured mock reply.
#[derive(Debug, Clone)]
enum MockReply {
    Response(ApiResponse),
    Error(TransportError),
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a response with the given status and JSON body.
    pub fn with_response(self, status: u16, body: Value) -> Self {
        self.push_response(status, body);
        self
    }

    /// Queues a transport failure.
    pub fn with_error(self, error: TransportError) -> Self {
        self.lock_replies().push_back(MockReply::Error(error));
        self
    }

    /// Queues a response on an already shared mock.
    pub fn push_response(&self, status: u16, body: Value) {
        self.lock_replies()
            .push_back(MockReply::Response(ApiResponse::new(status, body)));
    }

    /// All requests received so far.
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.lock_calls().clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock_calls().len()
    }

    pub fn last_call(&self) -> Option<ApiRequest> {
        self.lock_calls().last().cloned()
    }

    /// Requests whose URL ends with `path` and use `method`.
    pub fn calls_to(&self, method: HttpMethod, path: &str) -> Vec<ApiRequest> {
        self.lock_calls()
            .iter()
            .filter(|c| c.method == method && c.url.ends_with(path))
            .cloned()
            .collect()
    }

    /// Number of scripted replies not consumed yet.
    pub fn remaining(&self) -> usize {
        self.lock_replies().len()
    }

    fn lock_replies(&self) -> std::sync::MutexGuard<'_, VecDeque<MockReply>> {
        self.replies.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<ApiRequest>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        let description = format!("{} {}", request.method, request.url);
        self.lock_calls().push(request);

        match self.lock_replies().pop_front() {
            Some(MockReply::Response(response)) => Ok(response),
            Some(MockReply::Error(error)) => Err(error),
            None => Err(TransportError::Other(format!(
                "no scripted response for {}",
                description
            ))),
        }
    }
}
