use async_trait::async_trait;
use std::sync::Arc;

use crate::session::{Message, ToolRequest};
use crate::tool::ToolDefinition;

use super::openai::OpenAiClient;

/// One completion call: fixed persona, ordered history, and the tools
/// the model may request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// The model to use
    pub model: String,
    /// The deployment persona, prepended per call and never stored in
    /// history
    pub system_prompt: String,
    /// The ordered conversation so far
    pub messages: Vec<Message>,
    /// Tools the model may request
    pub tools: Vec<ToolDefinition>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Optional temperature (0.0 to 1.0)
    pub temperature: Option<f32>,
}

/// What the model decided to do with a completion call.
#[derive(Debug, Clone)]
pub enum ModelResponse {
    /// A final textual reply; the turn is done.
    PlainReply {
        /// The reply text
        text: String,
    },
    /// A request to invoke one or more tools, possibly with
    /// explanatory text alongside.
    ToolCallRequest {
        /// Optional text emitted alongside the requests
        text: Option<String>,
        /// The requested tool invocations, in emitted order
        requests: Vec<ToolRequest>,
    },
}

/// Errors that can occur when communicating with the model provider.
///
/// Any of these means the model is unavailable for this turn; the
/// gateway performs no retries of its own.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// An API error occurred
    #[error("API error: {0}")]
    Api(String),
    /// A network error occurred
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    /// The response from the provider was not parseable
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

/// Trait for model gateway clients.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Sends a completion request and returns the model's decision.
    async fn complete(&self, request: CompletionRequest) -> Result<ModelResponse, ModelError>;
}

/// A builder for creating model clients.
#[derive(Debug, Default)]
pub struct ModelClientBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout: Option<std::time::Duration>,
}

impl ModelClientBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Creates an OpenAI-compatible client.
    pub fn build_openai(self) -> Result<Arc<dyn ModelClient>, ModelError> {
        Ok(Arc::new(OpenAiClient::new(
            self.api_key
                .or_else(|| std::env::var("OPENAI_API_KEY").ok())
                .ok_or_else(|| ModelError::Auth("OpenAI API key not provided".to_string()))?,
            self.base_url,
            self.timeout,
        )?))
    }
}
