//! OpenRouter chat-completions client.
//!
//! All models go through OpenRouter's OpenAI-compatible API; a single
//! [`OpenRouterClient`] is shared by every agent in the session. The
//! [`ModelInvoker`] trait is the seam the rest of the crate depends on, so
//! tests can script responses without a network.

use crate::error::AgentError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use superchat_core::stats::UsageRecord;

const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const REFERER: &str = "https://github.com/shukmeister/superchat";

/// Role of a wire-level chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat-completion message as sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Capability to run one chat completion against a model.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    /// Sends the message sequence to `model_id` and returns the reply text
    /// with the token usage of the call.
    async fn chat(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(String, UsageRecord), AgentError>;
}

/// reqwest-backed [`ModelInvoker`] for the OpenRouter API.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenRouterClient {
    /// Creates a client with the given API key against the production
    /// OpenRouter endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: OPENROUTER_BASE_URL.to_string(),
        }
    }

    /// Overrides the base URL (tests and self-hosted gateways).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ModelInvoker for OpenRouterClient {
    async fn chat(
        &self,
        model_id: &str,
        messages: &[ChatMessage],
    ) -> Result<(String, UsageRecord), AgentError> {
        let request = ChatCompletionRequest {
            model: model_id,
            messages,
        };

        tracing::debug!(model = model_id, messages = messages.len(), "chat request");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", REFERER)
            .header("X-Title", "superchat")
            .json(&request)
            .send()
            .await
            .map_err(|err| {
                if err.is_connect() || err.is_timeout() {
                    AgentError::Request(format!("OpenRouter unreachable: {err}"))
                } else {
                    AgentError::Request(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            let message = extract_error_message(&body);
            return Err(AgentError::from_http(status.as_u16(), message));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| AgentError::MalformedResponse(err.to_string()))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                AgentError::MalformedResponse("no content in completion response".to_string())
            })?;

        let usage = parsed
            .usage
            .map(|u| UsageRecord::new(u.prompt_tokens, u.completion_tokens))
            .unwrap_or_default();

        tracing::debug!(
            model = model_id,
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "chat response"
        );

        Ok((content, usage))
    }
}

/// Pulls the human-readable message out of an OpenRouter error body,
/// falling back to the raw body.
fn extract_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| wrapper.error.message)
        .unwrap_or_else(|_| body.to_string())
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<ResponseUsage>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ResponseUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}
