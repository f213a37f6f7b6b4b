use crate::transcript::Turn;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Everything needed for one chat-completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub model: String,
    pub turns: Vec<Turn>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// The provider's answer to a [`ChatRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    /// Raw content of the first choice, exactly as returned.
    pub content: String,
    /// The model the provider reports having used, if any.
    pub model: Option<String>,
}

/// A chat-completion backend.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Makes a single, non-streaming completion call asking for a JSON object.
    ///
    /// Any transport problem or non-success status is returned as an error;
    /// no retries are attempted.
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion>;
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    #[serde(default)]
    content: Option<String>,
}

/// An implementation of `ChatProvider` for any OpenAI-compatible API (Groq by default).
pub struct OpenAICompatibleClient {
    http: reqwest::Client,
    api_base: String,
    api_key: String,
}

impl OpenAICompatibleClient {
    /// Creates a new client for an OpenAI-compatible service.
    ///
    /// # Arguments
    ///
    /// * `api_base` - Base URL up to (not including) `/chat/completions`,
    ///   e.g. `https://api.groq.com/openai/v1`.
    /// * `api_key` - Bearer credential sent with every request.
    pub fn new(api_base: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            api_key: api_key.into(),
        }
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatProvider for OpenAICompatibleClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion> {
        let body = CompletionBody {
            model: &request.model,
            messages: &request.turns,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach chat completion provider")?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            bail!("Provider responded with status {}: {}", status, detail);
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .context("Failed to decode provider response")?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .context("No response choice from provider")?
            .message
            .content
            .context("No content in provider response")?;

        Ok(ChatCompletion {
            content,
            model: parsed.model.filter(|m| !m.is_empty()),
        })
    }
}
