//! API Request and Response Models
//!
//! JSON bodies exchanged over HTTP, annotated with `utoipa` for the OpenAPI
//! document. Field names follow the camelCase convention of the browser client.

use interviewer_core::interviewer::{ChatInput, ReplyMessage};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ChatPayload {
    #[schema(example = "I have five years of backend experience.")]
    pub message: Option<String>,
    #[schema(example = "candidate-42")]
    pub session_id: Option<String>,
    #[schema(example = "llama-3.3-70b-versatile")]
    pub model: Option<String>,
}

impl ChatPayload {
    /// Merges the body with the query-string model. A model named in the body wins;
    /// a blank one counts as absent.
    pub fn into_input(self, query_model: Option<String>) -> ChatInput {
        let named = |m: &String| !m.trim().is_empty();
        ChatInput {
            message: self.message,
            session_id: self.session_id,
            model: self.model.filter(named).or(query_model.filter(named)),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct ModelQuery {
    pub model: Option<String>,
}

#[derive(Deserialize, ToSchema, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResetPayload {
    #[schema(example = "candidate-42")]
    pub session_id: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ChatResponse {
    pub messages: Vec<ReplyMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct ResetResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Serialize, ToSchema, Debug)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Whether a provider credential is configured.
    pub provider_configured: bool,
    /// Number of live interview sessions.
    pub sessions: usize,
}
