//! Static catalog of chat models known to work with the interviewer.

use serde::Serialize;
use utoipa::ToSchema;

/// Model used when neither the request nor the configuration names one.
pub const FALLBACK_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
pub struct ModelInfo {
    #[schema(example = "llama-3.3-70b-versatile")]
    pub id: String,
    pub name: String,
    pub description: String,
    #[schema(example = "fast")]
    pub speed: String,
}

impl ModelInfo {
    fn new(id: &str, name: &str, description: &str, speed: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            speed: speed.to_string(),
        }
    }
}

#[derive(Serialize, ToSchema, Debug, Clone)]
pub struct ModelCatalog {
    /// The model a request without an explicit choice will use.
    pub current: String,
    pub available: Vec<ModelInfo>,
    pub usage: String,
}

pub fn available_models() -> Vec<ModelInfo> {
    vec![
        ModelInfo::new(
            "llama-3.3-70b-versatile",
            "Llama 3.3 70B Versatile",
            "Most capable option, best question quality and feedback",
            "fast",
        ),
        ModelInfo::new(
            "llama-3.1-8b-instant",
            "Llama 3.1 8B Instant",
            "Lightweight model with the lowest latency",
            "very fast",
        ),
        ModelInfo::new(
            "meta-llama/llama-4-scout-17b-16e-instruct",
            "Llama 4 Scout 17B",
            "Newer mixture-of-experts model with a long context window",
            "fast",
        ),
        ModelInfo::new(
            "gemma2-9b-it",
            "Gemma 2 9B",
            "Compact instruction-tuned model from Google",
            "very fast",
        ),
    ]
}

/// Builds the catalog with `current` marked as the active default.
pub fn catalog(current: &str) -> ModelCatalog {
    ModelCatalog {
        current: current.to_string(),
        available: available_models(),
        usage: "Add ?model=<id> to POST /interview/chat, send \"model\" in the body, \
                or set GROQ_MODEL to change the default."
            .to_string(),
    }
}
