//! Interviewer Orchestrator
//!
//! Drives one conversational turn of a mock interview: records the candidate's
//! utterance, asks the chat provider for the interviewer's structured reply,
//! records that reply, and turns it into a presentation payload for the
//! avatar (text, facial expression, animation and a simulated lip-sync track).

use crate::{
    catalog::{self, FALLBACK_MODEL, ModelCatalog},
    llm_client::{ChatProvider, ChatRequest},
    session_store::SessionStore,
    transcript::Role,
    viseme::{self, LipSync},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;

/// Session used when the caller does not name one.
pub const DEFAULT_SESSION_ID: &str = "default";

/// Stand-in user turn for an empty or missing message.
pub const GREETING: &str = "Hi, I'd like to start a mock interview session.";

pub const TEMPERATURE: f32 = 0.6;
pub const MAX_TOKENS: u32 = 1024;

const UNCONFIGURED_TEXT: &str = "The AI interviewer isn't set up yet. \
Ask the administrator to configure GROQ_API_KEY on the server, then try again.";
const PROVIDER_FAILURE_TEXT: &str =
    "Sorry, I'm having trouble reaching the interview service right now. Please try again in a moment.";
const PROVIDER_FAILURE_ERROR: &str = "Failed to get a response from the interview model";

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum FacialExpression {
    Smile,
    #[default]
    Default,
    FunnyFace,
    Sad,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Animation {
    #[serde(rename = "Talking_0")]
    Talking0,
    #[default]
    #[serde(rename = "Talking_1")]
    Talking1,
    #[serde(rename = "Talking_2")]
    Talking2,
    Idle,
}

/// One message for the avatar to present.
#[derive(Serialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReplyMessage {
    pub text: String,
    /// Always empty; speech is synthesized in the browser.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lipsync: Option<LipSync>,
    pub facial_expression: FacialExpression,
    pub animation: Animation,
}

impl ReplyMessage {
    /// A canned, non-animated notice used when no real reply is available.
    fn notice(text: &str) -> Self {
        Self {
            text: text.to_string(),
            audio: None,
            lipsync: None,
            facial_expression: FacialExpression::Sad,
            animation: Animation::Idle,
        }
    }
}

/// The interviewer's reply after interpretation of the provider payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedReply {
    pub text: String,
    pub facial_expression: FacialExpression,
    pub animation: Animation,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StructuredReply {
    text: String,
    #[serde(default)]
    facial_expression: Option<serde_json::Value>,
    #[serde(default)]
    animation: Option<serde_json::Value>,
}

/// Interprets the provider's raw content.
///
/// A JSON object with a string `text` is taken at its word, with unknown or
/// missing presentation hints replaced by defaults. Anything else is wrapped
/// verbatim as the reply text.
pub fn parse_reply(raw: &str) -> ParsedReply {
    match serde_json::from_str::<StructuredReply>(raw.trim()) {
        Ok(reply) => ParsedReply {
            text: reply.text,
            facial_expression: reply
                .facial_expression
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
            animation: reply
                .animation
                .and_then(|v| serde_json::from_value(v).ok())
                .unwrap_or_default(),
        },
        Err(err) => {
            debug!(error = %err, "Provider reply is not a structured object; wrapping raw text");
            ParsedReply {
                text: raw.to_string(),
                facial_expression: FacialExpression::default(),
                animation: Animation::default(),
            }
        }
    }
}

/// Input for a single chat turn.
#[derive(Debug, Clone, Default)]
pub struct ChatInput {
    pub message: Option<String>,
    pub session_id: Option<String>,
    /// Explicitly requested model; overrides the configured default.
    pub model: Option<String>,
}

/// The result of a chat turn. Every variant carries a presentable message.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatOutcome {
    /// The provider answered.
    Reply { message: ReplyMessage, model: String },
    /// No provider credential is configured.
    Unconfigured { message: ReplyMessage, model: String },
    /// The provider call failed.
    ProviderFailed { message: ReplyMessage, error: String },
}

impl ChatOutcome {
    pub fn message(&self) -> &ReplyMessage {
        match self {
            ChatOutcome::Reply { message, .. }
            | ChatOutcome::Unconfigured { message, .. }
            | ChatOutcome::ProviderFailed { message, .. } => message,
        }
    }
}

/// Turn-taking handler for mock interviews.
pub struct Interviewer {
    provider: Option<Arc<dyn ChatProvider>>,
    sessions: Arc<SessionStore>,
    default_model: Option<String>,
}

impl Interviewer {
    /// Creates an interviewer.
    ///
    /// # Arguments
    ///
    /// * `provider` - The completion backend, or `None` when no credential is configured.
    /// * `sessions` - The transcript store shared with the rest of the service.
    /// * `default_model` - Configured model override, used when a request names none.
    pub fn new(
        provider: Option<Arc<dyn ChatProvider>>,
        sessions: Arc<SessionStore>,
        default_model: Option<String>,
    ) -> Self {
        Self {
            provider,
            sessions,
            default_model: default_model.filter(|m| !m.trim().is_empty()),
        }
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Picks the model for a request: explicit choice, then configured default,
    /// then [`FALLBACK_MODEL`].
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        requested
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .or(self.default_model.as_deref())
            .unwrap_or(FALLBACK_MODEL)
            .to_string()
    }

    pub fn list_models(&self) -> ModelCatalog {
        catalog::catalog(&self.resolve_model(None))
    }

    /// Forgets a session's transcript. Succeeds whether or not it existed.
    pub async fn reset_session(&self, session_id: Option<&str>) -> String {
        let session_id = resolve_session_id(session_id);
        let existed = self.sessions.reset(&session_id).await;
        info!(%session_id, existed, "Interview session reset");
        session_id
    }

    /// Runs one interview turn.
    ///
    /// The session's transcript stays locked for the whole turn, so concurrent
    /// turns on the same session are applied one after another.
    #[instrument(name = "interview_turn", skip_all, fields(session_id, model))]
    pub async fn chat(&self, input: ChatInput) -> ChatOutcome {
        let model = self.resolve_model(input.model.as_deref());
        let session_id = resolve_session_id(input.session_id.as_deref());
        tracing::Span::current().record("session_id", session_id.as_str());
        tracing::Span::current().record("model", model.as_str());

        let Some(provider) = &self.provider else {
            warn!("No chat provider configured; returning setup notice.");
            return ChatOutcome::Unconfigured {
                message: ReplyMessage::notice(UNCONFIGURED_TEXT),
                model,
            };
        };

        let user_text = match input.message {
            Some(message) if !message.trim().is_empty() => message,
            _ => GREETING.to_string(),
        };

        let handle = self.sessions.handle(&session_id).await;
        let mut transcript = handle.lock().await;
        transcript.push(Role::User, user_text);

        let request = ChatRequest {
            model: model.clone(),
            turns: transcript.turns().to_vec(),
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let outcome = match provider.complete(request).await {
            Ok(completion) => {
                let parsed = parse_reply(&completion.content);
                transcript.push(Role::Assistant, completion.content);
                let lipsync = viseme::synthesize(&parsed.text);
                info!(
                    turns = transcript.len(),
                    cues = lipsync.mouth_cues.len(),
                    "Interviewer replied"
                );
                ChatOutcome::Reply {
                    message: ReplyMessage {
                        text: parsed.text,
                        audio: Some(String::new()),
                        lipsync: Some(lipsync),
                        facial_expression: parsed.facial_expression,
                        animation: parsed.animation,
                    },
                    model: completion.model.unwrap_or(model),
                }
            }
            Err(err) => {
                error!(error = ?err, "Chat provider call failed");
                ChatOutcome::ProviderFailed {
                    message: ReplyMessage::notice(PROVIDER_FAILURE_TEXT),
                    error: PROVIDER_FAILURE_ERROR.to_string(),
                }
            }
        };

        if transcript.truncate_to(self.sessions.max_turns()) {
            debug!(turns = transcript.len(), "Transcript truncated");
        }
        outcome
    }
}

fn resolve_session_id(session_id: Option<&str>) -> String {
    session_id
        .filter(|id| !id.is_empty())
        .unwrap_or(DEFAULT_SESSION_ID)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::{ChatCompletion, MockChatProvider};
    use crate::transcript::SYSTEM_INSTRUCTION;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::time::Duration;

    fn interviewer_with(mock: MockChatProvider, default_model: Option<&str>) -> Interviewer {
        Interviewer::new(
            Some(Arc::new(mock)),
            Arc::new(SessionStore::default()),
            default_model.map(str::to_string),
        )
    }

    fn input(message: Option<&str>, session_id: &str) -> ChatInput {
        ChatInput {
            message: message.map(str::to_string),
            session_id: Some(session_id.to_string()),
            model: None,
        }
    }

    const STRUCTURED: &str =
        r#"{"text":"Tell me about a hard bug you fixed.","facialExpression":"smile","animation":"Talking_2"}"#;

    #[test]
    fn test_parse_structured_reply() {
        let parsed = parse_reply(STRUCTURED);
        assert_eq!(parsed.text, "Tell me about a hard bug you fixed.");
        assert_eq!(parsed.facial_expression, FacialExpression::Smile);
        assert_eq!(parsed.animation, Animation::Talking2);
    }

    #[test]
    fn test_parse_plain_text_is_wrapped() {
        let parsed = parse_reply("Good job!");
        assert_eq!(parsed.text, "Good job!");
        assert_eq!(parsed.facial_expression, FacialExpression::Default);
        assert_eq!(parsed.animation, Animation::Talking1);
    }

    #[test]
    fn test_parse_unknown_hints_fall_back() {
        let parsed = parse_reply(r#"{"text":"Hmm.","facialExpression":"angry","animation":7}"#);
        assert_eq!(parsed.text, "Hmm.");
        assert_eq!(parsed.facial_expression, FacialExpression::Default);
        assert_eq!(parsed.animation, Animation::Talking1);
    }

    #[test]
    fn test_parse_object_without_text_is_wrapped() {
        let raw = r#"{"message":"no text field"}"#;
        assert_eq!(parse_reply(raw).text, raw);
    }

    #[test]
    fn test_reply_message_wire_names() {
        let message = ReplyMessage {
            text: "Hello".to_string(),
            audio: Some(String::new()),
            lipsync: None,
            facial_expression: FacialExpression::FunnyFace,
            animation: Animation::Talking0,
        };
        let json = serde_json::to_value(&message).unwrap();
        assert_eq!(json["facialExpression"], "funnyFace");
        assert_eq!(json["animation"], "Talking_0");
        assert_eq!(json["audio"], "");
        assert!(json.get("lipsync").is_none());
    }

    #[test]
    fn test_model_precedence() {
        let configured = interviewer_with(MockChatProvider::new(), Some("llama-3.1-8b-instant"));
        assert_eq!(configured.resolve_model(Some("gemma2-9b-it")), "gemma2-9b-it");
        assert_eq!(configured.resolve_model(None), "llama-3.1-8b-instant");
        assert_eq!(configured.resolve_model(Some("  ")), "llama-3.1-8b-instant");

        let bare = interviewer_with(MockChatProvider::new(), None);
        assert_eq!(bare.resolve_model(None), FALLBACK_MODEL);
        assert_eq!(bare.list_models().current, FALLBACK_MODEL);
    }

    #[tokio::test]
    async fn test_chat_structured_reply() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .withf(|req| {
                req.model == "gemma2-9b-it"
                    && req.turns.len() == 2
                    && req.turns[0].content == SYSTEM_INSTRUCTION
                    && req.turns[1].content == "I'm ready."
                    && req.max_tokens == MAX_TOKENS
                    && req.temperature == TEMPERATURE
            })
            .times(1)
            .returning(|_| {
                Ok(ChatCompletion {
                    content: STRUCTURED.to_string(),
                    model: Some("gemma2-9b-it".to_string()),
                })
            });
        let interviewer = interviewer_with(mock, None);

        let outcome = interviewer
            .chat(ChatInput {
                message: Some("I'm ready.".to_string()),
                session_id: Some("s1".to_string()),
                model: Some("gemma2-9b-it".to_string()),
            })
            .await;

        let ChatOutcome::Reply { message, model } = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(model, "gemma2-9b-it");
        assert_eq!(message.text, "Tell me about a hard bug you fixed.");
        assert_eq!(message.audio.as_deref(), Some(""));
        assert!(!message.lipsync.unwrap().is_empty());

        let transcript = interviewer.sessions().get_or_create("s1").await;
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript.turns()[2].role, Role::Assistant);
        assert_eq!(transcript.turns()[2].content, STRUCTURED);
    }

    #[tokio::test]
    async fn test_chat_empty_message_uses_greeting() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .withf(|req| req.turns.last().map(|t| t.content.as_str()) == Some(GREETING))
            .times(2)
            .returning(|_| {
                Ok(ChatCompletion {
                    content: STRUCTURED.to_string(),
                    model: None,
                })
            });
        let interviewer = interviewer_with(mock, None);

        interviewer.chat(input(None, "greet")).await;
        interviewer.chat(input(Some("   "), "greet")).await;

        let transcript = interviewer.sessions().get_or_create("greet").await;
        assert_eq!(transcript.turns()[1].content, GREETING);
        assert_eq!(transcript.turns()[3].content, GREETING);
    }

    #[tokio::test]
    async fn test_chat_defaults_session_and_reports_requested_model() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().returning(|_| {
            Ok(ChatCompletion {
                content: "Good job!".to_string(),
                model: None,
            })
        });
        let interviewer = interviewer_with(mock, Some("llama-3.1-8b-instant"));

        let outcome = interviewer.chat(ChatInput::default()).await;

        let ChatOutcome::Reply { message, model } = outcome else {
            panic!("expected a reply");
        };
        assert_eq!(model, "llama-3.1-8b-instant");
        assert_eq!(message.text, "Good job!");
        assert_eq!(message.facial_expression, FacialExpression::Default);
        assert_eq!(message.animation, Animation::Talking1);
        assert_eq!(
            interviewer.sessions().get_or_create(DEFAULT_SESSION_ID).await.len(),
            3
        );
    }

    #[tokio::test]
    async fn test_chat_without_provider_is_degraded() {
        let interviewer = Interviewer::new(None, Arc::new(SessionStore::default()), None);
        assert!(!interviewer.is_configured());

        let outcome = interviewer.chat(input(Some("hi"), "nokey")).await;

        let ChatOutcome::Unconfigured { message, model } = outcome else {
            panic!("expected the unconfigured notice");
        };
        assert_eq!(model, FALLBACK_MODEL);
        assert_eq!(message.facial_expression, FacialExpression::Sad);
        assert_eq!(message.animation, Animation::Idle);
        assert!(interviewer.sessions().is_empty().await);
    }

    #[tokio::test]
    async fn test_chat_provider_failure_keeps_user_turn() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .returning(|_| Err(anyhow!("Provider responded with status 503")));
        let interviewer = interviewer_with(mock, None);

        let outcome = interviewer.chat(input(Some("hello?"), "down")).await;

        let ChatOutcome::ProviderFailed { message, error } = &outcome else {
            panic!("expected a provider failure");
        };
        assert!(!error.is_empty());
        assert_eq!(message.animation, Animation::Idle);
        assert_eq!(outcome.message().facial_expression, FacialExpression::Sad);

        let transcript = interviewer.sessions().get_or_create("down").await;
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.last().unwrap().content, "hello?");
    }

    #[tokio::test]
    async fn test_twenty_five_turns_truncate_to_twenty_one() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().times(25).returning(|_| {
            Ok(ChatCompletion {
                content: STRUCTURED.to_string(),
                model: None,
            })
        });
        let interviewer = interviewer_with(mock, None);

        for i in 0..25 {
            interviewer
                .chat(input(Some(&format!("answer {}", i)), "long"))
                .await;
            let transcript = interviewer.sessions().get_or_create("long").await;
            assert!(transcript.len() <= 21);
            assert_eq!(transcript.turns()[0].content, SYSTEM_INSTRUCTION);
        }

        let transcript = interviewer.sessions().get_or_create("long").await;
        assert_eq!(transcript.len(), 21);
        assert_eq!(transcript.turns()[19].content, "answer 24");
    }

    #[tokio::test]
    async fn test_repeated_failures_still_truncate() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete()
            .returning(|_| Err(anyhow!("connection refused")));
        let interviewer = interviewer_with(mock, None);

        for _ in 0..30 {
            interviewer.chat(input(Some("anyone there?"), "flaky")).await;
        }

        assert_eq!(interviewer.sessions().get_or_create("flaky").await.len(), 21);
    }

    #[tokio::test]
    async fn test_reset_session_is_idempotent() {
        let mut mock = MockChatProvider::new();
        mock.expect_complete().returning(|_| {
            Ok(ChatCompletion {
                content: STRUCTURED.to_string(),
                model: None,
            })
        });
        let interviewer = interviewer_with(mock, None);
        interviewer.chat(input(Some("hi"), "r")).await;

        assert_eq!(interviewer.reset_session(Some("r")).await, "r");
        assert_eq!(interviewer.reset_session(Some("r")).await, "r");
        assert_eq!(interviewer.reset_session(None).await, DEFAULT_SESSION_ID);
        assert_eq!(interviewer.sessions().get_or_create("r").await.len(), 1);
    }

    struct SlowEcho;

    #[async_trait]
    impl ChatProvider for SlowEcho {
        async fn complete(&self, request: ChatRequest) -> anyhow::Result<ChatCompletion> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let last = request.turns.last().map(|t| t.content.clone()).unwrap_or_default();
            Ok(ChatCompletion {
                content: format!("reply to {}", last),
                model: None,
            })
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_turns_on_one_session_serialize() {
        let interviewer = Arc::new(Interviewer::new(
            Some(Arc::new(SlowEcho)),
            Arc::new(SessionStore::default()),
            None,
        ));

        let tasks: Vec<_> = (0..5)
            .map(|i| {
                let interviewer = interviewer.clone();
                tokio::spawn(async move {
                    interviewer
                        .chat(input(Some(&format!("msg {}", i)), "shared"))
                        .await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        let transcript = interviewer.sessions().get_or_create("shared").await;
        assert_eq!(transcript.len(), 11);
        for pair in transcript.turns()[1..].chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
            assert_eq!(pair[1].content, format!("reply to {}", pair[0].content));
        }
    }
}
