//! Mock Interview Core
//!
//! Provider-agnostic logic for the AI mock interviewer: transcripts and their
//! in-memory store, the chat provider abstraction, simulated lip-sync, and the
//! orchestrator that ties one conversational turn together.

pub mod catalog;
pub mod interviewer;
pub mod llm_client;
pub mod session_store;
pub mod transcript;
pub mod viseme;
