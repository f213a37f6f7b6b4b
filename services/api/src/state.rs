//! Shared Application State
//!
//! This module defines the `AppState` struct, which holds the shared,
//! clonable resources handed to every request handler.

use interviewer_core::interviewer::Interviewer;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub interviewer: Arc<Interviewer>,
}
