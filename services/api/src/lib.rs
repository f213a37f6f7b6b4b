//! Mock Interview API Library Crate
//!
//! This library contains the HTTP side of the mock interview service:
//! configuration, application state, request/response models, handlers and
//! routing. The `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
