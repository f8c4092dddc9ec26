//! HTTP surface for webhook mode
//!
//! Receives Bot API updates on a token-scoped path and reports liveness.

mod handlers;
mod types;

pub use handlers::create_router;

use crate::controller::SharedController;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SharedController>,
    /// Secret path segment; only updates posted under it are accepted
    pub webhook_token: Arc<str>,
}

impl AppState {
    pub fn new(controller: Arc<SharedController>, webhook_token: &str) -> Self {
        Self {
            controller,
            webhook_token: Arc::from(webhook_token),
        }
    }
}
