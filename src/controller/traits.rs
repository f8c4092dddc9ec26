//! Trait abstractions for outbound I/O
//!
//! The controller only talks to the chat platform through `Messenger`, so
//! tests can swap in a recording mock.

use crate::state_machine::OutboundMessage;
use crate::telegram::TelegramError;
use async_trait::async_trait;
use std::sync::Arc;

/// Delivers replies to a chat
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send one message, with its keyboard if any
    async fn send(&self, chat_id: i64, message: &OutboundMessage) -> Result<(), TelegramError>;

    /// Answer a button press so the client stops its spinner
    async fn acknowledge(&self, callback_id: &str) -> Result<(), TelegramError>;
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

#[async_trait]
impl<T: Messenger + ?Sized> Messenger for Arc<T> {
    async fn send(&self, chat_id: i64, message: &OutboundMessage) -> Result<(), TelegramError> {
        (**self).send(chat_id, message).await
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TelegramError> {
        (**self).acknowledge(callback_id).await
    }
}
