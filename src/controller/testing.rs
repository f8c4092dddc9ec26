//! Mock implementations for testing

use super::traits::Messenger;
use crate::state_machine::OutboundMessage;
use crate::telegram::TelegramError;
use async_trait::async_trait;
use std::sync::Mutex;

/// Messenger that records every call instead of talking to the network
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(i64, OutboundMessage)>>,
    acknowledged: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records calls but reports every delivery as failed
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<(i64, OutboundMessage)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send(&self, chat_id: i64, message: &OutboundMessage) -> Result<(), TelegramError> {
        self.sent.lock().unwrap().push((chat_id, message.clone()));
        if self.fail {
            return Err(TelegramError::network("mock delivery failure"));
        }
        Ok(())
    }

    async fn acknowledge(&self, callback_id: &str) -> Result<(), TelegramError> {
        self.acknowledged.lock().unwrap().push(callback_id.to_string());
        if self.fail {
            return Err(TelegramError::network("mock delivery failure"));
        }
        Ok(())
    }
}
