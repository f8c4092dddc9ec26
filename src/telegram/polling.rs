//! Long-polling receive loop
//!
//! Used when no public webhook host is configured. Updates in one batch are
//! handled in order before the next `getUpdates` call acknowledges them.

use super::client::TelegramClient;
use super::error::TelegramError;
use super::types::Update;
use crate::controller::{Controller, Messenger};
use crate::store::StateStore;
use async_trait::async_trait;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Source of update batches
#[async_trait]
pub trait UpdateSource: Send + Sync {
    /// Wait for updates with `update_id >= offset`
    async fn fetch(&self, offset: i64) -> Result<Vec<Update>, TelegramError>;
}

#[async_trait]
impl UpdateSource for TelegramClient {
    async fn fetch(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
        self.get_updates(offset).await
    }
}

/// Poll until `cancel` fires, feeding every update to the controller.
///
/// Fetch failures never end the loop; they back off and try again.
pub async fn run_polling<U, S, M>(source: &U, controller: &Controller<S, M>, cancel: CancellationToken)
where
    U: UpdateSource + ?Sized,
    S: StateStore,
    M: Messenger,
{
    let mut offset = 0;
    let mut failures: u32 = 0;

    tracing::info!("Polling for updates");
    loop {
        let batch = tokio::select! {
            result = source.fetch(offset) => result,
            () = cancel.cancelled() => break,
        };

        match batch {
            Ok(updates) => {
                failures = 0;
                offset = next_offset(offset, &updates);
                for update in updates {
                    controller.handle_update(update).await;
                }
            }
            Err(e) => {
                failures = failures.saturating_add(1);
                let delay = e.retry_after.unwrap_or_else(|| retry_delay(failures));
                tracing::warn!(
                    error = %e,
                    attempt = failures,
                    delay_secs = delay.as_secs(),
                    "getUpdates failed, retrying"
                );
                tokio::select! {
                    () = tokio::time::sleep(delay) => {}
                    () = cancel.cancelled() => break,
                }
            }
        }
    }
    tracing::info!("Polling stopped");
}

/// Offset that acknowledges everything in `updates`
fn next_offset(current: i64, updates: &[Update]) -> i64 {
    updates
        .iter()
        .map(|u| u.update_id + 1)
        .max()
        .map_or(current, |next| next.max(current))
}

fn retry_delay(attempt: u32) -> Duration {
    // Exponential backoff: 1s, 2s, 4s ... capped
    let secs = 1u64.checked_shl(attempt.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_secs(secs).min(MAX_RETRY_DELAY)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::RecordingMessenger;
    use crate::store::{InMemoryStateStore, SessionKey};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn update(id: i64, text: &str) -> Update {
        serde_json::from_value(json!({
            "update_id": id,
            "message": {
                "message_id": id,
                "chat": { "id": 9 },
                "from": { "id": 9 },
                "text": text
            }
        }))
        .unwrap()
    }

    /// Serves queued batches, then cancels once the queue is empty
    struct ScriptedSource {
        batches: Mutex<VecDeque<Result<Vec<Update>, TelegramError>>>,
        offsets: Mutex<Vec<i64>>,
        cancel: CancellationToken,
    }

    #[async_trait]
    impl UpdateSource for ScriptedSource {
        async fn fetch(&self, offset: i64) -> Result<Vec<Update>, TelegramError> {
            self.offsets.lock().unwrap().push(offset);
            let next = self.batches.lock().unwrap().pop_front();
            if let Some(batch) = next {
                return batch;
            }
            self.cancel.cancel();
            std::future::pending().await
        }
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        assert_eq!(retry_delay(1), Duration::from_secs(1));
        assert_eq!(retry_delay(2), Duration::from_secs(2));
        assert_eq!(retry_delay(5), Duration::from_secs(16));
        assert_eq!(retry_delay(6), MAX_RETRY_DELAY);
        assert_eq!(retry_delay(200), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_next_offset() {
        assert_eq!(next_offset(0, &[]), 0);
        assert_eq!(next_offset(5, &[]), 5);
        assert_eq!(next_offset(0, &[update(10, "a"), update(12, "b")]), 13);
    }

    #[tokio::test]
    async fn test_loop_handles_batches_and_recovers_from_errors() {
        let cancel = CancellationToken::new();
        let source = ScriptedSource {
            batches: Mutex::new(VecDeque::from([
                Ok(vec![update(1, "/start")]),
                Err(TelegramError::network("connection reset")),
                Ok(vec![update(2, "2,5")]),
            ])),
            offsets: Mutex::new(Vec::new()),
            cancel: cancel.clone(),
        };
        let messenger = Arc::new(RecordingMessenger::new());
        let controller = Controller::new(InMemoryStateStore::new(), Arc::clone(&messenger));

        run_polling(&source, &controller, cancel).await;

        assert_eq!(*source.offsets.lock().unwrap(), [0, 2, 2, 3]);
        assert_eq!(messenger.sent().len(), 2);
        let state = controller.store().load(SessionKey::new(9, 9));
        assert_eq!(state.conversation().unwrap().collected.len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let source = ScriptedSource {
            batches: Mutex::new(VecDeque::new()),
            offsets: Mutex::new(Vec::new()),
            cancel: cancel.clone(),
        };
        let controller = Controller::new(InMemoryStateStore::new(), Arc::new(RecordingMessenger::new()));

        run_polling(&source, &controller, cancel).await;
        assert_eq!(controller.store().active(), 0);
    }
}
