//! In-memory conversation state, keyed by session
//!
//! State lives only for the lifetime of the process. Each key is read,
//! transitioned and written back under one lock so concurrent delivery of
//! events for the same session cannot lose an update.

use crate::state_machine::{ConvState, Conversation};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Identifies one user's conversation in one chat
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub chat_id: i64,
    pub user_id: i64,
}

impl SessionKey {
    pub fn new(chat_id: i64, user_id: i64) -> Self {
        Self { chat_id, user_id }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.chat_id, self.user_id)
    }
}

/// Storage for conversation state
pub trait StateStore: Send + Sync {
    /// Current state for a session (`Idle` when absent)
    #[cfg(test)]
    fn load(&self, key: SessionKey) -> ConvState;

    /// Replace the session's state with whatever `apply` returns.
    ///
    /// `apply` runs while the store holds the key, so it must not block.
    fn transact(&self, key: SessionKey, apply: &mut dyn FnMut(&ConvState) -> ConvState);

    /// Number of sessions with a form in progress
    fn active(&self) -> usize;
}

/// Process-resident store. Idle sessions take no space.
#[derive(Debug, Default)]
pub struct InMemoryStateStore {
    conversations: Mutex<HashMap<SessionKey, Conversation>>,
}

impl InMemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for InMemoryStateStore {
    #[cfg(test)]
    fn load(&self, key: SessionKey) -> ConvState {
        let conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        conversations
            .get(&key)
            .cloned()
            .map_or(ConvState::Idle, ConvState::Collecting)
    }

    fn transact(&self, key: SessionKey, apply: &mut dyn FnMut(&ConvState) -> ConvState) {
        let mut conversations = self
            .conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let current = conversations
            .get(&key)
            .cloned()
            .map_or(ConvState::Idle, ConvState::Collecting);

        match apply(&current) {
            ConvState::Idle => {
                conversations.remove(&key);
            }
            ConvState::Collecting(conv) => {
                conversations.insert(key, conv);
            }
        }
    }

    fn active(&self) -> usize {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

// ============================================================================
// Arc implementations for trait objects
// ============================================================================

impl<T: StateStore + ?Sized> StateStore for Arc<T> {
    #[cfg(test)]
    fn load(&self, key: SessionKey) -> ConvState {
        (**self).load(key)
    }

    fn transact(&self, key: SessionKey, apply: &mut dyn FnMut(&ConvState) -> ConvState) {
        (**self).transact(key, apply);
    }

    fn active(&self) -> usize {
        (**self).active()
    }
}
