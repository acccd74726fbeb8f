//! Conversation id → agent mapping.
//!
//! Each chat gets its own [`AasAgent`] behind an async mutex, so messages of
//! one chat are handled one at a time while different chats proceed
//! concurrently. The map lock itself is only held for lookups.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Mutex as AsyncMutex;
use tracing::info;

use super::AasAgent;

pub type SessionHandle = Arc<AsyncMutex<AasAgent>>;

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, SessionHandle>> {
        self.sessions.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// The session for `key`, if the chat has one.
    pub fn get(&self, key: &str) -> Option<SessionHandle> {
        self.map().get(key).cloned()
    }

    /// The session for `key`, created empty on first use.
    pub fn get_or_create(&self, key: &str) -> SessionHandle {
        let mut map = self.map();
        if let Some(handle) = map.get(key) {
            return handle.clone();
        }
        info!(session = %key, "session created");
        let handle: SessionHandle = Arc::new(AsyncMutex::new(AasAgent::new()));
        map.insert(key.to_string(), handle.clone());
        handle
    }

    /// Drop the session for `key`. Returns whether one existed.
    ///
    /// A turn already running on the old session finishes against it; the
    /// next message starts fresh.
    pub fn reset(&self, key: &str) -> bool {
        let mut map = self.map();
        let removed = map.remove(key).is_some();
        if removed {
            info!(session = %key, remaining = map.len(), "session reset");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }
}
