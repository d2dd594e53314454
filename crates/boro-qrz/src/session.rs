//! Shared session key storage.

use std::sync::{PoisonError, RwLock};

use boro_core::SessionKey;

/// Holds the current session key for a client.
///
/// Every access takes the lock just long enough to clone or swap the key.
/// Callers copy the key out before making a request, so no guard is ever
/// held across network I/O.
#[derive(Default)]
pub struct SessionStore {
    key: RwLock<Option<SessionKey>>,
}

impl SessionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current key, if authenticated.
    pub fn get(&self) -> Option<SessionKey> {
        // A writer cannot panic mid-swap, so a poisoned value is still whole.
        self.key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the current key.
    pub fn set(&self, key: SessionKey) {
        *self.key.write().unwrap_or_else(PoisonError::into_inner) = Some(key);
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.get().is_some())
            .finish()
    }
}
