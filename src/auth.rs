use std::sync::{Arc, PoisonError, RwLock};

/// Shared holder for the current session bearer token.
///
/// Both the REST [`Client`](crate::rest::Client) and the WebSocket
/// [`ConnectionManager`](crate::websocket::ConnectionManager) read the
/// credential from here at request/connect time, so a login performed
/// through the REST client is immediately visible to the real-time side.
/// Clones share the same underlying slot.
///
/// The store is injected explicitly rather than read from any ambient
/// state, which lets tests substitute a fake credential source.
#[derive(Clone, Debug, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl TokenStore {
    /// Creates an empty store (no active session).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        let store = Self::new();
        store.set(token);
        store
    }

    /// Replaces the current token.
    pub fn set(&self, token: impl Into<String>) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(token.into());
    }

    /// Drops the current token, e.g. after a 401 response or logout.
    pub fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }

    /// Returns a copy of the current token, if any.
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_clear() {
        let store = TokenStore::new();
        assert!(!store.is_authenticated());
        assert_eq!(store.get(), None);

        store.set("abc123");
        assert!(store.is_authenticated());
        assert_eq!(store.get(), Some("abc123".to_string()));

        store.clear();
        assert!(!store.is_authenticated());
        assert_eq!(store.get(), None);
    }

    #[test]
    fn test_clones_share_state() {
        let store = TokenStore::with_token("original");
        let clone = store.clone();

        clone.set("replaced");
        assert_eq!(store.get(), Some("replaced".to_string()));

        store.clear();
        assert_eq!(clone.get(), None);
    }
}
