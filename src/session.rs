//! Session management for the web interface
//!
//! In-memory storage mapping session tokens to the logged-in username.
//! Sessions are ephemeral and lost on server restart.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;
use uuid::Uuid;

/// Session token (UUID stored in cookie)
pub type SessionToken = String;

/// In-memory session store, cheap to clone and shared by all requests
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<SessionToken, String>>>,
}

impl SessionStore {
    /// Create a new empty session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new session for `username`
    ///
    /// # Returns
    /// The session token to be stored in a cookie
    pub async fn create_session(&self, username: &str) -> SessionToken {
        let token = Uuid::new_v4().to_string();
        let mut sessions = self.sessions.write().await;
        sessions.insert(token.clone(), username.to_string());
        token
    }

    /// Username for a session token, if the session exists
    pub async fn get_user(&self, token: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions.get(token).cloned()
    }

    /// Destroy a session
    pub async fn destroy_session(&self, token: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(token);
    }

    /// Get the number of active sessions
    pub async fn session_count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_and_lookup_session() {
        let store = SessionStore::new();
        let token = store.create_session("admin").await;

        assert_eq!(store.get_user(&token).await.as_deref(), Some("admin"));
        assert_eq!(store.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_tokens_are_unique() {
        let store = SessionStore::new();
        let first = store.create_session("admin").await;
        let second = store.create_session("admin").await;

        assert_ne!(first, second);
        assert_eq!(store.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_destroy_session() {
        let store = SessionStore::new();
        let token = store.create_session("admin").await;

        store.destroy_session(&token).await;
        assert!(store.get_user(&token).await.is_none());

        // Destroying twice is harmless
        store.destroy_session(&token).await;
        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn test_clones_share_sessions() {
        let store = SessionStore::new();
        let clone = store.clone();
        let token = clone.create_session("admin").await;

        assert!(store.get_user(&token).await.is_some());
    }
}
