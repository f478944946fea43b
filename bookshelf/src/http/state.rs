use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use dashmap::DashMap;

use crate::config::SessionSecret;
use crate::password::PasswordHasher;
use crate::store::UserStore;

/// Session token -> user id. Sessions live until logout or process exit.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<String, String>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, user_id: String) -> String {
        let token = uuid::Uuid::new_v4().to_string();
        self.inner.insert(token.clone(), user_id);
        token
    }

    pub fn resolve(&self, token: &str) -> Option<String> {
        self.inner.get(token).map(|entry| entry.value().clone())
    }

    pub fn destroy(&self, token: &str) -> bool {
        self.inner.remove(token).is_some()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: SessionStore,
    pub hasher: PasswordHasher,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, hasher: PasswordHasher, secret: &SessionSecret) -> Self {
        Self {
            users,
            sessions: SessionStore::new(),
            hasher,
            cookie_key: Key::derive_from(secret.as_bytes()),
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
