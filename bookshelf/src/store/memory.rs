use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{StoreError, User, UserStore};

/// Username -> user, plus an id -> username side index for session lookups.
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    by_username: DashMap<String, User>,
    ids: DashMap<String, String>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.by_username.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.by_username.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.by_username.get(username).map(|entry| entry.clone()))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError> {
        let Some(username) = self.ids.get(id).map(|entry| entry.clone()) else {
            return Ok(None);
        };
        self.find_by_username(&username).await
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        match self.by_username.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateUsername(username.to_string())),
            Entry::Vacant(slot) => {
                let user = User {
                    id: uuid::Uuid::new_v4().to_string(),
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                };
                self.ids.insert(user.id.clone(), user.username.clone());
                slot.insert(user.clone());
                Ok(user)
            }
        }
    }
}
