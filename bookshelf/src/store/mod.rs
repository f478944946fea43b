//! User credential storage.
//!
//! Two backends implement [`UserStore`]:
//!
//! - [`MongoUserStore`]: the `users` collection of a MongoDB database, with a unique
//!   index on `username`
//! - [`MemoryUserStore`]: a process-local map for development and tests
//!
//! Both reject a second user with the same username at insert time, so callers that
//! race through a lookup-then-create sequence still end up with a single record.

mod memory;
mod mongo;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryUserStore;
pub use mongo::MongoUserStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    pub password_hash: String,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("username {0} is already taken")]
    DuplicateUsername(String),
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, StoreError>;

    /// Insert a new user. Fails with [`StoreError::DuplicateUsername`] if the name exists.
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;
}
