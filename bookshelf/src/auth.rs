//! Local username/password accounts.
//!
//! Registration looks the username up first so the common case produces a friendly
//! message without burning a hash; the store's own uniqueness check catches the
//! concurrent case and is reported the same way.
//!
//! Usernames are trimmed. Passwords are taken verbatim.

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::password::{PasswordError, PasswordHasher};
use crate::store::{StoreError, User, UserStore};

/// Form body shared by the register and login pages.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    fn username(&self) -> &str {
        self.username.trim()
    }

    fn is_complete(&self) -> bool {
        !self.username().is_empty() && !self.password.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum RegisterError {
    #[error("username and password are required")]
    MissingCredentials,
    #[error("username {0} is already taken")]
    UsernameTaken(String),
    #[error(transparent)]
    Store(StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl From<StoreError> for RegisterError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::DuplicateUsername(username) => Self::UsernameTaken(username),
            other => Self::Store(other),
        }
    }
}

#[derive(Debug, Error)]
pub enum LoginError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated(User),
    MissingCredentials,
    UnknownUser,
    WrongPassword,
}

pub async fn register(
    users: &dyn UserStore,
    hasher: &PasswordHasher,
    credentials: &Credentials,
) -> Result<User, RegisterError> {
    if !credentials.is_complete() {
        return Err(RegisterError::MissingCredentials);
    }
    let username = credentials.username();

    if users.find_by_username(username).await?.is_some() {
        debug!(username, "registration rejected: username exists");
        return Err(RegisterError::UsernameTaken(username.to_string()));
    }

    let password_hash = hasher.hash(&credentials.password).await?;
    let user = users.create(username, &password_hash).await?;
    info!(username = %user.username, user_id = %user.id, "user registered");
    Ok(user)
}

pub async fn authenticate(
    users: &dyn UserStore,
    hasher: &PasswordHasher,
    credentials: &Credentials,
) -> Result<LoginOutcome, LoginError> {
    if !credentials.is_complete() {
        return Ok(LoginOutcome::MissingCredentials);
    }

    let Some(user) = users.find_by_username(credentials.username()).await? else {
        return Ok(LoginOutcome::UnknownUser);
    };

    if hasher
        .verify(&credentials.password, &user.password_hash)
        .await?
    {
        Ok(LoginOutcome::Authenticated(user))
    } else {
        Ok(LoginOutcome::WrongPassword)
    }
}
