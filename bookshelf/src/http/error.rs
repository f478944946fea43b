use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;
use tracing::error;

use crate::auth::LoginError;
use crate::password::PasswordError;
use crate::store::StoreError;

use super::pages;

/// Failures that end a request with a server error. Validation problems never get
/// here; they are flashed and redirected instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("user store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error("password check failed: {0}")]
    Password(#[from] PasswordError),
}

impl From<LoginError> for AppError {
    fn from(error: LoginError) -> Self {
        match error {
            LoginError::Store(inner) => Self::Store(inner),
            LoginError::Password(inner) => Self::Password(inner),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!(error = %self, "request failed");
        (self.status(), Html(pages::error_page(self.status()))).into_response()
    }
}
