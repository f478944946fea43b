//! HTTP layer: Axum router, session middleware, handlers, and pages.
//!
//! `/auth/*` handles registration, login, and logout; `/books` is only reachable with
//! a session. Every request passes through [`auth::attach_identity`] first.

mod auth;
mod error;
mod flash;
mod handlers;
mod pages;
mod state;

#[cfg(test)]
mod tests;

pub use handlers::router;
pub use state::AppState;

pub(crate) const LOGIN_PATH: &str = "/auth/login";
pub(crate) const REGISTER_PATH: &str = "/auth/register";
pub(crate) const BOOKS_PATH: &str = "/books";
