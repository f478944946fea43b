use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::SignedCookieJar;
use tracing::debug;

use super::error::AppError;
use super::state::AppState;
use super::LOGIN_PATH;

pub const SESSION_COOKIE: &str = "bookshelf.sid";

/// The signed-in user, attached to request extensions by [`attach_identity`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
}

pub fn session_token(jar: &SignedCookieJar) -> Option<String> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

pub fn with_session(jar: SignedCookieJar, token: String) -> SignedCookieJar {
    jar.add(
        Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax),
    )
}

pub fn without_session(jar: SignedCookieJar) -> SignedCookieJar {
    jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
}

/// Resolve the session cookie to a stored user and attach it as an [`Identity`].
///
/// Unknown tokens and tokens whose user no longer exists are treated as anonymous.
pub async fn attach_identity(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(user_id) = session_token(&jar).and_then(|token| state.sessions.resolve(&token)) {
        match state.users.find_by_id(&user_id).await? {
            Some(user) => {
                request.extensions_mut().insert(Identity {
                    user_id: user.id,
                    username: user.username,
                });
            }
            None => debug!(user_id = %user_id, "session refers to unknown user"),
        }
    }

    Ok(next.run(request).await)
}

/// Let the request through only when [`attach_identity`] found a user.
pub async fn require_identity(request: Request, next: Next) -> Response {
    if request.extensions().get::<Identity>().is_some() {
        next.run(request).await
    } else {
        debug!(path = %request.uri().path(), "anonymous request redirected to login");
        Redirect::to(LOGIN_PATH).into_response()
    }
}
