use std::sync::Arc;

use axum::extract::State;
use axum::http::header::HeaderName;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::{Html, Redirect};
use axum::routing::get;
use axum::{Extension, Json, Router};
use axum_extra::extract::{Form, SignedCookieJar};
use tower_governor::{
    governor::GovernorConfigBuilder,
    key_extractor::GlobalKeyExtractor,
    GovernorLayer,
};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::auth::{authenticate, register, Credentials, LoginOutcome, RegisterError};
use crate::books::catalog;

use super::auth::{
    attach_identity, require_identity, session_token, with_session, without_session, Identity,
};
use super::error::AppError;
use super::flash::{self, Flash};
use super::pages;
use super::state::AppState;
use super::{BOOKS_PATH, LOGIN_PATH, REGISTER_PATH};

const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub sessions: usize,
}

#[allow(clippy::expect_used)]
pub fn router(state: AppState) -> Router {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_millisecond(50)
            .burst_size(50)
            .key_extractor(GlobalKeyExtractor)
            .finish()
            .expect("default governor config is valid"),
    );

    let books = Router::new()
        .route("/books", get(list_books))
        .route("/books/", get(list_books))
        .route_layer(from_fn(require_identity));

    Router::new()
        .route("/", get(|| async { Redirect::to(BOOKS_PATH) }))
        .route("/health", get(health))
        .route(REGISTER_PATH, get(register_form).post(register_submit))
        .route(LOGIN_PATH, get(login_form).post(login_submit))
        .route("/auth/logout", get(logout))
        .merge(books)
        .layer(from_fn_with_state(state.clone(), attach_identity))
        .layer(GovernorLayer::new(governor_conf))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        sessions: state.sessions.len(),
    })
}

async fn register_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, notice) = flash::take(jar);
    (jar, Html(pages::register_page(notice)))
}

async fn register_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(credentials): Form<Credentials>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    match register(state.users.as_ref(), &state.hasher, &credentials).await {
        Ok(_) => Ok((jar, Redirect::to(LOGIN_PATH))),
        Err(RegisterError::UsernameTaken(username)) => {
            info!(username = %username, "registration rejected: username taken");
            Ok((
                flash::set(jar, Flash::UsernameTaken),
                Redirect::to(REGISTER_PATH),
            ))
        }
        Err(RegisterError::MissingCredentials) => Ok((
            flash::set(jar, Flash::RegistrationIncomplete),
            Redirect::to(REGISTER_PATH),
        )),
        Err(RegisterError::Store(error)) => Err(error.into()),
        Err(RegisterError::Password(error)) => Err(error.into()),
    }
}

async fn login_form(jar: SignedCookieJar) -> (SignedCookieJar, Html<String>) {
    let (jar, notice) = flash::take(jar);
    (jar, Html(pages::login_page(notice)))
}

async fn login_submit(
    State(state): State<AppState>,
    jar: SignedCookieJar,
    Form(credentials): Form<Credentials>,
) -> Result<(SignedCookieJar, Redirect), AppError> {
    let outcome = authenticate(state.users.as_ref(), &state.hasher, &credentials).await?;

    let notice = match outcome {
        LoginOutcome::Authenticated(user) => {
            if let Some(previous) = session_token(&jar) {
                state.sessions.destroy(&previous);
            }
            let token = state.sessions.create(user.id.clone());
            info!(username = %user.username, user_id = %user.id, "user logged in");
            return Ok((with_session(jar, token), Redirect::to(BOOKS_PATH)));
        }
        LoginOutcome::MissingCredentials => Flash::MissingCredentials,
        LoginOutcome::UnknownUser => Flash::IncorrectUsername,
        LoginOutcome::WrongPassword => Flash::IncorrectPassword,
    };

    info!(reason = notice.code(), "login rejected");
    Ok((flash::set(jar, notice), Redirect::to(LOGIN_PATH)))
}

/// Works with or without a live session; an unknown token is simply dropped.
async fn logout(State(state): State<AppState>, jar: SignedCookieJar) -> (SignedCookieJar, Redirect) {
    if let Some(token) = session_token(&jar) {
        if state.sessions.destroy(&token) {
            info!("user logged out");
        }
    }
    (without_session(jar), Redirect::to(LOGIN_PATH))
}

async fn list_books(Extension(identity): Extension<Identity>) -> Html<String> {
    let books = catalog();
    debug!(username = %identity.username, books = books.len(), "book list requested");
    Html(pages::books_page(&identity.username, books))
}
