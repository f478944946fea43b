#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::module_inception)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use async_trait::async_trait;
    use axum::http::header::SET_COOKIE;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum_extra::extract::SignedCookieJar;
    use axum_test::{TestResponse, TestServer};
    use serde_json::Value;

    use crate::books::catalog;
    use crate::config::SessionSecret;
    use crate::password::fast_hasher;
    use crate::store::{MemoryUserStore, StoreError, User, UserStore};

    use crate::http::auth::with_session;
    use crate::http::{router, AppState, BOOKS_PATH, LOGIN_PATH, REGISTER_PATH};

    const SECRET: &str = "bookshelf-test-secret-0123456789abcdef";

    fn test_app_state() -> (AppState, Arc<MemoryUserStore>) {
        let users = Arc::new(MemoryUserStore::new());
        let secret = SessionSecret::new(String::from(SECRET)).expect("test secret is long enough");
        let state = AppState::new(users.clone(), fast_hasher(), &secret);
        (state, users)
    }

    /// Every lookup and insert fails as if the database were unreachable.
    #[derive(Debug)]
    struct UnavailableUserStore;

    #[async_trait]
    impl UserStore for UnavailableUserStore {
        async fn find_by_username(&self, _username: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database(mongodb::error::Error::custom("store offline")))
        }

        async fn find_by_id(&self, _id: &str) -> Result<Option<User>, StoreError> {
            Err(StoreError::Database(mongodb::error::Error::custom("store offline")))
        }

        async fn create(&self, _username: &str, _password_hash: &str) -> Result<User, StoreError> {
            Err(StoreError::Database(mongodb::error::Error::custom("store offline")))
        }
    }

    fn unavailable_app_state() -> AppState {
        let secret = SessionSecret::new(String::from(SECRET)).expect("test secret is long enough");
        AppState::new(Arc::new(UnavailableUserStore), fast_hasher(), &secret)
    }

    /// A `cookie` header value carrying a correctly signed session token.
    fn signed_session_cookie(state: &AppState, token: String) -> String {
        let jar = with_session(SignedCookieJar::new(state.cookie_key.clone()), token);
        let response = jar.into_response();
        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .expect("session cookie is set")
            .to_str()
            .expect("cookie header is ascii");
        set_cookie
            .split(';')
            .next()
            .expect("cookie has a name=value pair")
            .to_string()
    }

    fn assert_server_error(response: &TestResponse) {
        assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(response.text().contains("500 Internal Server Error"));
    }

    fn test_server(state: AppState) -> Result<TestServer> {
        let mut server = TestServer::new(router(state))?;
        server.save_cookies();
        Ok(server)
    }

    async fn submit(server: &TestServer, path: &str, username: &str, password: &str) -> TestResponse {
        server
            .post(path)
            .form(&[("username", username), ("password", password)])
            .await
    }

    fn assert_redirect(response: &TestResponse, location: &str) {
        assert_eq!(response.status_code(), StatusCode::SEE_OTHER);
        assert_eq!(response.header("location"), location);
    }

    #[tokio::test]
    async fn register_login_list_logout_scenario() -> Result<()> {
        let (state, users) = test_app_state();
        let sessions = state.sessions.clone();
        let server = test_server(state)?;

        let registered = submit(&server, REGISTER_PATH, "alice", "secret1").await;
        assert_redirect(&registered, LOGIN_PATH);
        assert_eq!(users.len(), 1);

        let logged_in = submit(&server, LOGIN_PATH, "alice", "secret1").await;
        assert_redirect(&logged_in, BOOKS_PATH);
        assert_eq!(sessions.len(), 1);

        let listing = server.get("/books/").await;
        assert_eq!(listing.status_code(), StatusCode::OK);
        let page = listing.text();
        assert!(page.contains("Signed in as alice"));
        assert_eq!(page.matches("<li>").count(), 10);
        let mut cursor = 0;
        for book in catalog() {
            let found = page[cursor..]
                .find(book.title)
                .unwrap_or_else(|| panic!("{} missing or out of order", book.title));
            cursor += found + book.title.len();
        }

        let logged_out = server.get("/auth/logout").await;
        assert_redirect(&logged_out, LOGIN_PATH);
        assert!(sessions.is_empty());

        let after_logout = server.get("/books/").await;
        assert_redirect(&after_logout, LOGIN_PATH);
        Ok(())
    }

    #[tokio::test]
    async fn listing_without_session_redirects_to_login() -> Result<()> {
        let (state, _) = test_app_state();
        let server = test_server(state)?;

        assert_redirect(&server.get("/books").await, LOGIN_PATH);
        assert_redirect(&server.get("/books/").await, LOGIN_PATH);
        Ok(())
    }

    #[tokio::test]
    async fn forged_session_cookie_is_ignored() -> Result<()> {
        let (state, _) = test_app_state();
        let server = TestServer::new(router(state))?;

        let response = server
            .get("/books")
            .add_header("cookie", "bookshelf.sid=00000000-0000-0000-0000-000000000000")
            .await;

        assert_redirect(&response, LOGIN_PATH);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_registration_flashes_once_and_keeps_one_record() -> Result<()> {
        let (state, users) = test_app_state();
        let server = test_server(state)?;

        submit(&server, REGISTER_PATH, "alice", "secret1").await;
        let duplicate = submit(&server, REGISTER_PATH, "alice", "other").await;

        assert_redirect(&duplicate, REGISTER_PATH);
        assert_eq!(users.len(), 1);

        let form = server.get(REGISTER_PATH).await;
        assert_eq!(form.status_code(), StatusCode::OK);
        assert!(form.text().contains("Username already taken"));

        let again = server.get(REGISTER_PATH).await;
        assert!(!again.text().contains("Username already taken"));

        let original_still_works = submit(&server, LOGIN_PATH, "alice", "secret1").await;
        assert_redirect(&original_still_works, BOOKS_PATH);
        Ok(())
    }

    #[tokio::test]
    async fn blank_registration_is_rejected() -> Result<()> {
        let (state, users) = test_app_state();
        let server = test_server(state)?;

        let response = submit(&server, REGISTER_PATH, "", "secret1").await;

        assert_redirect(&response, REGISTER_PATH);
        assert!(users.is_empty());
        let form = server.get(REGISTER_PATH).await;
        assert!(form.text().contains("Username and password are required"));
        Ok(())
    }

    #[tokio::test]
    async fn wrong_password_creates_no_session() -> Result<()> {
        let (state, _) = test_app_state();
        let sessions = state.sessions.clone();
        let server = test_server(state)?;
        submit(&server, REGISTER_PATH, "alice", "secret1").await;

        let response = submit(&server, LOGIN_PATH, "alice", "wrong").await;

        assert_redirect(&response, LOGIN_PATH);
        assert!(sessions.is_empty());
        assert!(server
            .get(LOGIN_PATH)
            .await
            .text()
            .contains("Incorrect password."));
        assert_redirect(&server.get("/books").await, LOGIN_PATH);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_user_is_flashed() -> Result<()> {
        let (state, _) = test_app_state();
        let sessions = state.sessions.clone();
        let server = test_server(state)?;

        let response = submit(&server, LOGIN_PATH, "nobody", "secret1").await;

        assert_redirect(&response, LOGIN_PATH);
        assert!(sessions.is_empty());
        assert!(server
            .get(LOGIN_PATH)
            .await
            .text()
            .contains("Incorrect username."));
        Ok(())
    }

    #[tokio::test]
    async fn relogin_replaces_previous_session() -> Result<()> {
        let (state, _) = test_app_state();
        let sessions = state.sessions.clone();
        let server = test_server(state)?;
        submit(&server, REGISTER_PATH, "alice", "secret1").await;

        submit(&server, LOGIN_PATH, "alice", "secret1").await;
        submit(&server, LOGIN_PATH, "alice", "secret1").await;

        assert_eq!(sessions.len(), 1);
        assert_eq!(server.get("/books").await.status_code(), StatusCode::OK);
        Ok(())
    }

    #[tokio::test]
    async fn logout_without_session_redirects_to_login() -> Result<()> {
        let (state, _) = test_app_state();
        let server = test_server(state)?;

        assert_redirect(&server.get("/auth/logout").await, LOGIN_PATH);
        Ok(())
    }

    #[tokio::test]
    async fn root_redirects_to_books() -> Result<()> {
        let (state, _) = test_app_state();
        let server = test_server(state)?;

        assert_redirect(&server.get("/").await, BOOKS_PATH);
        Ok(())
    }

    #[tokio::test]
    async fn health_reports_sessions_and_request_id() -> Result<()> {
        let (state, _) = test_app_state();
        let server = test_server(state)?;

        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        assert!(!response.header("x-request-id").is_empty());
        let body: Value = response.json();
        assert_eq!(body.get("status"), Some(&Value::String("ok".into())));
        assert_eq!(body.get("sessions"), Some(&Value::Number(0_u64.into())));
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_during_registration_renders_error_page() -> Result<()> {
        let server = test_server(unavailable_app_state())?;

        let response = submit(&server, REGISTER_PATH, "alice", "secret1").await;

        assert_server_error(&response);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_during_login_renders_error_page() -> Result<()> {
        let state = unavailable_app_state();
        let sessions = state.sessions.clone();
        let server = test_server(state)?;

        let response = submit(&server, LOGIN_PATH, "alice", "secret1").await;

        assert_server_error(&response);
        assert!(sessions.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_during_identity_resolution_renders_error_page() -> Result<()> {
        let state = unavailable_app_state();
        let token = state.sessions.create(String::from("user-1"));
        let cookie = signed_session_cookie(&state, token);
        let server = TestServer::new(router(state))?;

        let listing = server.get(BOOKS_PATH).add_header("cookie", cookie.clone()).await;
        assert_server_error(&listing);

        let logout = server.get("/auth/logout").add_header("cookie", cookie).await;
        assert_server_error(&logout);
        Ok(())
    }
}
