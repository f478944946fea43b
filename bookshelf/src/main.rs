//! # bookshelf
//!
//! Minimal authenticated book-listing web application.
//!
//! Users register and log in with a username and password; signed-in users see a
//! fixed list of books.
//!
//! ## Architecture
//!
//! - **Store**: user records in MongoDB (unique `username` index) or in memory
//! - **Password**: Argon2id hashing on the blocking pool
//! - **Sessions**: in-process token map behind a signed, HTTP-only cookie
//! - **HTTP**: Axum router with an identity layer, a login gate for `/books`,
//!   rate limiting, request IDs, and graceful shutdown

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used, clippy::expect_used)]

mod auth;
mod books;
mod config;
mod http;
mod password;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::serve;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, Cli, StoreBackend};
use crate::http::{router, AppState};
use crate::password::PasswordHasher;
use crate::store::{MemoryUserStore, MongoUserStore, UserStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging().context("failed to initialize logging")?;

    let cli = Cli::parse();
    let config = AppConfig::from_cli(cli).context("failed to load configuration")?;
    info!(
        bind = %config.bind,
        store = ?config.store,
        database = %config.database,
        "configuration loaded"
    );

    let users = open_user_store(&config).await?;
    let state = AppState::new(users, PasswordHasher::default(), &config.session_secret);

    let app = router(state);
    let listener = TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    if config.bind.ip().is_loopback() {
        warn!(
            bind = %config.bind,
            "binding to loopback; use --bind 0.0.0.0:3000 for LAN access"
        );
    }

    let shutdown = tokio::signal::ctrl_c();
    info!(bind = %config.bind, "bookshelf listening");

    serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        let _ = shutdown.await;
        info!("shutting down gracefully");
    })
    .await
    .context("server exited with error")
}

/// Initialize tracing subscriber with `RUST_LOG` env filter (default: `info`).
fn init_logging() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    Ok(())
}

async fn open_user_store(config: &AppConfig) -> anyhow::Result<Arc<dyn UserStore>> {
    match config.store {
        StoreBackend::Memory => {
            warn!("using in-memory user store; accounts are lost on restart");
            Ok(Arc::new(MemoryUserStore::new()))
        }
        StoreBackend::Mongodb => {
            let store = MongoUserStore::connect(&config.mongodb_uri, &config.database)
                .await
                .with_context(|| format!("failed to open database {}", config.database))?;
            info!(database = %config.database, "connected to mongodb");
            Ok(Arc::new(store))
        }
    }
}
