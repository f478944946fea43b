use std::fmt;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use thiserror::Error;

/// Environment variable holding the cookie signing secret.
pub const SESSION_SECRET_ENV: &str = "BOOKSHELF_SESSION_SECRET";

/// Shortest accepted signing secret, in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Debug, Parser)]
#[command(
    name = "bookshelf",
    version,
    about = "Minimal authenticated book-listing web application"
)]
pub struct Cli {
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<SocketAddr>,

    #[arg(long, value_name = "URI")]
    pub mongodb_uri: Option<String>,

    #[arg(long, value_name = "NAME")]
    pub database: Option<String>,

    #[arg(long, value_enum, value_name = "BACKEND")]
    pub store: Option<StoreBackend>,

    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Where user records live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process memory; accounts vanish on restart.
    Memory,
    #[default]
    Mongodb,
}

/// Cookie signing secret. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionSecret(String);

impl SessionSecret {
    pub fn new(raw: String) -> Result<Self, ConfigError> {
        let trimmed = raw.trim();
        if trimmed.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::WeakSessionSecret {
                min: MIN_SESSION_SECRET_LEN,
                actual: trimmed.len(),
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for SessionSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionSecret(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: SocketAddr,
    pub mongodb_uri: String,
    pub database: String,
    pub store: StoreBackend,
    pub session_secret: SessionSecret,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error(
        "no session secret configured; set {} or session_secret in the config file",
        SESSION_SECRET_ENV
    )]
    MissingSessionSecret,
    #[error("session secret must be at least {min} bytes, got {actual}")]
    WeakSessionSecret { min: usize, actual: usize },
    #[error("environment variable {key} is not valid unicode")]
    NonUnicodeEnv { key: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    bind: Option<SocketAddr>,
    mongodb_uri: Option<String>,
    database: Option<String>,
    store: Option<StoreBackend>,
    session_secret: Option<String>,
}

impl AppConfig {
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let from_file = read_file_config(cli.config.as_deref())?;
        let env_secret = read_env(SESSION_SECRET_ENV)?;
        Self::resolve(cli, from_file, env_secret)
    }

    fn resolve(
        cli: Cli,
        from_file: FileConfig,
        env_secret: Option<String>,
    ) -> Result<Self, ConfigError> {
        let bind = cli
            .bind
            .or(from_file.bind)
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));
        let mongodb_uri = cli
            .mongodb_uri
            .or(from_file.mongodb_uri)
            .unwrap_or_else(|| String::from("mongodb://127.0.0.1:27017"));
        let database = cli
            .database
            .or(from_file.database)
            .unwrap_or_else(|| String::from("bookshelf"));
        let store = cli.store.or(from_file.store).unwrap_or_default();
        let raw_secret = env_secret
            .or(from_file.session_secret)
            .ok_or(ConfigError::MissingSessionSecret)?;
        let session_secret = SessionSecret::new(raw_secret)?;

        Ok(Self {
            bind,
            mongodb_uri,
            database,
            store,
            session_secret,
        })
    }
}

fn read_file_config(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(FileConfig::default());
    };

    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;

    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })
}

fn read_env(key: &str) -> Result<Option<String>, ConfigError> {
    match std::env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(std::env::VarError::NotUnicode(_)) => Err(ConfigError::NonUnicodeEnv {
            key: String::from(key),
        }),
    }
}
