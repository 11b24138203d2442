use anyhow::{bail, Context};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::identity::firebase::GOOGLE_SECURE_TOKEN_JWKS_URL;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => bail!("LOG_FORMAT must be 'pretty' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub migrations_dir: String,
    pub firebase_project_id: String,
    pub firebase_jwks_url: String,
    pub request_timeout: Duration,
    /// `None` allows any origin.
    pub cors_allowed_origins: Option<Vec<String>>,
    pub log_request_body: bool,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let server_port = match var("SERVER_PORT").or_else(|| var("PORT")) {
            Some(port) => port.trim().parse().context("SERVER_PORT must be a port number")?,
            None => DEFAULT_PORT,
        };

        let store_backend = match var("STORE_BACKEND") {
            Some(backend) => backend.parse()?,
            None => StoreBackend::Postgres,
        };

        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            bail!("DATABASE_URL is required when STORE_BACKEND is postgres");
        }

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let request_timeout_ms = match var("REQUEST_TIMEOUT_MS") {
            Some(value) => value
                .trim()
                .parse()
                .context("REQUEST_TIMEOUT_MS must be a number of milliseconds")?,
            None => DEFAULT_REQUEST_TIMEOUT_MS,
        };
        if request_timeout_ms == 0 {
            bail!("REQUEST_TIMEOUT_MS must be greater than 0");
        }

        let log_format = match var("LOG_FORMAT") {
            Some(format) => format.parse()?,
            None => LogFormat::Pretty,
        };

        Ok(Config {
            server_port,
            store_backend,
            database_url,
            database_max_connections,
            migrations_dir: var("MIGRATIONS_DIR").unwrap_or_else(|| "./migrations".to_string()),
            firebase_project_id: var("FIREBASE_PROJECT_ID")
                .context("FIREBASE_PROJECT_ID must be set")?,
            firebase_jwks_url: var("FIREBASE_JWKS_URL")
                .unwrap_or_else(|| GOOGLE_SECURE_TOKEN_JWKS_URL.to_string()),
            request_timeout: Duration::from_millis(request_timeout_ms),
            cors_allowed_origins: parse_allowed_origins(
                &var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| "*".to_string()),
            )?,
            log_request_body: var("LOG_REQUEST_BODY")
                .map(|value| value.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            log_format,
        })
    }
}

fn parse_allowed_origins(raw: &str) -> anyhow::Result<Option<Vec<String>>> {
    let value = raw.trim();
    if value == "*" {
        return Ok(None);
    }

    let origins: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect();

    if origins.is_empty() {
        bail!("CORS_ALLOWED_ORIGINS must be '*' or a comma-separated list of origins");
    }

    Ok(Some(origins))
}
