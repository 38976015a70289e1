//! Application configuration loaded from environment variables.
//!
//! Values are read once at startup. A `.env` file is honored for local
//! development.

use crate::services::password::DEFAULT_ITERATIONS;
use std::env;
use std::str::FromStr;

/// Which record store backs the services.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(Self::Firestore),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::Invalid("RECORD_STORE")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID for Firestore
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store: StoreBackend,
    /// Explicit identifier-generator host prefix; derived from the local
    /// address when unset.
    pub id_host_prefix: Option<u16>,
    pub password_hash_iterations: u32,

    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: parse_or("PORT", 8080)?,
            store: match env::var("RECORD_STORE") {
                Ok(v) => v.parse()?,
                Err(_) => StoreBackend::Firestore,
            },
            id_host_prefix: match env::var("ID_HOST_PREFIX") {
                Ok(v) => Some(
                    v.trim()
                        .parse()
                        .map_err(|_| ConfigError::Invalid("ID_HOST_PREFIX"))?,
                ),
                Err(_) => None,
            },
            password_hash_iterations: parse_or("PASSWORD_HASH_ITERATIONS", DEFAULT_ITERATIONS)?,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
        })
    }

    /// In-memory configuration for tests.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 8080,
            store: StoreBackend::Memory,
            id_host_prefix: Some(1),
            password_hash_iterations: 1_000,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
        }
    }
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(v) => v.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
