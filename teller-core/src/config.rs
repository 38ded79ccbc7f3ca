//! Configuration management
//!
//! Settings are read from an optional `settings.json` in the data directory:
//! ```json
//! {
//!   "server": { "host": "0.0.0.0", "port": 8005, "requestTimeoutSecs": 30 },
//!   "auth": { "tokenTtlSecs": 123123213 },
//!   "hashing": { "memoryCostKib": 19456, "timeCost": 2, "parallelism": 1 },
//!   "storage": { "inMemory": false }
//! }
//! ```
//! Environment variables take precedence over the file. The signing secret
//! is supplied through `TELLER_JWT_SECRET` or `auth.jwtSecret`; loading does
//! not require it, [`Config::validate`] does.

use std::fmt;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::HashParams;
use crate::services::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};

/// Settings file name inside the data directory
pub const SETTINGS_FILE: &str = "settings.json";

/// Database file name inside the data directory
pub const DATABASE_FILE: &str = "teller.duckdb";

pub const ENV_HOST: &str = "TELLER_HOST";
pub const ENV_PORT: &str = "TELLER_PORT";
pub const ENV_TOKEN_TTL: &str = "TELLER_TOKEN_TTL_SECS";
pub const ENV_IN_MEMORY: &str = "TELLER_IN_MEMORY";
pub const ENV_JWT_SECRET: &str = "TELLER_JWT_SECRET";

/// Teller configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub hashing: HashParams,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8005
}

fn default_request_timeout() -> u64 {
    30
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthConfig {
    #[serde(default, skip_serializing)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl(),
        }
    }
}

// The secret never reaches logs
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .finish()
    }
}

fn default_token_ttl() -> i64 {
    DEFAULT_TOKEN_TTL_SECS
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageConfig {
    #[serde(default)]
    pub in_memory: bool,
}

impl Config {
    /// Load config from the data directory and the process environment
    pub fn load(data_dir: &Path) -> Result<Self> {
        Self::load_with_env(data_dir, |key| std::env::var(key).ok())
    }

    /// Load config using `env` to resolve environment variables
    pub fn load_with_env<F>(data_dir: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settings_path = data_dir.join(SETTINGS_FILE);

        let mut config: Config = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)
                .with_context(|| format!("failed to read {}", settings_path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("invalid settings in {}", settings_path.display()))?
        } else {
            Config::default()
        };

        if let Some(host) = env(ENV_HOST) {
            config.server.host = host;
        }
        if let Some(port) = env(ENV_PORT) {
            config.server.port = port
                .parse()
                .with_context(|| format!("{ENV_PORT} must be a port number, got {port:?}"))?;
        }
        if let Some(ttl) = env(ENV_TOKEN_TTL) {
            config.auth.token_ttl_secs = ttl
                .parse()
                .with_context(|| format!("{ENV_TOKEN_TTL} must be an integer, got {ttl:?}"))?;
        }
        if let Some(flag) = env(ENV_IN_MEMORY) {
            config.storage.in_memory = parse_flag(&flag)
                .with_context(|| format!("{ENV_IN_MEMORY} must be a boolean, got {flag:?}"))?;
        }
        if let Some(secret) = env(ENV_JWT_SECRET) {
            config.auth.jwt_secret = secret;
        }

        config.validate_settings()?;
        Ok(config)
    }

    /// Build a config around an explicit secret, skipping the environment
    pub fn with_secret(secret: impl Into<String>) -> Self {
        let mut config = Config::default();
        config.auth.jwt_secret = secret.into();
        config
    }

    /// Full validation, including the signing secret (needed to serve or
    /// issue tokens)
    pub fn validate(&self) -> Result<()> {
        self.validate_settings()?;
        if self.auth.jwt_secret.trim().is_empty() {
            bail!("signing secret is not configured (set {ENV_JWT_SECRET})");
        }
        Ok(())
    }

    /// Validate everything except the signing secret
    pub fn validate_settings(&self) -> Result<()> {
        if !(1..=MAX_TOKEN_TTL_SECS).contains(&self.auth.token_ttl_secs) {
            bail!("token lifetime must be between 1 and {MAX_TOKEN_TTL_SECS} seconds");
        }
        if self.server.request_timeout_secs == 0 {
            bail!("request timeout must be positive");
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" | "1" | "yes" | "TRUE" | "YES" => Some(true),
        "false" | "0" | "no" | "FALSE" | "NO" => Some(false),
        _ => None,
    }
}
