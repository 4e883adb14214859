//! Configuration structures.
//!
//! Configuration comes from CLI flags and environment variables (see
//! `main.rs`). Every section has a usable default so tests can build a
//! `Config::default()` and override only what they exercise.

use crate::types::{Error, Result};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable holding the API key when no CLI argument is given.
pub const API_KEY_ENV: &str = "TEMPLATION_API_KEY";

/// Global server configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Remote API configuration.
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Response cache configuration.
    #[serde(default)]
    pub cache: CacheConfig,

    /// Stdio transport configuration.
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// Remote API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the Templation API.
    pub base_url: String,

    /// Total attempts per call, including the first.
    pub max_attempts: u32,

    /// Backoff unit; the wait after attempt `n` is `backoff_base * n`.
    #[serde(with = "humantime_serde")]
    pub backoff_base: Duration,

    /// Wall-clock bound on a single attempt.
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            max_attempts: 2,
            backoff_base: Duration::from_millis(300),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl RemoteConfig {
    /// Reject values the retry loop cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(Error::config("max_attempts must be at least 1"));
        }
        if self.base_url.trim().is_empty() {
            return Err(Error::config("base_url cannot be empty"));
        }
        Ok(())
    }
}

/// Response cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false, every call goes to the remote API.
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Stdio transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Name reported in the `initialize` response.
    pub name: String,

    /// Maximum accepted length of one JSON-RPC line in bytes.
    pub max_line_bytes: usize,

    /// Bounded channel capacity between request tasks and the stdout writer.
    pub response_channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "templation".to_string(),
            max_line_bytes: 4 * 1024 * 1024,
            response_channel_capacity: 64,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ObservabilityConfig {
    /// Enable JSON log formatting.
    pub json_logs: bool,
}

/// Pick the API key: CLI argument first, then the environment value.
///
/// Blank values count as missing.
pub fn resolve_api_key(cli_arg: Option<String>, env_value: Option<String>) -> Result<SecretString> {
    cli_arg
        .into_iter()
        .chain(env_value)
        .map(|k| k.trim().to_string())
        .find(|k| !k.is_empty())
        .map(SecretString::from)
        .ok_or_else(|| {
            Error::config(format!(
                "API key required: pass it as the first argument or set {API_KEY_ENV}"
            ))
        })
}
