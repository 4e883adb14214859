//! Remote call layer — authenticated calls against the Templation API.
//!
//! `RemoteApi` is the seam the dispatcher and startup gate depend on;
//! `RemoteClient` is the reqwest implementation with retry/backoff.

pub mod client;
pub mod retry;

pub use client::RemoteClient;
pub use retry::{classify_status, RetryPolicy};

use crate::types::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Path prefix shared by every MCP-facing endpoint on the API.
pub const API_PREFIX: [&str; 2] = ["api", "mcp"];

// =============================================================================
// Request / payload
// =============================================================================

/// One call against the API: method, path below [`API_PREFIX`], query, body.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteRequest {
    pub method: Method,
    pub path: Vec<String>,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RemoteRequest {
    pub fn new<I, S>(method: Method, path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method,
            path: path.into_iter().map(Into::into).collect(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::GET, path)
    }

    pub fn post<I, S>(path: I, body: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put<I, S>(path: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Method::PUT, path)
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// The authenticated endpoint used as the startup health check.
    pub fn health_check() -> Self {
        Self::get(["user", "test"])
    }

    /// Human-readable endpoint, e.g. `/api/mcp/templates/abc`.
    pub fn endpoint(&self) -> String {
        let mut out = String::new();
        for segment in API_PREFIX.iter().copied().chain(self.path.iter().map(String::as_str)) {
            out.push('/');
            out.push_str(segment);
        }
        out
    }
}

/// Decoded body of a successful response.
#[derive(Debug, Clone, PartialEq)]
pub enum RemotePayload {
    /// Content-type indicated JSON.
    Json(Value),
    /// Anything else, returned verbatim.
    Text(String),
}

// =============================================================================
// Attempt classification
// =============================================================================

/// Outcome class of one remote attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Success,
    AuthFailure,
    RateLimited,
    ServerError,
    NetworkError,
    /// Any other non-2xx status; surfaced without retry.
    Rejected,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Success => "success",
            Classification::AuthFailure => "auth_failure",
            Classification::RateLimited => "rate_limited",
            Classification::ServerError => "server_error",
            Classification::NetworkError => "network_error",
            Classification::Rejected => "rejected",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Record of one attempt. Lives only for the duration of the call; emitted to tracing.
#[derive(Debug, Clone)]
pub struct RemoteCallAttempt {
    pub endpoint: String,
    pub method: Method,
    pub attempt: u32,
    pub classification: Classification,
}

impl RemoteCallAttempt {
    pub(crate) fn log(&self) {
        match self.classification {
            Classification::Success => tracing::debug!(
                endpoint = %self.endpoint,
                method = %self.method,
                attempt = self.attempt,
                classification = %self.classification,
                "remote call succeeded"
            ),
            _ => tracing::warn!(
                endpoint = %self.endpoint,
                method = %self.method,
                attempt = self.attempt,
                classification = %self.classification,
                "remote call failed"
            ),
        }
    }
}

// =============================================================================
// Trait seam
// =============================================================================

/// Anything that can execute a [`RemoteRequest`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RemoteApi: Send + Sync {
    async fn call(&self, request: &RemoteRequest) -> Result<RemotePayload>;
}
