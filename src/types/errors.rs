//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation and provide
//! clear error messages with context. Remote failures carry enough detail
//! (status code, attempts used) for the formatter to tell the caller how to
//! retry correctly.

use crate::remote::Classification;
use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC 2.0 error codes used on the stdio transport.
pub mod rpc_codes {
    pub const PARSE_ERROR: i64 = -32700;
    pub const INVALID_REQUEST: i64 = -32600;
    pub const METHOD_NOT_FOUND: i64 = -32601;
    pub const INVALID_PARAMS: i64 = -32602;
    pub const INTERNAL_ERROR: i64 = -32603;
}

/// Main error enum for the Templation MCP server.
#[derive(Error, Debug)]
pub enum Error {
    /// Tool arguments failed schema validation. Lists every violation.
    #[error("invalid arguments for {tool}: {}", violations.join("; "))]
    InvalidArguments {
        tool: String,
        violations: Vec<String>,
    },

    /// No tool registered under this name (map to JSON-RPC INVALID_PARAMS).
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The API rejected the credential (401/403). Never retried.
    #[error("authentication failed (HTTP {status})")]
    AuthFailure { status: u16 },

    /// 429 from the API after the attempt budget was spent.
    #[error("rate limited after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    /// 5xx from the API after the attempt budget was spent.
    #[error("server error (HTTP {status}) after {attempts} attempt(s)")]
    ServerError { status: u16, attempts: u32 },

    /// Connection, DNS, timeout or body-read failure after the attempt budget was spent.
    #[error("network error after {attempts} attempt(s): {message}")]
    Network { attempts: u32, message: String },

    /// Any other non-2xx status. Not retried.
    #[error("request rejected (HTTP {status}): {detail}")]
    Rejected { status: u16, detail: String },

    /// A 2xx response whose body could not be decoded.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// A tool descriptor produced a schema that does not compile.
    #[error("schema error: {0}")]
    Schema(String),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal errors (broken invariants).
    #[error("internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Convert to a JSON-RPC error code.
    pub fn rpc_code(&self) -> i64 {
        match self {
            Error::InvalidArguments { .. } | Error::UnknownTool(_) => rpc_codes::INVALID_PARAMS,
            Error::Serialization(_) => rpc_codes::PARSE_ERROR,
            _ => rpc_codes::INTERNAL_ERROR,
        }
    }

    /// Whether another attempt against the remote API may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RateLimited { .. } | Error::ServerError { .. } | Error::Network { .. }
        )
    }

    /// Remote-call classification of this error, if it came from the remote layer.
    pub fn classification(&self) -> Option<Classification> {
        match self {
            Error::AuthFailure { .. } => Some(Classification::AuthFailure),
            Error::RateLimited { .. } => Some(Classification::RateLimited),
            Error::ServerError { .. } => Some(Classification::ServerError),
            Error::Network { .. } => Some(Classification::NetworkError),
            Error::Rejected { .. } | Error::InvalidResponse(_) => Some(Classification::Rejected),
            _ => None,
        }
    }
}

// Convenience constructors
impl Error {
    pub fn invalid_arguments(tool: impl Into<String>, violations: Vec<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            violations,
        }
    }

    pub fn unknown_tool(name: impl Into<String>) -> Self {
        Self::UnknownTool(name.into())
    }

    pub fn network(attempts: u32, message: impl Into<String>) -> Self {
        Self::Network {
            attempts,
            message: message.into(),
        }
    }

    pub fn rejected(status: u16, detail: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            detail: detail.into(),
        }
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        Self::Schema(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
