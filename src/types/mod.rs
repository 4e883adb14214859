//! Core types for the Templation MCP server.
//!
//! This module provides foundational types used throughout the system:
//! - **Errors**: Application error types with thiserror derives
//! - **Config**: Configuration structures for the remote API, cache and transport

mod config;
mod errors;

pub use config::{
    resolve_api_key, CacheConfig, Config, ObservabilityConfig, RemoteConfig, ServerConfig,
    API_KEY_ENV,
};
pub use errors::{rpc_codes, Error, Result};
