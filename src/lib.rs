//! # Templation MCP - tool-invocation engine for the Templation API
//!
//! Exposes Templation's template search, exemplar discovery and
//! repository-to-template conversion as MCP tools over stdio:
//! - Schema-described tools with full argument validation
//! - Bounded-retry authenticated HTTP client with failure classification
//! - Short-lived TTL cache for read-only calls
//! - Deterministic text rendering of JSON results
//!
//! ## Architecture
//!
//! ```text
//!   stdin ──► mcp::server ──► mcp::router ──► dispatch::Dispatcher
//!                                              │  tools::ToolRegistry (validate)
//!                                              │  cache::ResponseCache
//!                                              │  remote::RemoteApi ──► Templation API
//!                                              │  format::*
//!   stdout ◄── writer task ◄───────────────────┘
//! ```
//!
//! `startup::open` performs one authenticated health check; a `Dispatcher`
//! only exists once it has passed.

// Enforce strict safety at compile time
#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]
#![warn(rust_2018_idioms)]

pub mod cache;
pub mod dispatch;
pub mod format;
pub mod mcp;
pub mod remote;
pub mod startup;
pub mod tools;
pub mod types;

// Internal utilities
pub mod observability;

pub use types::{Config, Error, Result};
