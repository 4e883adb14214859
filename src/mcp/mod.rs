//! MCP transport: newline-delimited JSON-RPC 2.0 over stdio.

pub mod codec;
pub mod router;
pub mod server;

pub use server::McpServer;

/// MCP protocol revision announced by `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";
