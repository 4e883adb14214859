//! Tool infrastructure — catalog, validation, and the built-in tool table.
//!
//! A single `ToolSpec` table feeds both the registry (what tools exist) and
//! the dispatcher (what each tool does), so the two cannot drift apart.

pub mod builtin;
pub mod catalog;

pub use builtin::builtin_tools;
pub use catalog::{Constraints, ParamDef, ParamType, ToolDescriptor, ToolRegistry};

use crate::remote::RemoteRequest;
use crate::types::Result;
use serde_json::Value;
use std::time::Duration;

/// Maps validated arguments to the API call that serves them.
pub type RequestBuilder = fn(&Value) -> Result<RemoteRequest>;

/// Renders a JSON payload (plus the validated arguments) into one text block.
pub type ResponseFormatter = fn(&Value, &Value) -> String;

/// Everything the server knows about one tool.
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub descriptor: ToolDescriptor,
    /// `None` means results are never cached.
    pub cache_ttl: Option<Duration>,
    /// Tools whose cached results a successful call makes stale.
    pub invalidates: &'static [&'static str],
    pub build_request: RequestBuilder,
    pub format: ResponseFormatter,
}

impl ToolSpec {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}
