//! Failure texts. Every failure path of a tool call ends here, so the
//! assistant always gets a readable explanation instead of a protocol error.

use crate::types::Error;
use serde_json::Value;

/// Validation failure: every violation plus a known-good input.
pub fn invalid_arguments(tool: &str, violations: &[String], example: &Value) -> String {
    let mut out = format!("Invalid arguments for {}:\n", tool);
    for violation in violations {
        out.push_str(&format!("- {}\n", violation));
    }
    let example = serde_json::to_string_pretty(example).unwrap_or_else(|_| example.to_string());
    out.push_str(&format!("\nExample input:\n{}", example));
    out
}

/// Remote or internal failure while serving `tool`.
pub fn call_failed(tool: &str, err: &Error) -> String {
    match err {
        Error::AuthFailure { status } => format!(
            "{} failed: authentication rejected (HTTP {}).\n\
             The Templation API key is invalid or has been revoked. \
             Generate a new key in the Templation dashboard and restart the MCP server with it.",
            tool, status
        ),
        Error::RateLimited { attempts } => format!(
            "{} failed: rate limited by the Templation API after {}.\n\
             Wait a minute before calling this tool again.",
            tool,
            attempts_text(*attempts)
        ),
        Error::ServerError { status, attempts } => format!(
            "{} failed: the Templation API returned HTTP {} after {}.\n\
             The service may be degraded. Try again shortly.",
            tool,
            status,
            attempts_text(*attempts)
        ),
        Error::Network { attempts, message } => format!(
            "{} failed: could not reach the Templation API after {} ({}).\n\
             Check the network connection and the configured API URL.",
            tool,
            attempts_text(*attempts),
            message
        ),
        Error::Rejected { status, detail } => format!(
            "{} failed: the Templation API rejected the request (HTTP {}): {}",
            tool, status, detail
        ),
        Error::InvalidResponse(msg) => format!(
            "{} failed: the Templation API sent a response that could not be read ({}).",
            tool, msg
        ),
        other => format!("{} failed: {}", tool, other),
    }
}

fn attempts_text(attempts: u32) -> String {
    if attempts == 1 {
        "1 attempt".to_string()
    } else {
        format!("{} attempts", attempts)
    }
}
