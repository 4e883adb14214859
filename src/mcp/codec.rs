//! JSON-RPC 2.0 message codec for the MCP stdio transport.
//!
//! Framing is one JSON document per line ([`FrameCodec`] over
//! `tokio_util::codec::LinesCodec`); this module turns a line into an
//! [`Incoming`] message and a [`JsonRpcResponse`] back into a line.

use crate::types::{rpc_codes, Error, Result};
use bytes::BytesMut;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::codec::{Decoder, LinesCodec, LinesCodecError};

pub const JSONRPC_VERSION: &str = "2.0";

/// A decoded inbound message.
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    /// Carries an `id`; exactly one response is owed.
    Request {
        id: Value,
        method: String,
        params: Value,
    },
    /// No `id`; never answered.
    Notification { method: String },
}

impl Incoming {
    pub fn method(&self) -> &str {
        match self {
            Incoming::Request { method, .. } | Incoming::Notification { method } => method,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: &'static str,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
            }),
        }
    }

    pub fn from_error(id: Value, err: &Error) -> Self {
        Self::failure(id, err.rpc_code(), err.to_string())
    }
}

/// `tools/call` parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct CallToolParams {
    pub name: String,
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// One unit read off the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Line(String),
    /// A line over the length limit. Its bytes are dropped up to the next newline.
    Oversized,
}

/// Line framing that reports an over-long line as [`Frame::Oversized`]
/// instead of an error, so the stream keeps yielding the lines after it.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    lines: LinesCodec,
}

impl FrameCodec {
    pub fn new(max_line_bytes: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_line_bytes),
        }
    }
}

fn recover(
    decoded: std::result::Result<Option<String>, LinesCodecError>,
) -> std::result::Result<Option<Frame>, LinesCodecError> {
    match decoded {
        Ok(line) => Ok(line.map(Frame::Line)),
        Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(Frame::Oversized)),
        Err(e) => Err(e),
    }
}

impl Decoder for FrameCodec {
    type Item = Frame;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> std::result::Result<Option<Frame>, Self::Error> {
        recover(self.lines.decode(buf))
    }

    fn decode_eof(
        &mut self,
        buf: &mut BytesMut,
    ) -> std::result::Result<Option<Frame>, Self::Error> {
        recover(self.lines.decode_eof(buf))
    }
}

/// Decode one line. On failure, returns the error response to send back.
pub fn decode_line(line: &str) -> std::result::Result<Incoming, JsonRpcResponse> {
    let value: Value = serde_json::from_str(line).map_err(|e| {
        JsonRpcResponse::failure(
            Value::Null,
            rpc_codes::PARSE_ERROR,
            format!("Parse error: {}", e),
        )
    })?;

    let Value::Object(mut object) = value else {
        return Err(JsonRpcResponse::failure(
            Value::Null,
            rpc_codes::INVALID_REQUEST,
            "Invalid request: expected a JSON object",
        ));
    };

    let id = object.remove("id");
    let method = match object.remove("method") {
        Some(Value::String(method)) => method,
        _ => {
            return Err(JsonRpcResponse::failure(
                id.unwrap_or(Value::Null),
                rpc_codes::INVALID_REQUEST,
                "Invalid request: missing method",
            ))
        }
    };

    Ok(match id {
        Some(id) => Incoming::Request {
            id,
            method,
            params: object.remove("params").unwrap_or(Value::Null),
        },
        None => Incoming::Notification { method },
    })
}

/// Encode a response as one line (without the trailing newline).
pub fn encode_response(response: &JsonRpcResponse) -> Result<String> {
    Ok(serde_json::to_string(response)?)
}
