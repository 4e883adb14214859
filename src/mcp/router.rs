//! MCP method router — maps JSON-RPC methods onto the dispatcher.

use crate::dispatch::Dispatcher;
use crate::mcp::codec::{decode_line, CallToolParams, Incoming, JsonRpcResponse};
use crate::mcp::PROTOCOL_VERSION;
use crate::types::{rpc_codes, Error};
use serde_json::{json, Value};

#[derive(Debug)]
pub struct Router {
    dispatcher: Dispatcher,
    server_name: String,
}

impl Router {
    pub fn new(dispatcher: Dispatcher, server_name: impl Into<String>) -> Self {
        Self {
            dispatcher,
            server_name: server_name.into(),
        }
    }

    /// Decode and route one line. `None` means nothing is written back.
    pub async fn handle_line(&self, line: &str) -> Option<JsonRpcResponse> {
        match decode_line(line) {
            Ok(incoming) => {
                tracing::debug!(method = incoming.method(), "message received");
                self.handle(incoming).await
            }
            Err(response) => {
                tracing::warn!(
                    code = response.error.as_ref().map(|e| e.code).unwrap_or_default(),
                    "undecodable message"
                );
                Some(response)
            }
        }
    }

    pub async fn handle(&self, incoming: Incoming) -> Option<JsonRpcResponse> {
        let (id, method, params) = match incoming {
            Incoming::Request { id, method, params } => (id, method, params),
            Incoming::Notification { method } => {
                tracing::debug!(method = %method, "notification received");
                return None;
            }
        };

        let response = match method.as_str() {
            "initialize" => JsonRpcResponse::success(id, self.initialize_result()),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, self.tools_list_result()),
            "tools/call" => self.tools_call(id, params).await,
            other => {
                tracing::debug!(method = other, "unknown method");
                JsonRpcResponse::failure(
                    id,
                    rpc_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", other),
                )
            }
        };
        Some(response)
    }

    fn initialize_result(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.server_name,
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }

    fn tools_list_result(&self) -> Value {
        let tools: Vec<Value> = self
            .dispatcher
            .list_tools()
            .into_iter()
            .map(|d| d.to_listing())
            .collect();
        json!({ "tools": tools })
    }

    async fn tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let params: CallToolParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => {
                return JsonRpcResponse::failure(
                    id,
                    rpc_codes::INVALID_PARAMS,
                    format!("Invalid tools/call params: {}", e),
                )
            }
        };

        match self.dispatcher.call_tool(&params.name, params.arguments).await {
            Ok(result) => match serde_json::to_value(&result) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(e) => JsonRpcResponse::from_error(id, &Error::internal(e.to_string())),
            },
            Err(e) => {
                tracing::info!(tool = %params.name, error = %e, "tools/call refused");
                JsonRpcResponse::from_error(id, &e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MockRemoteApi, RemotePayload};
    use std::sync::Arc;

    fn router(mock: MockRemoteApi) -> Router {
        let dispatcher = Dispatcher::with_builtin_tools(Arc::new(mock), true).unwrap();
        Router::new(dispatcher, "templation")
    }

    async fn call(router: &Router, line: &str) -> Option<Value> {
        router
            .handle_line(line)
            .await
            .map(|r| serde_json::to_value(r).unwrap())
    }

    #[tokio::test]
    async fn test_initialize() {
        let r = router(MockRemoteApi::new());
        let resp = call(&r, r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#)
            .await
            .unwrap();
        assert_eq!(resp["id"], 1);
        assert_eq!(resp["result"]["protocolVersion"], "2024-11-05");
        assert_eq!(resp["result"]["serverInfo"]["name"], "templation");
        assert!(resp["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_ping_and_notifications() {
        let r = router(MockRemoteApi::new());
        let resp = call(&r, r#"{"jsonrpc":"2.0","id":"p","method":"ping"}"#)
            .await
            .unwrap();
        assert_eq!(resp["result"], json!({}));

        assert!(call(&r, r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_tools_list() {
        let r = router(MockRemoteApi::new());
        let resp = call(&r, r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#)
            .await
            .unwrap();
        let tools = resp["result"]["tools"].as_array().unwrap();
        assert_eq!(tools.len(), 8);
        assert_eq!(tools[0]["name"], "search_templates");
        assert_eq!(tools[0]["inputSchema"]["type"], "object");
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let r = router(MockRemoteApi::new());
        let resp = call(&r, r#"{"jsonrpc":"2.0","id":3,"method":"resources/list"}"#)
            .await
            .unwrap();
        assert_eq!(resp["error"]["code"], rpc_codes::METHOD_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_tool_is_invalid_params() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call().times(0);
        let r = router(mock);
        let resp = call(
            &r,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"rm_rf","arguments":{}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(resp["error"]["code"], rpc_codes::INVALID_PARAMS);
        assert!(resp["error"]["message"].as_str().unwrap().contains("rm_rf"));
    }

    #[tokio::test]
    async fn test_malformed_call_params() {
        let r = router(MockRemoteApi::new());
        let resp = call(
            &r,
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{"arguments":{}}}"#,
        )
        .await
        .unwrap();
        assert_eq!(resp["error"]["code"], rpc_codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_tools_call_success() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call().times(1).returning(|_| {
            Ok(RemotePayload::Json(json!({
                "total_templates": 1,
                "repositories_analyzed": 2,
                "recent_activity": 0,
                "favorites": 0,
                "active_api_keys": 1
            })))
        });
        let r = router(mock);
        let resp = call(
            &r,
            r#"{"jsonrpc":"2.0","id":6,"method":"tools/call","params":{"name":"get_dashboard_stats"}}"#,
        )
        .await
        .unwrap();
        assert_eq!(resp["result"]["content"][0]["type"], "text");
        assert!(resp["result"]["content"][0]["text"]
            .as_str()
            .unwrap()
            .starts_with("Templation dashboard"));
        assert!(resp["result"].get("isError").is_none());
    }

    #[tokio::test]
    async fn test_parse_error() {
        let r = router(MockRemoteApi::new());
        let resp = call(&r, "{oops").await.unwrap();
        assert_eq!(resp["id"], Value::Null);
        assert_eq!(resp["error"]["code"], rpc_codes::PARSE_ERROR);
    }
}
