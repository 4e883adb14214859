//! Scripted Templation API stand-in for integration tests.

#![allow(dead_code)]

use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use parking_lot::Mutex;
use secrecy::SecretString;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use templation_mcp::remote::RemoteClient;
use templation_mcp::types::RemoteConfig;
use tokio::net::TcpListener;

pub const TEST_KEY: &str = "tmpl_test_key";

/// One canned reply.
#[derive(Debug, Clone)]
pub enum Reply {
    Json(StatusCode, Value),
    Text(StatusCode, &'static str),
    /// JSON content-type with an unparseable body.
    BrokenJson,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Reply::Json(StatusCode::OK, body)
    }

    pub fn status(status: u16) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        Reply::Json(
            status,
            serde_json::json!({"detail": status.canonical_reason().unwrap_or("error")}),
        )
    }
}

/// What the server saw for one request.
#[derive(Debug, Clone)]
pub struct Hit {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

#[derive(Clone, Default)]
struct Script {
    replies: Arc<Mutex<VecDeque<Reply>>>,
    hits: Arc<Mutex<Vec<Hit>>>,
}

/// Running mock server. Replies are served in order; the last one repeats.
pub struct MockApi {
    pub base_url: String,
    script: Script,
    shutdown: Option<tokio::sync::oneshot::Sender<()>>,
}

impl MockApi {
    pub async fn start(replies: Vec<Reply>) -> Self {
        let script = Script {
            replies: Arc::new(Mutex::new(replies.into())),
            hits: Arc::default(),
        };
        let app = Router::new().fallback(handle).with_state(script.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local_addr");
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let server = axum::serve(listener, app).with_graceful_shutdown(async move {
            let _ = shutdown_rx.await;
        });
        tokio::spawn(async move { server.await });

        Self {
            base_url: format!("http://{addr}"),
            script,
            shutdown: Some(shutdown_tx),
        }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.script.hits.lock().clone()
    }

    pub fn hit_count(&self) -> usize {
        self.script.hits.lock().len()
    }

    /// Client with a short backoff so retry tests stay fast.
    pub fn client(&self, max_attempts: u32) -> RemoteClient {
        client_for(&self.base_url, max_attempts)
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

pub fn client_for(base_url: &str, max_attempts: u32) -> RemoteClient {
    let config = RemoteConfig {
        base_url: base_url.to_string(),
        max_attempts,
        backoff_base: Duration::from_millis(10),
        request_timeout: Duration::from_secs(5),
    };
    RemoteClient::new(&config, SecretString::from(TEST_KEY.to_string())).expect("client")
}

/// Base URL of a port nothing listens on.
pub async fn unreachable_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local_addr");
    drop(listener);
    format!("http://{addr}")
}

async fn handle(
    State(script): State<Script>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    script.hits.lock().push(Hit {
        method,
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        authorization: headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });

    let reply = {
        let mut replies = script.replies.lock();
        if replies.len() > 1 {
            replies.pop_front()
        } else {
            replies.front().cloned()
        }
    };

    match reply {
        Some(Reply::Json(status, body)) => (status, axum::Json(body)).into_response(),
        Some(Reply::Text(status, body)) => (status, body).into_response(),
        Some(Reply::BrokenJson) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            "{\"truncated\": ",
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
