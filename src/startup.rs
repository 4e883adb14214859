//! Startup gate: one authenticated health check before any tool is served.

use crate::dispatch::Dispatcher;
use crate::remote::{RemoteApi, RemoteRequest};
use crate::types::Error;
use std::sync::Arc;
use thiserror::Error as ThisError;

/// Why the server refused to start.
#[derive(Debug, ThisError)]
pub enum StartupFailure {
    #[error("health check against {endpoint} failed: {source}")]
    HealthCheck {
        endpoint: String,
        #[source]
        source: Error,
    },
    #[error("tool table is invalid: {0}")]
    ToolTable(#[source] Error),
}

#[derive(Debug)]
pub enum StartupOutcome {
    /// The credential works; tool calls may be served.
    Ready(Dispatcher),
    Failed(StartupFailure),
}

impl StartupOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, StartupOutcome::Ready(_))
    }
}

/// Probe the API, then build the dispatcher. Never exits the process.
pub async fn open(remote: Arc<dyn RemoteApi>, cache_enabled: bool) -> StartupOutcome {
    let request = RemoteRequest::health_check();
    let endpoint = request.endpoint();

    if let Err(source) = remote.call(&request).await {
        tracing::error!(
            endpoint = %endpoint,
            classification = source.classification().map(|c| c.as_str()).unwrap_or("internal"),
            error = %source,
            "startup health check failed"
        );
        return StartupOutcome::Failed(StartupFailure::HealthCheck { endpoint, source });
    }
    tracing::info!(endpoint = %endpoint, "startup health check passed");

    match Dispatcher::with_builtin_tools(remote, cache_enabled) {
        Ok(dispatcher) => StartupOutcome::Ready(dispatcher),
        Err(e) => StartupOutcome::Failed(StartupFailure::ToolTable(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{MockRemoteApi, RemotePayload};
    use serde_json::json;

    #[tokio::test]
    async fn test_ready_after_successful_health_check() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call()
            .withf(|r| r.endpoint() == "/api/mcp/user/test")
            .times(1)
            .returning(|_| Ok(RemotePayload::Json(json!({"message": "Auth works!"}))));

        let outcome = open(Arc::new(mock), true).await;
        assert!(outcome.is_ready());
    }

    #[tokio::test]
    async fn test_failed_on_auth_error() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call()
            .times(1)
            .returning(|_| Err(Error::AuthFailure { status: 401 }));

        match open(Arc::new(mock), true).await {
            StartupOutcome::Failed(StartupFailure::HealthCheck { endpoint, source }) => {
                assert_eq!(endpoint, "/api/mcp/user/test");
                assert!(matches!(source, Error::AuthFailure { status: 401 }));
            }
            other => panic!("expected health check failure, got {:?}", other),
        }
    }
}
