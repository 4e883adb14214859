//! Stdio MCP server — read loop, per-request tasks, single writer.
//!
//! Requests are handled concurrently; responses may leave in a different
//! order than requests arrived, and are matched by `id`. One writer task owns
//! the output so lines never interleave.

use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tokio_util::sync::CancellationToken;

use crate::dispatch::Dispatcher;
use crate::mcp::codec::{encode_response, Frame, FrameCodec, JsonRpcResponse};
use crate::mcp::router::Router;
use crate::types::{rpc_codes, Result, ServerConfig};

/// MCP server wrapping a ready dispatcher.
#[derive(Debug)]
pub struct McpServer {
    router: Arc<Router>,
    config: ServerConfig,
    cancel: CancellationToken,
}

impl McpServer {
    pub fn new(dispatcher: Dispatcher, config: ServerConfig) -> Self {
        Self {
            router: Arc::new(Router::new(dispatcher, config.name.clone())),
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Token that stops the read loop when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request graceful shutdown.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Serve on the process's stdin/stdout.
    pub async fn serve_stdio(&self) -> Result<()> {
        self.serve(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Serve until EOF on `reader` or cancellation. In-flight requests are
    /// drained and their responses written before returning.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let mut frames = FramedRead::new(reader, FrameCodec::new(self.config.max_line_bytes));
        let (tx, rx) = mpsc::channel::<String>(self.config.response_channel_capacity);
        let writer_task = tokio::spawn(write_responses(writer, rx));
        let mut in_flight = JoinSet::new();

        tracing::info!(
            server = %self.config.name,
            max_line_bytes = self.config.max_line_bytes,
            "MCP server listening on stdio"
        );

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("MCP server shutting down");
                    break;
                }
                frame = frames.next() => {
                    let line = match frame {
                        None => {
                            tracing::info!("input closed");
                            break;
                        }
                        Some(Ok(Frame::Line(line))) => line,
                        Some(Ok(Frame::Oversized)) => {
                            tracing::warn!(
                                max = self.config.max_line_bytes,
                                "message exceeds line limit"
                            );
                            let response = JsonRpcResponse::failure(
                                serde_json::Value::Null,
                                rpc_codes::INVALID_REQUEST,
                                "Invalid request: message too large",
                            );
                            send(&tx, &response).await;
                            continue;
                        }
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "stdin read failed");
                            break;
                        }
                    };

                    if line.trim().is_empty() {
                        continue;
                    }

                    let router = Arc::clone(&self.router);
                    let tx = tx.clone();
                    in_flight.spawn(async move {
                        if let Some(response) = router.handle_line(&line).await {
                            send(&tx, &response).await;
                        }
                    });

                    while let Some(joined) = in_flight.try_join_next() {
                        log_join(joined);
                    }
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            log_join(joined);
        }
        drop(tx);

        match writer_task.await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(error = %e, "response writer panicked");
                Ok(())
            }
        }
    }
}

async fn send(tx: &mpsc::Sender<String>, response: &JsonRpcResponse) {
    match encode_response(response) {
        Ok(line) => {
            if tx.send(line).await.is_err() {
                tracing::warn!("response dropped: writer closed");
            }
        }
        Err(e) => tracing::error!(error = %e, "could not encode response"),
    }
}

async fn write_responses<W>(writer: W, mut rx: mpsc::Receiver<String>) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut sink = FramedWrite::new(writer, LinesCodec::new());
    while let Some(line) = rx.recv().await {
        if let Err(e) = sink.send(line).await {
            tracing::error!(error = %e, "stdout write failed");
            return Err(match e {
                LinesCodecError::Io(io) => io.into(),
                other => crate::types::Error::internal(other.to_string()),
            });
        }
    }
    Ok(())
}

fn log_join(joined: std::result::Result<(), tokio::task::JoinError>) {
    if let Err(e) = joined {
        tracing::error!(error = %e, "request task failed");
    }
}
