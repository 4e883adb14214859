//! Templation MCP server - stdio entry point.
//!
//! Resolves the API key, checks it against the Templation API, then serves
//! MCP over stdin/stdout until EOF or Ctrl-C. Logs go to stderr.

use clap::{builder::FalseyValueParser, Parser, ValueEnum};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use templation_mcp::mcp::McpServer;
use templation_mcp::observability::init_tracing;
use templation_mcp::remote::RemoteClient;
use templation_mcp::startup::{self, StartupOutcome};
use templation_mcp::types::{resolve_api_key, API_KEY_ENV};
use templation_mcp::Config;

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
enum LogFormat {
    #[default]
    Compact,
    Json,
}

/// MCP server exposing Templation tools over stdio.
#[derive(Debug, Parser)]
#[command(name = "templation-mcp", version, about)]
struct Cli {
    /// Templation API key (falls back to TEMPLATION_API_KEY).
    api_key: Option<String>,

    /// Base URL of the Templation API.
    #[arg(long, env = "TEMPLATION_API_URL", default_value = "http://localhost:8000")]
    api_url: String,

    /// Attempts per API call, including the first.
    #[arg(long, env = "TEMPLATION_MAX_ATTEMPTS", default_value_t = 2)]
    max_attempts: u32,

    /// Backoff unit between attempts (the n-th retry waits n times this).
    #[arg(
        long,
        env = "TEMPLATION_BACKOFF_BASE",
        default_value = "300ms",
        value_parser = parse_duration
    )]
    backoff_base: Duration,

    /// Timeout for a single attempt.
    #[arg(
        long,
        env = "TEMPLATION_REQUEST_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration
    )]
    request_timeout: Duration,

    /// Disable the response cache.
    #[arg(long, env = "TEMPLATION_NO_CACHE", value_parser = FalseyValueParser::new())]
    no_cache: bool,

    /// Log output format (logs always go to stderr).
    #[arg(long, env = "TEMPLATION_LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::default();
        config.remote.base_url = self.api_url.clone();
        config.remote.max_attempts = self.max_attempts;
        config.remote.backoff_base = self.backoff_base;
        config.remote.request_timeout = self.request_timeout;
        config.cache.enabled = !self.no_cache;
        config.observability.json_logs = matches!(self.log_format, LogFormat::Json);
        config
    }
}

fn parse_duration(raw: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(raw).map_err(|e| e.to_string())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config();
    init_tracing(&config.observability);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    let code = runtime.block_on(run(cli.api_key, config));
    // tokio's stdin reader sits in a blocking thread that never returns on its own.
    runtime.shutdown_timeout(Duration::from_millis(200));
    code
}

async fn run(api_key: Option<String>, config: Config) -> ExitCode {
    let api_key = match resolve_api_key(api_key, std::env::var(API_KEY_ENV).ok()) {
        Ok(key) => key,
        Err(e) => {
            tracing::error!(error = %e, "missing credential");
            return ExitCode::FAILURE;
        }
    };

    let client = match RemoteClient::new(&config.remote, api_key) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(error = %e, "invalid remote configuration");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        base_url = %client.base_url(),
        max_attempts = config.remote.max_attempts,
        cache = config.cache.enabled,
        "Templation MCP server starting"
    );

    let dispatcher = match startup::open(Arc::new(client), config.cache.enabled).await {
        StartupOutcome::Ready(dispatcher) => dispatcher,
        StartupOutcome::Failed(failure) => {
            tracing::error!(error = %failure, "startup failed");
            return ExitCode::FAILURE;
        }
    };

    let server = McpServer::new(dispatcher, config.server);
    let cancel = server.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            cancel.cancel();
        }
    });

    match server.serve_stdio().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "server stopped with error");
            ExitCode::FAILURE
        }
    }
}
