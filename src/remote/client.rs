//! reqwest-backed [`RemoteApi`] with classification and bounded retry.

use super::{
    classify_status, Classification, RemoteApi, RemoteCallAttempt, RemotePayload, RemoteRequest,
    RetryPolicy, API_PREFIX,
};
use crate::types::{Error, RemoteConfig, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Response, Url};
use secrecy::{ExposeSecret, SecretString};

/// Identifies this client to the API on every request.
pub const USER_AGENT: &str = concat!("templation-mcp/", env!("CARGO_PKG_VERSION"));

/// Longest rejection detail carried into error text.
const MAX_DETAIL_CHARS: usize = 300;

/// Authenticated HTTP client for the Templation API.
#[derive(Debug)]
pub struct RemoteClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    policy: RetryPolicy,
}

impl RemoteClient {
    pub fn new(config: &RemoteConfig, api_key: SecretString) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(config.base_url.trim())
            .map_err(|e| Error::config(format!("invalid base_url '{}': {}", config.base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::config(format!(
                "base_url '{}' cannot carry a path",
                config.base_url
            )));
        }

        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url,
            api_key,
            policy: RetryPolicy::from_config(config),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Absolute URL for a request: base + [`API_PREFIX`] + path, with query appended.
    pub fn url_for(&self, request: &RemoteRequest) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::config("base_url cannot carry a path"))?;
            segments.pop_if_empty();
            segments.extend(API_PREFIX);
            segments.extend(&request.path);
        }
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// One HTTP exchange. Errors carry `attempt` as their attempt count.
    async fn attempt(
        &self,
        request: &RemoteRequest,
        url: &Url,
        attempt: u32,
    ) -> Result<RemotePayload> {
        let mut builder = self
            .http
            .request(request.method.clone(), url.clone())
            .bearer_auth(self.api_key.expose_secret());
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::network(attempt, describe_transport_error(&e)))?;

        let status = response.status();
        match classify_status(status) {
            Classification::Success => decode_body(response, attempt).await,
            Classification::AuthFailure => Err(Error::AuthFailure {
                status: status.as_u16(),
            }),
            Classification::RateLimited => Err(Error::RateLimited { attempts: attempt }),
            Classification::ServerError => Err(Error::ServerError {
                status: status.as_u16(),
                attempts: attempt,
            }),
            Classification::NetworkError | Classification::Rejected => {
                let detail = rejection_detail(response).await;
                Err(Error::rejected(status.as_u16(), detail))
            }
        }
    }
}

#[async_trait]
impl RemoteApi for RemoteClient {
    async fn call(&self, request: &RemoteRequest) -> Result<RemotePayload> {
        let url = self.url_for(request)?;
        let endpoint = request.endpoint();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let result = self.attempt(request, &url, attempt).await;

            RemoteCallAttempt {
                endpoint: endpoint.clone(),
                method: request.method.clone(),
                attempt,
                classification: match &result {
                    Ok(_) => Classification::Success,
                    Err(e) => e.classification().unwrap_or(Classification::Rejected),
                },
            }
            .log();

            match result {
                Ok(payload) => return Ok(payload),
                Err(err) if err.is_retryable() && self.policy.has_remaining(attempt) => {
                    let delay = self.policy.backoff(attempt);
                    tracing::debug!(
                        endpoint = %endpoint,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("request timed out ({})", err)
    } else if err.is_connect() {
        format!("connection failed ({})", err)
    } else {
        err.to_string()
    }
}

async fn decode_body(response: Response, attempt: u32) -> Result<RemotePayload> {
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("json"));

    let text = response
        .text()
        .await
        .map_err(|e| Error::network(attempt, describe_transport_error(&e)))?;

    if is_json {
        serde_json::from_str(&text)
            .map(RemotePayload::Json)
            .map_err(|e| Error::invalid_response(format!("malformed JSON body: {}", e)))
    } else {
        Ok(RemotePayload::Text(text))
    }
}

/// FastAPI puts the reason in `{"detail": ...}`; fall back to the raw body or reason phrase.
async fn rejection_detail(response: Response) -> String {
    let reason = response
        .status()
        .canonical_reason()
        .unwrap_or("request rejected")
        .to_string();
    let text = response.text().await.unwrap_or_default();

    let detail = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("detail").map(detail_text))
        .unwrap_or_else(|| text.trim().to_string());

    if detail.is_empty() {
        reason
    } else {
        detail.chars().take(MAX_DETAIL_CHARS).collect()
    }
}

fn detail_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn client(base_url: &str) -> RemoteClient {
        let config = RemoteConfig {
            base_url: base_url.to_string(),
            ..RemoteConfig::default()
        };
        RemoteClient::new(&config, SecretString::from("test-key")).unwrap()
    }

    #[test]
    fn test_url_for_joins_prefix_and_path() {
        let client = client("http://localhost:8000");
        let url = client
            .url_for(&RemoteRequest::get(["search", "templates"]).with_query("q", "react app"))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/mcp/search/templates?q=react+app"
        );
    }

    #[test]
    fn test_url_for_keeps_base_path_and_encodes_segments() {
        let client = client("https://example.test/backend/");
        let url = client
            .url_for(&RemoteRequest::get(["templates", "a b/c"]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.test/backend/api/mcp/templates/a%20b%2Fc"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = RemoteConfig {
            base_url: "not a url".to_string(),
            ..RemoteConfig::default()
        };
        let err = RemoteClient::new(&config, SecretString::from("k")).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_policy_comes_from_config() {
        let config = RemoteConfig {
            max_attempts: 4,
            backoff_base: Duration::from_millis(10),
            ..RemoteConfig::default()
        };
        let client = RemoteClient::new(&config, SecretString::from("k")).unwrap();
        assert_eq!(client.policy(), RetryPolicy::new(4, Duration::from_millis(10)));
    }

    #[test]
    fn test_debug_does_not_leak_key() {
        let client = client("http://localhost:8000");
        assert!(!format!("{:?}", client).contains("test-key"));
    }

    #[test]
    fn test_detail_text() {
        assert_eq!(detail_text(&serde_json::json!("Template not found")), "Template not found");
        assert_eq!(
            detail_text(&serde_json::json!([{"msg": "field required"}])),
            r#"[{"msg":"field required"}]"#
        );
    }
}
