//! Tool dispatcher — validate, consult the cache, call the API, format.
//!
//! Per call: `Received → Validated → {CacheHit → Formatted | CacheMiss →
//! Calling → {Succeeded → Cached → Formatted | Failed → ErrorFormatted}}`.
//! Both terminal states produce a [`ToolResult`]. The only `Err` a caller
//! sees is [`Error::UnknownTool`].

mod result;

pub use result::{ContentBlock, ToolResult};

use crate::cache::{cache_key, ResponseCache};
use crate::format::failure;
use crate::remote::{RemoteApi, RemotePayload};
use crate::tools::{builtin_tools, ToolDescriptor, ToolRegistry, ToolSpec};
use crate::types::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub struct Dispatcher {
    registry: ToolRegistry,
    specs: HashMap<String, ToolSpec>,
    remote: Arc<dyn RemoteApi>,
    cache: Option<ResponseCache>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("tools", &self.registry.len())
            .field("cache", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    /// Build from a tool table. Fails if two specs share a name or a schema
    /// does not compile.
    pub fn new(
        specs: Vec<ToolSpec>,
        remote: Arc<dyn RemoteApi>,
        cache_enabled: bool,
    ) -> Result<Self> {
        let registry = ToolRegistry::new(specs.iter().map(|s| s.descriptor.clone()))?;
        let specs = specs
            .into_iter()
            .map(|s| (s.name().to_string(), s))
            .collect();

        Ok(Self {
            registry,
            specs,
            remote,
            cache: cache_enabled.then(ResponseCache::new),
        })
    }

    /// Dispatcher over the built-in Templation tools.
    pub fn with_builtin_tools(remote: Arc<dyn RemoteApi>, cache_enabled: bool) -> Result<Self> {
        Self::new(builtin_tools(), remote, cache_enabled)
    }

    /// Descriptors in registration order.
    pub fn list_tools(&self) -> Vec<&ToolDescriptor> {
        self.registry.describe_all()
    }

    pub fn cache(&self) -> Option<&ResponseCache> {
        self.cache.as_ref()
    }

    /// Run one tool call to completion.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<ToolResult> {
        let spec = self
            .specs
            .get(name)
            .ok_or_else(|| Error::unknown_tool(name))?;

        let args = match self.registry.validate(name, arguments) {
            Ok(args) => args,
            Err(Error::InvalidArguments { violations, .. }) => {
                tracing::info!(
                    tool = name,
                    violations = violations.len(),
                    "tool arguments rejected"
                );
                return Ok(ToolResult::error(failure::invalid_arguments(
                    name,
                    &violations,
                    &spec.descriptor.example,
                )));
            }
            Err(e) => return Err(e),
        };

        let request = match (spec.build_request)(&args) {
            Ok(request) => request,
            Err(e) => {
                tracing::error!(tool = name, error = %e, "could not build remote request");
                return Ok(ToolResult::error(failure::call_failed(name, &e)));
            }
        };

        let cacheable = self.cache.as_ref().zip(spec.cache_ttl);
        let key = cacheable.map(|_| cache_key(name, &args));

        if let (Some((cache, _)), Some(key)) = (cacheable, key.as_deref()) {
            if let Some(payload) = cache.get(key) {
                tracing::debug!(tool = name, cache = "hit", "serving cached result");
                return Ok(render(spec, &payload, &args));
            }
            tracing::debug!(tool = name, cache = "miss", "cache miss");
        }

        match self.remote.call(&request).await {
            Ok(payload) => {
                let result = render(spec, &payload, &args);
                if let (Some((cache, ttl)), Some(key)) = (cacheable, key) {
                    cache.set(key, payload, ttl);
                }
                if let Some(cache) = &self.cache {
                    for stale in spec.invalidates {
                        let dropped = cache.invalidate_tool(stale);
                        if dropped > 0 {
                            tracing::debug!(
                                tool = name,
                                invalidated = *stale,
                                dropped,
                                "cache invalidated"
                            );
                        }
                    }
                }
                tracing::info!(tool = name, endpoint = %request.endpoint(), "tool call succeeded");
                Ok(result)
            }
            Err(e) => {
                tracing::warn!(
                    tool = name,
                    endpoint = %request.endpoint(),
                    classification = e.classification().map(|c| c.as_str()).unwrap_or("internal"),
                    error = %e,
                    "tool call failed"
                );
                Ok(ToolResult::error(failure::call_failed(name, &e)))
            }
        }
    }
}

fn render(spec: &ToolSpec, payload: &RemotePayload, args: &Value) -> ToolResult {
    match payload {
        RemotePayload::Json(value) => ToolResult::text((spec.format)(value, args)),
        RemotePayload::Text(text) => ToolResult::text(text.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::MockRemoteApi;
    use crate::tools::builtin::{
        GET_TEMPLATE_DETAILS, GET_USER_INFO, MARK_TEMPLATE_USED, SEARCH_TEMPLATES,
        TEMPLATE_CONVERTER,
    };
    use mockall::predicate::function;
    use serde_json::json;

    fn dispatcher(mock: MockRemoteApi, cache: bool) -> Dispatcher {
        Dispatcher::with_builtin_tools(Arc::new(mock), cache).unwrap()
    }

    fn template_list() -> RemotePayload {
        RemotePayload::Json(json!([{"id": "t-1", "name": "React Dashboard", "tags": ["react"]}]))
    }

    #[tokio::test]
    async fn test_unknown_tool_is_protocol_error() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call().times(0);
        let d = dispatcher(mock, true);

        let err = d.call_tool("delete_everything", None).await.unwrap_err();
        assert!(matches!(err, Error::UnknownTool(ref n) if n == "delete_everything"));
    }

    #[tokio::test]
    async fn test_validation_failure_makes_no_remote_call() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call().times(0);
        let d = dispatcher(mock, true);

        let result = d
            .call_tool(SEARCH_TEMPLATES, Some(json!({"limit": 500})))
            .await
            .unwrap();
        assert!(result.is_error);
        let text = result.joined_text();
        assert!(text.starts_with("Invalid arguments for search_templates:"));
        assert!(text.contains("query"));
        assert!(text.contains("limit"));
        assert!(text.contains("Example input:"));
    }

    #[tokio::test]
    async fn test_cache_hit_skips_second_call() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call()
            .with(function(|r: &crate::remote::RemoteRequest| {
                r.endpoint() == "/api/mcp/search/templates"
            }))
            .times(1)
            .returning(|_| Ok(template_list()));
        let d = dispatcher(mock, true);

        let first = d
            .call_tool(SEARCH_TEMPLATES, Some(json!({"query": "react"})))
            .await
            .unwrap();
        // Same arguments after default filling, different key order.
        let second = d
            .call_tool(SEARCH_TEMPLATES, Some(json!({"limit": 10, "query": "react"})))
            .await
            .unwrap();

        assert!(!first.is_error);
        assert_eq!(first, second);
        assert!(first.joined_text().contains("1. React Dashboard"));
        assert_eq!(d.cache().map(ResponseCache::len), Some(1));
    }

    #[tokio::test]
    async fn test_cache_disabled_calls_every_time() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call().times(2).returning(|_| Ok(template_list()));
        let d = dispatcher(mock, false);

        for _ in 0..2 {
            d.call_tool(SEARCH_TEMPLATES, Some(json!({"query": "react"})))
                .await
                .unwrap();
        }
        assert!(d.cache().is_none());
    }

    #[tokio::test]
    async fn test_uncached_tool_calls_every_time() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call()
            .times(2)
            .returning(|_| Ok(RemotePayload::Json(json!({"id": "u-1", "name": "Dev"}))));
        let d = dispatcher(mock, true);

        for _ in 0..2 {
            let result = d.call_tool(GET_USER_INFO, None).await.unwrap();
            assert!(result.joined_text().starts_with("Account: Dev"));
        }
        assert_eq!(d.cache().map(ResponseCache::len), Some(0));
    }

    #[tokio::test]
    async fn test_remote_failure_becomes_error_result_and_is_not_cached() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call()
            .times(2)
            .returning(|_| Err(Error::AuthFailure { status: 401 }));
        let d = dispatcher(mock, true);

        for _ in 0..2 {
            let result = d
                .call_tool(SEARCH_TEMPLATES, Some(json!({"query": "react"})))
                .await
                .unwrap();
            assert!(result.is_error);
            assert!(result
                .joined_text()
                .contains("search_templates failed: authentication rejected (HTTP 401)"));
        }
    }

    #[tokio::test]
    async fn test_mark_used_refreshes_cached_details() {
        let mut seq = mockall::Sequence::new();
        let mut mock = MockRemoteApi::new();
        for (usage, endpoint) in [
            (0, "/api/mcp/templates/t-1"),
            (1, "/api/mcp/templates/t-1/usage"),
            (1, "/api/mcp/templates/t-1"),
        ] {
            mock.expect_call()
                .with(function(move |r: &crate::remote::RemoteRequest| r.endpoint() == endpoint))
                .times(1)
                .in_sequence(&mut seq)
                .returning(move |_| {
                    Ok(RemotePayload::Json(json!({
                        "id": "t-1",
                        "name": "React Dashboard",
                        "usage_count": usage
                    })))
                });
        }
        let d = dispatcher(mock, true);
        let args = json!({"template_id": "t-1"});

        let before = d.call_tool(GET_TEMPLATE_DETAILS, Some(args.clone())).await.unwrap();
        d.call_tool(MARK_TEMPLATE_USED, Some(args.clone())).await.unwrap();
        let after = d.call_tool(GET_TEMPLATE_DETAILS, Some(args)).await.unwrap();

        assert!(before.joined_text().contains("Usage: 0 uses"));
        assert!(after.joined_text().contains("Usage: 1 use"));
    }

    #[tokio::test]
    async fn test_text_payload_passes_through() {
        let mut mock = MockRemoteApi::new();
        mock.expect_call()
            .times(1)
            .returning(|_| Ok(RemotePayload::Text("plain body".to_string())));
        let d = dispatcher(mock, true);

        let result = d
            .call_tool(
                TEMPLATE_CONVERTER,
                Some(json!({
                    "repo_url": "https://github.com/acme/shop",
                    "template_description": "storefront starter"
                })),
            )
            .await
            .unwrap();
        assert_eq!(result, ToolResult::text("plain body"));
    }

    #[test]
    fn test_list_tools_matches_builtin_table() {
        let d = dispatcher(MockRemoteApi::new(), true);
        let names: Vec<&str> = d.list_tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names.len(), builtin_tools().len());
        assert_eq!(names[0], SEARCH_TEMPLATES);
    }

    #[test]
    fn test_duplicate_tool_names_rejected() {
        let mut specs = builtin_tools();
        specs.push(specs[0].clone());
        let err = Dispatcher::new(specs, Arc::new(MockRemoteApi::new()), true).unwrap_err();
        assert!(matches!(err, Error::Schema(_)));
    }
}
