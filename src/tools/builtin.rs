//! The built-in Templation tools.
//!
//! Each entry pairs a descriptor with its cache TTL, a pure request builder
//! and the formatter for its payload.

use super::{ParamDef, ParamType, ToolDescriptor, ToolSpec};
use crate::format;
use crate::remote::RemoteRequest;
use crate::types::{Error, Result};
use serde_json::{json, Map, Value};
use std::time::Duration;

pub const SEARCH_TEMPLATES: &str = "search_templates";
pub const SEARCH_EXEMPLAR: &str = "search_exemplar";
pub const TEMPLATE_CONVERTER: &str = "template_converter";
pub const GET_TEMPLATE_DETAILS: &str = "get_template_details";
pub const MARK_TEMPLATE_USED: &str = "mark_template_used";
pub const GET_RECENT_REPOSITORIES: &str = "get_recent_repositories";
pub const GET_USER_INFO: &str = "get_user_info";
pub const GET_DASHBOARD_STATS: &str = "get_dashboard_stats";

/// Accepted shape of a GitHub repository URL.
pub const GITHUB_REPO_PATTERN: &str = r"^https://github\.com/[^/]+/[^/]+/?$";

const TEMPLATE_ID_PATTERN: &str = r"^[^/\s]+$";

const TEMPLATE_SEARCH_TTL: Duration = Duration::from_secs(3 * 60);
const REPOSITORY_DISCOVERY_TTL: Duration = Duration::from_secs(10 * 60);
const RECENT_REPOSITORIES_TTL: Duration = Duration::from_secs(2 * 60);

/// The full tool table, in `tools/list` order.
pub fn builtin_tools() -> Vec<ToolSpec> {
    vec![
        ToolSpec {
            descriptor: ToolDescriptor {
                name: SEARCH_TEMPLATES.to_string(),
                description: "Search your saved Templation templates by name, description or \
                              tech stack. Returns the best matches with usage statistics."
                    .to_string(),
                parameters: vec![
                    ParamDef::string("query", "Free-text search, e.g. 'react dashboard'")
                        .required()
                        .length(Some(1), Some(200)),
                    ParamDef::int("limit", "Maximum number of templates to return")
                        .range(Some(1), Some(50))
                        .default_value(json!(10)),
                ],
                example: json!({ "query": "react dashboard", "limit": 5 }),
            },
            cache_ttl: Some(TEMPLATE_SEARCH_TTL),
            invalidates: &[],
            build_request: search_templates_request,
            format: format::templates::search_results,
        },
        ToolSpec {
            descriptor: ToolDescriptor {
                name: SEARCH_EXEMPLAR.to_string(),
                description: "Find GitHub repositories that match a description of what you \
                              want to build, ranked for use as a starting template."
                    .to_string(),
                parameters: vec![
                    ParamDef::string("description", "What you want to build")
                        .required()
                        .length(Some(3), Some(500)),
                    ParamDef::object(
                        "filters",
                        "Optional search filters",
                        vec![
                            ParamDef::string("language", "Primary language, e.g. 'TypeScript'")
                                .length(Some(1), Some(50)),
                            ParamDef::int("min_stars", "Minimum GitHub stars")
                                .range(Some(0), None),
                            ParamDef::int(
                                "max_age_days",
                                "Only repositories updated within this many days",
                            )
                            .range(Some(1), None),
                        ],
                    ),
                ],
                example: json!({
                    "description": "portfolio site with blog and dark mode",
                    "filters": { "language": "TypeScript", "min_stars": 100 }
                }),
            },
            cache_ttl: Some(REPOSITORY_DISCOVERY_TTL),
            invalidates: &[],
            build_request: search_exemplar_request,
            format: format::repositories::exemplar_results,
        },
        ToolSpec {
            descriptor: ToolDescriptor {
                name: TEMPLATE_CONVERTER.to_string(),
                description: "Convert a GitHub repository into a personalised template with \
                              step-by-step conversion instructions."
                    .to_string(),
                parameters: vec![
                    ParamDef::string(
                        "repo_url",
                        "GitHub URL, e.g. https://github.com/owner/repository",
                    )
                    .required()
                    .pattern(GITHUB_REPO_PATTERN),
                    ParamDef::string("template_description", "What the template should become")
                        .required()
                        .length(Some(1), Some(1000)),
                    ParamDef::object(
                        "user_context",
                        "Optional personalisation",
                        vec![
                            ParamDef::string("project_name", "Name for the new project"),
                            ParamDef::string(
                                "preferred_style",
                                "Styling preference, e.g. 'minimal'",
                            ),
                            ParamDef::string_list("additional_features", "Features to add"),
                        ],
                    ),
                ],
                example: json!({
                    "repo_url": "https://github.com/vercel/next.js",
                    "template_description": "Next.js starter for a SaaS landing page",
                    "user_context": { "project_name": "launchpad", "preferred_style": "minimal" }
                }),
            },
            cache_ttl: None,
            invalidates: &[SEARCH_TEMPLATES],
            build_request: template_converter_request,
            format: format::conversion::conversion_result,
        },
        ToolSpec {
            descriptor: ToolDescriptor {
                name: GET_TEMPLATE_DETAILS.to_string(),
                description: "Get the full details of one of your templates by its ID.".to_string(),
                parameters: vec![template_id_param()],
                example: json!({ "template_id": "3f6c2a9e-1b7d-4c55-9a43-2d0f9c1e8b21" }),
            },
            cache_ttl: Some(TEMPLATE_SEARCH_TTL),
            invalidates: &[],
            build_request: template_details_request,
            format: format::templates::template_details,
        },
        ToolSpec {
            descriptor: ToolDescriptor {
                name: MARK_TEMPLATE_USED.to_string(),
                description: "Record that a template was used, updating its usage count and \
                              last-used date."
                    .to_string(),
                parameters: vec![template_id_param()],
                example: json!({ "template_id": "3f6c2a9e-1b7d-4c55-9a43-2d0f9c1e8b21" }),
            },
            cache_ttl: None,
            invalidates: &[GET_TEMPLATE_DETAILS, SEARCH_TEMPLATES],
            build_request: mark_template_used_request,
            format: format::templates::usage_update,
        },
        ToolSpec {
            descriptor: ToolDescriptor {
                name: GET_RECENT_REPOSITORIES.to_string(),
                description: "List repositories you recently searched for or analysed.".to_string(),
                parameters: vec![ParamDef::int("limit", "Maximum number of repositories")
                    .range(Some(1), Some(50))
                    .default_value(json!(20))],
                example: json!({ "limit": 10 }),
            },
            cache_ttl: Some(RECENT_REPOSITORIES_TTL),
            invalidates: &[],
            build_request: recent_repositories_request,
            format: format::repositories::recent_repositories,
        },
        ToolSpec {
            descriptor: ToolDescriptor {
                name: GET_USER_INFO.to_string(),
                description: "Show the account connected to this API key.".to_string(),
                parameters: vec![],
                example: json!({}),
            },
            cache_ttl: None,
            invalidates: &[],
            build_request: |_| Ok(RemoteRequest::get(["user", "me"])),
            format: format::account::user_info,
        },
        ToolSpec {
            descriptor: ToolDescriptor {
                name: GET_DASHBOARD_STATS.to_string(),
                description: "Show account statistics: templates, analysed repositories, \
                              favourites and active API keys."
                    .to_string(),
                parameters: vec![],
                example: json!({}),
            },
            cache_ttl: None,
            invalidates: &[],
            build_request: |_| Ok(RemoteRequest::get(["user", "dashboard", "stats"])),
            format: format::account::dashboard_stats,
        },
    ]
}

fn template_id_param() -> ParamDef {
    ParamDef::new("template_id", ParamType::String, "Template ID")
        .required()
        .length(Some(1), Some(100))
        .pattern(TEMPLATE_ID_PATTERN)
}

// =============================================================================
// Request builders
// =============================================================================

fn str_field<'a>(args: &'a Value, key: &str) -> Result<&'a str> {
    args.get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| Error::internal(format!("argument '{}' missing after validation", key)))
}

fn int_field(args: &Value, key: &str) -> Result<i64> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| Error::internal(format!("argument '{}' missing after validation", key)))
}

fn object_field(args: &Value, key: &str) -> Value {
    args.get(key)
        .filter(|v| v.is_object())
        .cloned()
        .unwrap_or_else(|| Value::Object(Map::new()))
}

fn search_templates_request(args: &Value) -> Result<RemoteRequest> {
    Ok(RemoteRequest::get(["search", "templates"])
        .with_query("q", str_field(args, "query")?.trim())
        .with_query("limit", int_field(args, "limit")?))
}

fn search_exemplar_request(args: &Value) -> Result<RemoteRequest> {
    Ok(RemoteRequest::post(
        ["search", "exemplar"],
        json!({
            "description": str_field(args, "description")?.trim(),
            "filters": object_field(args, "filters"),
        }),
    ))
}

fn template_converter_request(args: &Value) -> Result<RemoteRequest> {
    let mut body = json!({
        "repo_url": str_field(args, "repo_url")?.trim(),
        "template_description": str_field(args, "template_description")?.trim(),
    });
    if let Some(context) = args.get("user_context").filter(|v| v.is_object()) {
        body["user_context"] = context.clone();
    }
    Ok(RemoteRequest::post(["template", "convert"], body))
}

fn template_details_request(args: &Value) -> Result<RemoteRequest> {
    Ok(RemoteRequest::get(["templates", str_field(args, "template_id")?]))
}

fn mark_template_used_request(args: &Value) -> Result<RemoteRequest> {
    Ok(RemoteRequest::put([
        "templates",
        str_field(args, "template_id")?,
        "usage",
    ]))
}

fn recent_repositories_request(args: &Value) -> Result<RemoteRequest> {
    Ok(RemoteRequest::get(["repositories", "recent"])
        .with_query("limit", int_field(args, "limit")?))
}
