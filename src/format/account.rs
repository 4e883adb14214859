//! Account renderers.

use super::{count, date_or, opt_text, text_or, UNKNOWN};
use serde_json::Value;

/// `get_user_info`: profile, GitHub link state and headline counts.
pub fn user_info(payload: &Value, _args: &Value) -> String {
    let name = text_or(payload, "name", UNKNOWN);
    let account = match opt_text(payload, "email") {
        Some(email) => format!("Account: {} ({})", name, email),
        None => format!("Account: {}", name),
    };
    let github = match opt_text(payload, "github_username") {
        Some(user) if connected(payload) => format!("GitHub: {} (connected)", user),
        Some(user) => format!("GitHub: {} (not connected)", user),
        None => "GitHub: not connected".to_string(),
    };
    let stats = payload.get("stats").unwrap_or(&Value::Null);

    [
        account,
        format!("User ID: {}", text_or(payload, "id", UNKNOWN)),
        github,
        format!("Member since: {}", date_or(payload, "created_at", UNKNOWN)),
        format!(
            "Templates: {} | Repositories analyzed: {} | Favorites: {}",
            count(stats, "total_templates"),
            count(stats, "repositories_analyzed"),
            count(stats, "favorites"),
        ),
    ]
    .join("\n")
}

/// `get_dashboard_stats`: usage counters for the account.
pub fn dashboard_stats(payload: &Value, _args: &Value) -> String {
    [
        "Templation dashboard".to_string(),
        format!("Templates: {}", count(payload, "total_templates")),
        format!(
            "Repositories analyzed: {}",
            count(payload, "repositories_analyzed")
        ),
        format!("Recent activity: {}", count(payload, "recent_activity")),
        format!("Favorites: {}", count(payload, "favorites")),
        format!("Active API keys: {}", count(payload, "active_api_keys")),
    ]
    .join("\n")
}

fn connected(payload: &Value) -> bool {
    payload
        .get("github_connected")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}
