//! Repository renderers (exemplar search and recently searched repos).

use super::{
    count, date_or, items, opt_text, plural, score, string_list, text_or, truncated, MAX_TAGS,
    NO_DESCRIPTION, UNKNOWN,
};
use serde_json::Value;

/// `search_exemplar`: ranked repositories for a project description.
pub fn exemplar_results(payload: &Value, args: &Value) -> String {
    let description = args
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or("")
        .trim();
    let repos = items(payload, "repos");

    if repos.is_empty() {
        return format!(
            "No repositories found for \"{}\". Try a broader description or fewer filters.",
            description
        );
    }

    let mut out = format!(
        "Found {} for \"{}\":\n",
        plural(repos.len(), "repository", "repositories"),
        description
    );
    for (i, repo) in repos.iter().enumerate() {
        let metrics = repo.get("metrics").unwrap_or(&Value::Null);
        let summary = opt_text(repo, "visual_summary")
            .or_else(|| opt_text(repo, "description"))
            .unwrap_or_else(|| NO_DESCRIPTION.to_string());

        out.push('\n');
        out.push_str(&format!("{}. {}\n", i + 1, text_or(repo, "name", UNKNOWN)));
        out.push_str(&format!("   URL: {}\n", text_or(repo, "url", UNKNOWN)));
        out.push_str(&format!("   Summary: {}\n", summary));
        out.push_str(&format!(
            "   Stars: {} | Forks: {} | Updated: {}\n",
            count(metrics, "stars"),
            count(metrics, "forks"),
            date_or(metrics, "updated", UNKNOWN),
        ));
        out.push_str(&format!(
            "   Tech stack: {}\n",
            truncated(&string_list(repo, "tech_stack"), MAX_TAGS)
        ));
        out.push_str(&format!(
            "   Difficulty: {} | Quality: {} | Relevance: {}\n",
            text_or(repo, "customization_difficulty", UNKNOWN),
            score(repo, "quality_score").unwrap_or_else(|| UNKNOWN.to_string()),
            score(repo, "relevance_score").unwrap_or_else(|| UNKNOWN.to_string()),
        ));
        if let Some(demo) = opt_text(repo, "demo_url") {
            out.push_str(&format!("   Demo: {}\n", demo));
        }
    }
    out.push_str("\nUse template_converter with a repository URL to turn one into a template.");
    out
}

/// `get_recent_repositories`: repositories the account searched recently.
pub fn recent_repositories(payload: &Value, _args: &Value) -> String {
    let repos = items(payload, "repositories");

    if repos.is_empty() {
        return "No recently searched repositories. Use search_exemplar to discover some."
            .to_string();
    }

    let mut out = format!(
        "Recently searched {}:\n",
        plural(repos.len(), "repository", "repositories")
    );
    for (i, repo) in repos.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}\n", i + 1, text_or(repo, "name", UNKNOWN)));
        out.push_str(&format!("   URL: {}\n", text_or(repo, "url", UNKNOWN)));
        out.push_str(&format!(
            "   Description: {}\n",
            text_or(repo, "description", NO_DESCRIPTION)
        ));
        out.push_str(&format!(
            "   Language: {} | Stars: {} | Forks: {}\n",
            text_or(repo, "language", UNKNOWN),
            count(repo, "stars"),
            count(repo, "forks"),
        ));
        out.push_str(&format!(
            "   Topics: {}\n",
            truncated(&string_list(repo, "topics"), MAX_TAGS)
        ));
        out.push_str(&format!(
            "   Updated: {} | Cached: {}\n",
            date_or(repo, "updated", UNKNOWN),
            date_or(repo, "cached_at", UNKNOWN),
        ));
    }
    out.trim_end().to_string()
}
