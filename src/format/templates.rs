//! Saved-template renderers.

use super::{
    count, date_or, items, opt_text, plural, string_list, text_or, truncated, yes_no, MAX_TAGS,
    NEVER, NO_DESCRIPTION, UNKNOWN,
};
use serde_json::Value;

/// `search_templates`: numbered list of matching templates.
pub fn search_results(payload: &Value, args: &Value) -> String {
    let query = args.get("query").and_then(Value::as_str).unwrap_or("").trim();
    let templates = items(payload, "templates");

    if templates.is_empty() {
        return format!(
            "No templates found matching \"{}\". Use template_converter to create one from a repository.",
            query
        );
    }

    let mut out = format!(
        "Found {} matching \"{}\":\n",
        plural(templates.len(), "template", "templates"),
        query
    );
    for (i, template) in templates.iter().enumerate() {
        out.push('\n');
        out.push_str(&format!("{}. {}\n", i + 1, text_or(template, "name", UNKNOWN)));
        out.push_str(&format!(
            "   Description: {}\n",
            text_or(template, "description", NO_DESCRIPTION)
        ));
        out.push_str(&format!("   Source: {}\n", source_line(template)));
        out.push_str(&format!("   Tags: {}\n", truncated(&tags(template), MAX_TAGS)));
        out.push_str(&format!(
            "   Usage: {} | Last used: {} | Favorite: {}\n",
            plural(count(template, "usage_count").max(0) as usize, "use", "uses"),
            date_or(template, "last_used", NEVER),
            yes_no(template, "is_favorite"),
        ));
        out.push_str(&format!("   ID: {}\n", text_or(template, "id", UNKNOWN)));
    }
    out.trim_end().to_string()
}

/// `get_template_details`: one template with its stored conversion data.
pub fn template_details(payload: &Value, _args: &Value) -> String {
    let mut lines = vec![
        format!("Template: {}", text_or(payload, "name", UNKNOWN)),
        format!("ID: {}", text_or(payload, "id", UNKNOWN)),
        format!("Description: {}", text_or(payload, "description", NO_DESCRIPTION)),
        format!("Source: {}", source_line(payload)),
        format!("Tech stack: {}", truncated(&tags(payload), MAX_TAGS)),
        format!("Favorite: {}", yes_no(payload, "is_favorite")),
        format!(
            "Usage: {}",
            plural(count(payload, "usage_count").max(0) as usize, "use", "uses")
        ),
        format!("Last used: {}", date_or(payload, "last_used", NEVER)),
        format!("Created: {}", date_or(payload, "created_at", UNKNOWN)),
        format!("Updated: {}", date_or(payload, "updated_at", UNKNOWN)),
    ];

    if let Some(data) = payload.get("template_data").and_then(Value::as_object) {
        if !data.is_empty() {
            let mut keys: Vec<&str> = data.keys().map(String::as_str).collect();
            keys.sort_unstable();
            lines.push(format!("Template data: {}", keys.join(", ")));
        }
    }
    lines.join("\n")
}

/// `mark_template_used`: confirmation with the new usage count.
pub fn usage_update(payload: &Value, args: &Value) -> String {
    let id = text_or(args, "template_id", UNKNOWN);
    if !payload.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return format!("Template {} usage was not updated.", id);
    }
    format!(
        "Marked template {} as used.\nUsage count: {}\nLast used: {}",
        id,
        count(payload, "usage_count"),
        date_or(payload, "last_used", NEVER),
    )
}

/// `tags` for list payloads, falling back to `tech_stack`.
fn tags(template: &Value) -> Vec<String> {
    let tags = string_list(template, "tags");
    if tags.is_empty() {
        string_list(template, "tech_stack")
    } else {
        tags
    }
}

fn source_line(template: &Value) -> String {
    let name = text_or(template, "source_repo_name", UNKNOWN);
    match opt_text(template, "source_repo_url") {
        Some(url) => format!("{} ({})", name, url),
        None => name,
    }
}
