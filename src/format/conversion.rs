//! Repository-to-template conversion renderer.

use super::{bullet_list, numbered_list, opt_text, string_list, text_or, UNKNOWN};
use serde_json::Value;

/// `template_converter`: the saved template id plus step-by-step instructions.
pub fn conversion_result(payload: &Value, args: &Value) -> String {
    let template_line = match opt_text(payload, "template_id") {
        Some(id) => format!("Template ID: {}", id),
        None => "Template ID: not saved".to_string(),
    };
    let commands = string_list(payload, "setup_commands");
    let commands = if commands.is_empty() {
        bullet_list(&[])
    } else {
        commands
            .iter()
            .map(|c| format!("  $ {}", c))
            .collect::<Vec<_>>()
            .join("\n")
    };

    [
        "Template conversion complete.".to_string(),
        template_line,
        format!("Repository: {}", text_or(args, "repo_url", UNKNOWN)),
        String::new(),
        "Conversion steps:".to_string(),
        numbered_list(&string_list(payload, "conversion_steps")),
        String::new(),
        "Files to modify:".to_string(),
        bullet_list(&string_list(payload, "files_to_modify")),
        String::new(),
        "Customization points:".to_string(),
        bullet_list(&string_list(payload, "customization_points")),
        String::new(),
        "Setup commands:".to_string(),
        commands,
        String::new(),
        "Expected outcome:".to_string(),
        text_or(payload, "expected_outcome", UNKNOWN),
    ]
    .join("\n")
}
