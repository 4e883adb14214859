//! Response formatter: deterministic text for language-model consumption.
//!
//! Every renderer is a pure function of the payload (and the validated
//! arguments). Absent optional fields get a fixed default, lists are numbered
//! from 1, and long tag lists are truncated with a `+N more` suffix.

pub mod account;
pub mod conversion;
pub mod failure;
pub mod repositories;
pub mod templates;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

pub const NO_DESCRIPTION: &str = "No description";
pub const UNKNOWN: &str = "Unknown";
pub const NEVER: &str = "Never";
pub const NONE: &str = "None";

/// Tags and tech-stack entries shown before truncation.
pub const MAX_TAGS: usize = 5;

/// Non-empty string (or number) at `key`, else `default`.
pub fn text_or(value: &Value, key: &str, default: &str) -> String {
    match value.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

/// Non-empty string at `key`, if any.
pub fn opt_text(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Integer count at `key`; absent or non-numeric counts render as 0.
pub fn count(value: &Value, key: &str) -> i64 {
    value
        .get(key)
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0)
}

/// Score at `key` with one decimal place, if present.
pub fn score(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_f64).map(|f| format!("{:.1}", f))
}

pub fn yes_no(value: &Value, key: &str) -> &'static str {
    if value.get(key).and_then(Value::as_bool).unwrap_or(false) {
        "yes"
    } else {
        "no"
    }
}

/// String entries of the array at `key`; anything else is an empty list.
pub fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Comma-joined, truncated to `max` entries with a `+N more` suffix.
pub fn truncated(items: &[String], max: usize) -> String {
    if items.is_empty() {
        return NONE.to_string();
    }
    let shown = items.iter().take(max).cloned().collect::<Vec<_>>().join(", ");
    if items.len() > max {
        format!("{} +{} more", shown, items.len() - max)
    } else {
        shown
    }
}

/// Calendar date of a payload timestamp.
///
/// Accepts RFC 3339 and the naive ISO-8601 form Python's `isoformat()` emits.
/// Unparseable values are shown verbatim; absent ones as `default`.
pub fn date_or(value: &Value, key: &str, default: &str) -> String {
    match opt_text(value, key) {
        Some(raw) => parse_date(&raw)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or(raw),
        None => default.to_string(),
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

/// `1 template` / `3 templates`.
pub fn plural(n: usize, singular: &str, plural: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, plural)
    }
}

/// Items of a list payload, accepting either a bare array or `{key: [...]}`.
pub fn items<'a>(payload: &'a Value, key: &str) -> &'a [Value] {
    payload
        .as_array()
        .or_else(|| payload.get(key).and_then(Value::as_array))
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `- a` lines, or a single `- None`.
pub fn bullet_list(items: &[String]) -> String {
    if items.is_empty() {
        return format!("- {}", NONE);
    }
    items
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n")
}

/// `1. a` lines, or a single `- None`.
pub fn numbered_list(items: &[String]) -> String {
    if items.is_empty() {
        return format!("- {}", NONE);
    }
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_or_defaults() {
        let v = json!({"a": "x", "blank": "  ", "n": 3, "null": null});
        assert_eq!(text_or(&v, "a", UNKNOWN), "x");
        assert_eq!(text_or(&v, "blank", NO_DESCRIPTION), NO_DESCRIPTION);
        assert_eq!(text_or(&v, "n", UNKNOWN), "3");
        assert_eq!(text_or(&v, "null", UNKNOWN), UNKNOWN);
        assert_eq!(text_or(&v, "missing", UNKNOWN), UNKNOWN);
    }

    #[test]
    fn test_truncated() {
        let tags: Vec<String> = (1..=8).map(|i| format!("t{}", i)).collect();
        assert_eq!(truncated(&tags, 5), "t1, t2, t3, t4, t5 +3 more");
        assert_eq!(truncated(&tags[..5], 5), "t1, t2, t3, t4, t5");
        assert_eq!(truncated(&[], 5), "None");
    }

    #[test]
    fn test_date_formats() {
        let v = json!({
            "rfc": "2024-05-01T10:30:00Z",
            "offset": "2024-05-01T23:30:00+02:00",
            "naive": "2024-05-01T10:30:00",
            "micros": "2024-05-01T10:30:00.123456",
            "day": "2024-05-01",
            "junk": "last tuesday",
        });
        for key in ["rfc", "offset", "naive", "micros", "day"] {
            assert_eq!(date_or(&v, key, NEVER), "2024-05-01", "{}", key);
        }
        assert_eq!(date_or(&v, "junk", NEVER), "last tuesday");
        assert_eq!(date_or(&v, "missing", NEVER), NEVER);
    }

    #[test]
    fn test_count_and_score() {
        let v = json!({"a": 4, "b": 2.9, "s": 8.456});
        assert_eq!(count(&v, "a"), 4);
        assert_eq!(count(&v, "b"), 2);
        assert_eq!(count(&v, "missing"), 0);
        assert_eq!(score(&v, "s").as_deref(), Some("8.5"));
        assert_eq!(score(&v, "missing"), None);
    }

    #[test]
    fn test_lists() {
        assert_eq!(bullet_list(&[]), "- None");
        assert_eq!(
            numbered_list(&["a".to_string(), "b".to_string()]),
            "1. a\n2. b"
        );
        assert_eq!(plural(1, "template", "templates"), "1 template");
        assert_eq!(plural(0, "template", "templates"), "0 templates");
    }

    #[test]
    fn test_items_accepts_both_shapes() {
        let bare = json!([{"a": 1}]);
        let wrapped = json!({"repos": [{"a": 1}, {"a": 2}]});
        assert_eq!(items(&bare, "repos").len(), 1);
        assert_eq!(items(&wrapped, "repos").len(), 2);
        assert!(items(&json!({}), "repos").is_empty());
    }
}
