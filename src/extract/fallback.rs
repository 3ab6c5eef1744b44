use std::sync::LazyLock;

use regex::Regex;

use crate::models::ActionItem;

/// Lines whose trimmed form starts with one of these markers are kept.
static MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(action|task|todo|[-*])").unwrap());

/// Marker prefix (with optional colon and surrounding whitespace) to strip
/// from kept lines.
static STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:action|task|todo|[-*])\s*:?\s*").unwrap());

/// Deterministic line-marker extraction, used whenever the LLM path is
/// unavailable or fails. Keeps lines opening with "action", "task", "todo"
/// or a bullet, strips the marker, and drops lines that end up empty.
///
/// Every produced item is OPEN with no owner and no due date.
pub fn extract_fallback(text: &str) -> Vec<ActionItem> {
    text.lines()
        .map(str::trim)
        .filter(|line| MARKER.is_match(line))
        .filter_map(|line| {
            let task = STRIP.replace(line, "").trim().to_string();
            (!task.is_empty()).then(|| ActionItem::open(task))
        })
        .collect()
}
