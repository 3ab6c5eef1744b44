use serde_json::Value;

/// Placeholder task text for items the model returned without a usable task.
pub const UNSPECIFIED_TASK: &str = "Unspecified Task";

/// Trimmed value if non-empty after trimming, otherwise the fallback.
/// Pure and total — never fails, idempotent.
pub fn sanitize_text(value: Option<&str>, fallback: &str) -> String {
    match value {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => fallback.to_string(),
    }
}

/// Sanitize a field of an untrusted JSON payload. Non-string values count
/// as absent.
pub fn sanitize_field(value: Option<&Value>, fallback: &str) -> String {
    sanitize_text(value.and_then(Value::as_str), fallback)
}

/// Optional pass-through field: present non-empty strings survive, anything
/// else (null, absent, empty, non-string) becomes unset.
pub fn optional_field(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
