use serde_json::Value;

use crate::models::{ActionItem, ItemStatus};

use super::sanitize::{optional_field, sanitize_field, UNSPECIFIED_TASK};
use super::ExtractionError;

/// Parse a completion body into action items.
///
/// Lenient by policy: a missing or null `actionItems` key means "no items",
/// and individual elements are salvaged field by field. Only a non-object
/// body, invalid JSON, or an `actionItems` that is present but not an array
/// are rejected.
pub fn parse_extraction_payload(body: &str) -> Result<Vec<ActionItem>, ExtractionError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ExtractionError::JsonParsing(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(ExtractionError::MalformedResponse(
            "completion body is not a JSON object".to_string(),
        ));
    };

    let elements = match object.get("actionItems") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(elements)) => elements,
        Some(other) => {
            return Err(ExtractionError::MalformedResponse(format!(
                "actionItems is not an array (got {})",
                json_type_name(other)
            )));
        }
    };

    Ok(elements.iter().map(item_from_value).collect())
}

/// Map one array element to an item, tolerating any shape. Non-object
/// elements and missing fields degrade to placeholders rather than errors.
fn item_from_value(value: &Value) -> ActionItem {
    let object = value.as_object();
    let field = |key: &str| object.and_then(|o| o.get(key));

    let status = field("status")
        .and_then(Value::as_str)
        .and_then(ItemStatus::parse)
        .unwrap_or_default();

    ActionItem {
        id: uuid::Uuid::new_v4(),
        task: sanitize_field(field("task"), UNSPECIFIED_TASK),
        owner: optional_field(field("owner")),
        due_date: optional_field(field("dueDate")),
        status,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
