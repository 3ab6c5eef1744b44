use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ItemEdits, Transcript};

#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessResponse {
    pub transcripts: Vec<Transcript>,
    /// True when the items came from the line-marker fallback.
    pub degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub degraded_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponse {
    pub workspace_id: Uuid,
    pub transcript_id: Uuid,
    pub created: usize,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectWorkspaceRequest {
    pub workspace_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct TranscriptsResponse {
    pub transcripts: Vec<Transcript>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub transcript_id: Uuid,
    pub task: String,
    pub owner: Option<String>,
    pub due_date: Option<String>,
}

/// Edit payload. Absent fields stay unchanged; an explicit `null` owner
/// or due date clears the value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub transcript_id: Uuid,
    #[serde(flatten)]
    pub edits: ItemEdits,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemRequest {
    pub transcript_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacesQuery {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkspaceRequest {
    pub name: String,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub user_name: String,
}

/// Three independent health signals.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub backend: &'static str,
    pub database: &'static str,
    pub llm: &'static str,
}
