pub mod enums;

pub use enums::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A discrete unit of extracted commitment: task plus optional owner,
/// optional due date, and OPEN/DONE status. Owned by exactly one transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    pub id: Uuid,
    /// Never empty or whitespace-only; sanitized to a placeholder upstream.
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    pub status: ItemStatus,
}

impl ActionItem {
    /// New OPEN item with a fresh id and no owner/due date.
    pub fn open(task: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            task: task.into(),
            owner: None,
            due_date: None,
            status: ItemStatus::Open,
        }
    }
}

/// A processed transcript and its extracted items, in extraction order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub action_items: Vec<ActionItem>,
}

impl Transcript {
    pub fn new(content: impl Into<String>, action_items: Vec<ActionItem>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            created_at: Utc::now(),
            action_items,
        }
    }
}

/// A named grouping of persisted transcripts under a user identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: Uuid,
    pub name: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// Partial edit of an action item. An absent field means "leave
/// unchanged"; `owner` and `due_date` are tri-state, so an explicit
/// `null` on the wire clears the stored value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemEdits {
    pub task: Option<String>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub owner: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable_field")]
    pub due_date: Option<Option<String>>,
    pub status: Option<ItemStatus>,
}

/// Maps a present field to `Some(value-or-null)`, so absence stays
/// distinguishable from an explicit `null`.
fn nullable_field<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl ItemEdits {
    pub fn status(status: ItemStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.task.is_none()
            && self.owner.is_none()
            && self.due_date.is_none()
            && self.status.is_none()
    }

    /// Apply to an in-memory item (local tier mutation).
    pub fn apply(&self, item: &mut ActionItem) {
        if let Some(task) = &self.task {
            item.task = task.clone();
        }
        if let Some(owner) = &self.owner {
            item.owner = owner.clone();
        }
        if let Some(due) = &self.due_date {
            item.due_date = due.clone();
        }
        if let Some(status) = self.status {
            item.status = status;
        }
    }
}

/// Opaque user identity. Credential handling lives outside this service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}
