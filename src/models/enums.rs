use serde::{Deserialize, Serialize};

use crate::db::DatabaseError;

/// Lifecycle state of an action item. New items default to OPEN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ItemStatus {
    #[default]
    #[serde(rename = "OPEN")]
    Open,
    #[serde(rename = "DONE")]
    Done,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Done => "DONE",
        }
    }

    /// Lenient parse for untrusted payloads: unknown values map to None
    /// (callers default to OPEN), unlike `FromStr` which errors.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "OPEN" => Some(Self::Open),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }

    /// OPEN ↔ DONE.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Open => Self::Done,
            Self::Done => Self::Open,
        }
    }
}

impl std::str::FromStr for ItemStatus {
    type Err = DatabaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| DatabaseError::InvalidEnum {
            field: "ItemStatus".into(),
            value: s.into(),
        })
    }
}
