use crate::models::{string_fields_schema, Entity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Only ever published to the user named in `owner`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner: String,
    pub note: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn new(owner: impl Into<String>, note: impl Into<String>) -> Self {
        Comment {
            id: None,
            owner: owner.into(),
            note: note.into(),
            project: None,
            created_at: Some(Utc::now()),
        }
    }
}

impl Entity for Comment {
    const COLLECTION: &'static str = "CommentsCollection";

    fn schema() -> Value {
        string_fields_schema(&["owner", "note"], &["project", "createdAt"])
    }
}
