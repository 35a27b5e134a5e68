use crate::models::{string_fields_schema, Entity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Vocabulary entry for a project's lifecycle state, e.g. `Proposed`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Status {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl Status {
    pub fn new(name: impl Into<String>) -> Self {
        Status {
            id: None,
            name: name.into(),
        }
    }
}

impl Entity for Status {
    const COLLECTION: &'static str = "StatusesCollection";

    fn schema() -> Value {
        string_fields_schema(&["name"], &[])
    }
}
