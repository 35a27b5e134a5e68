use crate::models::{string_fields_schema, Entity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Interest {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

impl Interest {
    pub fn new(name: impl Into<String>) -> Self {
        Interest {
            id: None,
            name: name.into(),
        }
    }
}

impl Entity for Interest {
    const COLLECTION: &'static str = "InterestsCollection";

    fn schema() -> Value {
        string_fields_schema(&["name"], &[])
    }
}
