use crate::models::{string_fields_schema, Entity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub picture: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Profile {
    pub fn new(email: impl Into<String>, picture: impl Into<String>) -> Self {
        Profile {
            id: None,
            email: email.into(),
            picture: picture.into(),
            first_name: None,
            last_name: None,
            bio: None,
            title: None,
        }
    }
}

impl Entity for Profile {
    const COLLECTION: &'static str = "ProfilesCollection";

    fn schema() -> Value {
        string_fields_schema(
            &["email", "picture"],
            &["firstName", "lastName", "bio", "title"],
        )
    }
}
