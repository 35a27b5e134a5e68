//! Many-to-many join records. Each side is the natural key (name or email)
//! of the referenced record; nothing enforces that the referenced record
//! exists or that a pair is unique.

use crate::models::{string_fields_schema, Entity};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProjectInterest {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project: String,
    pub interest: String,
}

impl Entity for ProjectInterest {
    const COLLECTION: &'static str = "ProjectsInterestsCollection";

    fn schema() -> Value {
        string_fields_schema(&["project", "interest"], &[])
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProfileProject {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub profile: String,
    pub project: String,
}

impl Entity for ProfileProject {
    const COLLECTION: &'static str = "ProfilesProjectsCollection";

    fn schema() -> Value {
        string_fields_schema(&["profile", "project"], &[])
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProfileInterest {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub profile: String,
    pub interest: String,
}

impl Entity for ProfileInterest {
    const COLLECTION: &'static str = "ProfilesInterestsCollection";

    fn schema() -> Value {
        string_fields_schema(&["profile", "interest"], &[])
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ProjectStatus {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub project: String,
    pub status: String,
}

impl Entity for ProjectStatus {
    const COLLECTION: &'static str = "ProjectsStatusesCollection";

    fn schema() -> Value {
        string_fields_schema(&["project", "status"], &[])
    }
}
