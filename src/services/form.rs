//! The add-project form.
//!
//! Its schema is rebuilt from the current reference collections every time it
//! is needed: the allowed interests, participants and statuses are whatever
//! the Interests, Profiles and Statuses collections hold right now.

use crate::models::project::Project;
use crate::services::schema::{RecordSchema, SchemaError, Violations};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

pub const DEFAULT_INSTRUCTOR: &str = "Dan Port";
pub const DEFAULT_STATUS: &str = "Proposed";

const FORM_NAME: &str = "AddProjectForm";

const OPTIONAL_TEXT_FIELDS: [&str; 7] = [
    "date",
    "students",
    "video",
    "testimonials",
    "techStack",
    "image",
    "poster",
];

#[derive(Error, Debug)]
pub enum FormError {
    #[error("form data must be an object")]
    NotAnObject,

    #[error("{0}")]
    Invalid(Violations),

    #[error("form data does not fit a project submission: {0}")]
    Malformed(String),

    #[error(transparent)]
    Schema(SchemaError),
}

impl From<SchemaError> for FormError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Invalid { violations, .. } => FormError::Invalid(violations),
            other => FormError::Schema(other),
        }
    }
}

/// A cleaned, validated add-project submission.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSubmission {
    pub name: String,
    pub description: String,
    pub homepage: String,
    pub picture: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub participants: Vec<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub students: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub testimonials: Option<String>,
    #[serde(default)]
    pub tech_stack: Option<String>,
    pub instructor: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub poster: Option<String>,
    pub status: String,
}

impl ProjectSubmission {
    pub fn to_project(&self) -> Project {
        Project {
            id: None,
            name: self.name.clone(),
            description: self.description.clone(),
            homepage: self.homepage.clone(),
            picture: self.picture.clone(),
            date: self.date.clone(),
            students: self.students.clone(),
            video: self.video.clone(),
            testimonials: self.testimonials.clone(),
            tech_stack: self.tech_stack.clone(),
            instructor: Some(self.instructor.clone()),
            image: self.image.clone(),
            poster: self.poster.clone(),
            status: Some(self.status.clone()),
        }
    }
}

pub struct ProjectFormSchema {
    schema: RecordSchema,
}

fn string_list(allowed: &[String], label: &str) -> Value {
    json!({
        "type": "array",
        "title": label,
        "items": { "type": "string", "enum": allowed },
    })
}

/**
 * Build the form schema from the allowed values of the enumerated fields.
 * An empty list admits no value for that field.
 */
pub fn make_schema(
    all_interests: &[String],
    all_participants: &[String],
    all_statuses: &[String],
) -> Result<ProjectFormSchema, SchemaError> {
    let mut properties = Map::new();
    for field in ["name", "description", "homepage", "picture"] {
        properties.insert(field.to_string(), json!({ "type": "string" }));
    }
    properties.insert("interests".to_string(), string_list(all_interests, "Interests"));
    properties.insert(
        "participants".to_string(),
        string_list(all_participants, "Participants"),
    );
    for field in OPTIONAL_TEXT_FIELDS {
        properties.insert(field.to_string(), json!({ "type": "string" }));
    }
    properties.insert(
        "instructor".to_string(),
        json!({ "type": "string", "default": DEFAULT_INSTRUCTOR }),
    );
    properties.insert(
        "status".to_string(),
        json!({ "type": "string", "enum": all_statuses, "default": DEFAULT_STATUS }),
    );

    let definition = json!({
        "type": "object",
        "properties": properties,
        "required": ["name", "description", "homepage", "picture", "instructor", "status"],
        "additionalProperties": false,
    });

    Ok(ProjectFormSchema {
        schema: RecordSchema::compile(FORM_NAME, definition)?,
    })
}

impl ProjectFormSchema {
    /// JSON schema handed to form renderers.
    pub fn describe(&self) -> &Value {
        self.schema.definition()
    }

    /**
     * Drop blank and null values, fill defaults for what is then absent,
     * and validate. A blank required field is reported as missing.
     */
    pub fn clean(&self, input: Value) -> Result<ProjectSubmission, FormError> {
        let Value::Object(mut data) = input else {
            return Err(FormError::NotAnObject);
        };

        data.retain(|_, v| !(v.is_null() || v.as_str().is_some_and(|s| s.trim().is_empty())));
        for (field, default) in [("instructor", DEFAULT_INSTRUCTOR), ("status", DEFAULT_STATUS)] {
            if data.get(field).map_or(true, Value::is_null) {
                data.insert(field.to_string(), Value::String(default.to_string()));
            }
        }

        let data = Value::Object(data);
        self.schema.validate(&data)?;
        serde_json::from_value(data).map_err(|err| FormError::Malformed(err.to_string()))
    }
}
