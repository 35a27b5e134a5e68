//! Record schemas compiled with the `jsonschema` crate.
//!
//! A failed check reports every violation, not just the first, so a form
//! can show all of its inline errors at once.

use jsonschema::Validator;
use serde::Serialize;
use serde_json::Value;
use std::{fmt, sync::Arc};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("{schema} rejected the document:\n{violations}")]
    Invalid {
        schema: String,
        violations: Violations,
    },

    #[error("schema {schema} does not compile: {reason}")]
    Build { schema: String, reason: String },
}

/// One failed rule, located by JSON pointer.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Violation {
    pub instance_path: String,
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(transparent)]
pub struct Violations(Vec<Violation>);

impl Violations {
    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when some violation sits at or below `pointer`, e.g. `/status`.
    pub fn touches(&self, pointer: &str) -> bool {
        self.0.iter().any(|v| v.instance_path.starts_with(pointer))
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct RecordSchema {
    name: String,
    definition: Value,
    validator: Arc<Validator>,
}

impl RecordSchema {
    pub fn compile(name: impl Into<String>, definition: Value) -> Result<Self, SchemaError> {
        let name = name.into();
        let validator = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .build(&definition)
            .map_err(|e| SchemaError::Build {
                schema: name.clone(),
                reason: e.to_string(),
            })?;

        Ok(RecordSchema {
            name,
            definition,
            validator: Arc::new(validator),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn definition(&self) -> &Value {
        &self.definition
    }

    pub fn validate(&self, instance: &Value) -> Result<(), SchemaError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid {
                schema: self.name.clone(),
                violations: Violations(violations),
            })
        }
    }
}

impl fmt::Debug for RecordSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordSchema").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{project::Project, Entity};
    use serde_json::json;

    fn project_schema() -> RecordSchema {
        RecordSchema::compile(Project::COLLECTION, Project::schema()).unwrap()
    }

    #[test]
    fn complete_project_passes() {
        let doc = json!({
            "name": "Bowfolios",
            "description": "Portfolios for ICS",
            "homepage": "https://bowfolios.github.io",
            "picture": "https://example.com/bowfolios.png",
            "techStack": "Meteor"
        });
        assert!(project_schema().validate(&doc).is_ok());
    }

    #[test]
    fn every_violation_is_reported() {
        let doc = json!({ "name": 7, "homepage": "x", "colour": "red" });
        let err = project_schema().validate(&doc).unwrap_err();
        match err {
            SchemaError::Invalid { schema, violations } => {
                assert_eq!(schema, "ProjectsCollection");
                assert!(violations.touches("/name"));
                // missing description + picture, wrong type, unknown key
                assert!(violations.len() >= 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn broken_definition_fails_to_compile() {
        let err = RecordSchema::compile("broken", json!({ "type": 12 })).unwrap_err();
        assert!(matches!(err, SchemaError::Build { .. }));
    }
}
