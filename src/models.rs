use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Map, Value};

pub mod comment;
pub mod interest;
pub mod joins;
pub mod profile;
pub mod project;
pub mod status;
pub mod user;

/**
 * A record type stored in one named collection.
 * The schema is checked on every write through its collection wrapper.
 */
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn schema() -> Value;
}

/**
 * Object schema where every listed field is a string.
 * `_id` is always allowed so stored documents validate too.
 */
pub(crate) fn string_fields_schema(required: &[&str], optional: &[&str]) -> Value {
    let mut properties = Map::new();
    properties.insert("_id".to_string(), json!({ "type": "string" }));
    for field in required.iter().chain(optional) {
        properties.insert(field.to_string(), json!({ "type": "string" }));
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}
