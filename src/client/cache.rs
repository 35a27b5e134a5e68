use crate::models::Entity;
use crate::services::db::{Document, Filter};
use dashmap::DashMap;
use serde_json::Value;
use tracing::warn;

/// Documents delivered to this client, per collection, in arrival order.
#[derive(Default)]
pub struct LocalCache {
    collections: DashMap<String, Vec<Document>>,
}

impl LocalCache {
    pub fn new() -> Self {
        LocalCache::default()
    }

    /// A document already present under the same id is replaced in place.
    pub fn insert(&self, collection: &str, id: &str, fields: Document) {
        let mut documents = self.collections.entry(collection.to_string()).or_default();
        let existing = documents
            .iter()
            .position(|doc| doc.get("_id").and_then(Value::as_str) == Some(id));
        match existing {
            Some(index) => documents[index] = fields,
            None => documents.push(fields),
        }
    }

    pub fn find(&self, collection: &str, filter: &Filter) -> Vec<Document> {
        self.collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn find_one(&self, collection: &str, filter: &Filter) -> Option<Document> {
        self.find(collection, filter).into_iter().next()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.collections.get(collection).map_or(0, |docs| docs.len())
    }

    pub fn records<T: Entity>(&self, filter: &Filter) -> Vec<T> {
        self.find(T::COLLECTION, filter)
            .into_iter()
            .filter_map(|doc| match serde_json::from_value(Value::Object(doc)) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!("skipping malformed {} document: {}", T::COLLECTION, err);
                    None
                }
            })
            .collect()
    }

    /// One string field from every document of a collection.
    pub fn pluck(&self, collection: &str, filter: &Filter, field: &str) -> Vec<String> {
        self.find(collection, filter)
            .iter()
            .filter_map(|doc| doc.get(field).and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}
