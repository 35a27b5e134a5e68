use crate::services::db::{store::ensure_id, Document, DocumentStore, Filter, StoreError};
use async_trait::async_trait;
use dashmap::DashMap;

/// Process-local store keeping documents in insertion order per collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: DashMap<String, Vec<Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let id = ensure_id(&mut document);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(document);
        Ok(id)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .map(|documents| {
                documents
                    .iter()
                    .filter(|document| filter.matches(document))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_id_and_keeps_order() {
        let store = MemoryStore::new();
        let first = store
            .insert("InterestsCollection", doc(json!({ "name": "AI" })))
            .await
            .unwrap();
        store
            .insert("InterestsCollection", doc(json!({ "_id": "fixed", "name": "HPC" })))
            .await
            .unwrap();

        let all = store.find("InterestsCollection", &Filter::all()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0]["_id"], json!(first));
        assert_eq!(all[1]["_id"], json!("fixed"));
    }

    #[tokio::test]
    async fn unknown_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.find("nope", &Filter::all()).await.unwrap().is_empty());
        assert!(store.find_one("nope", &Filter::all()).await.unwrap().is_none());
    }
}
