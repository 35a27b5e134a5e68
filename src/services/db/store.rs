use crate::services::db::{changes::ChangeFeed, DocumentAdded, Filter};
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast;
use tracing::debug;

/// A stored record: a JSON object whose `_id` is a string.
pub type Document = Map<String, Value>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("could not convert document: {0}")]
    Conversion(String),
}

/**
 * Persistence seam for every collection.
 * `insert` assigns an `_id` when the document has none and returns it.
 */
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, document: Document) -> Result<String, StoreError>;

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }
}

/// Fills in `_id` with a fresh hex object id unless the caller supplied one.
pub(crate) fn ensure_id(document: &mut Document) -> String {
    match document.get("_id").and_then(Value::as_str) {
        Some(id) => id.to_string(),
        None => {
            let id = ObjectId::new().to_hex();
            document.insert("_id".to_string(), Value::String(id.clone()));
            id
        }
    }
}

/**
 * The handle passed to every component that reads or writes documents.
 * Each successful insert is announced on the change feed.
 */
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
    feed: ChangeFeed,
}

impl Database {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Database {
            store,
            feed: ChangeFeed::new(),
        }
    }

    pub async fn insert(
        &self,
        collection: &str,
        mut document: Document,
    ) -> Result<String, StoreError> {
        let id = ensure_id(&mut document);
        self.store.insert(collection, document.clone()).await?;
        debug!("inserted {} into {}", id, collection);

        self.feed.announce(DocumentAdded {
            collection: collection.to_string(),
            id: id.clone(),
            fields: document,
        });
        Ok(id)
    }

    pub async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<Document>, StoreError> {
        self.store.find(collection, filter).await
    }

    pub async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.store.find_one(collection, filter).await
    }

    pub fn watch(&self) -> broadcast::Receiver<DocumentAdded> {
        self.feed.subscribe()
    }
}
