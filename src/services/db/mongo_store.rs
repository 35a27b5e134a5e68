use crate::services::db::{store::ensure_id, Document, DocumentStore, Filter, StoreError};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{self, Bson},
    Database,
};

pub struct MongoStore {
    db: Database,
}

impl MongoStore {
    pub fn new(db: Database) -> Self {
        MongoStore { db }
    }
}

fn to_bson_document(document: &Document) -> Result<bson::Document, StoreError> {
    bson::to_document(document).map_err(|err| StoreError::Conversion(err.to_string()))
}

fn to_bson_filter(filter: &Filter) -> Result<bson::Document, StoreError> {
    let mut query = bson::Document::new();
    for (field, value) in filter.clauses() {
        let value = bson::to_bson(value).map_err(|err| StoreError::Conversion(err.to_string()))?;
        query.insert(field.clone(), value);
    }
    Ok(query)
}

/// Ids written by other clients may be real ObjectIds; hand them on as hex strings.
fn from_bson_document(mut document: bson::Document) -> Result<Document, StoreError> {
    if let Some(Bson::ObjectId(oid)) = document.get("_id") {
        let hex = oid.to_hex();
        document.insert("_id", Bson::String(hex));
    }
    match Bson::Document(document).into_relaxed_extjson() {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::Conversion(format!(
            "expected an object, got {other}"
        ))),
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert(&self, collection: &str, mut document: Document) -> Result<String, StoreError> {
        let id = ensure_id(&mut document);
        let serialized = to_bson_document(&document)?;
        self.db
            .collection::<bson::Document>(collection)
            .insert_one(serialized)
            .await?;
        Ok(id)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> Result<Vec<Document>, StoreError> {
        let cursor = self
            .db
            .collection::<bson::Document>(collection)
            .find(to_bson_filter(filter)?)
            .await?;
        let documents: Vec<bson::Document> = cursor.try_collect().await?;
        documents.into_iter().map(from_bson_document).collect()
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StoreError> {
        self.db
            .collection::<bson::Document>(collection)
            .find_one(to_bson_filter(filter)?)
            .await?
            .map(from_bson_document)
            .transpose()
    }
}
