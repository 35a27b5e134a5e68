use crate::models::{
    comment::Comment,
    interest::Interest,
    joins::{ProfileInterest, ProfileProject, ProjectInterest, ProjectStatus},
    profile::Profile,
    project::Project,
    status::Status,
    Entity,
};
use crate::services::{
    db::{Database, Document, Filter, StoreError},
    schema::{RecordSchema, SchemaError},
};
use serde_json::Value;
use std::marker::PhantomData;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{collection} holds a malformed document: {reason}")]
    Malformed { collection: String, reason: String },
}

pub fn user_publication_name(collection: &str) -> String {
    format!("{collection}.publication.user")
}

pub fn admin_publication_name(collection: &str) -> String {
    format!("{collection}.publication.admin")
}

/// What the publication registry needs to know about a wrapper.
pub trait CollectionInfo: Send + Sync {
    fn name(&self) -> &str;

    fn user_publication_name(&self) -> String {
        user_publication_name(self.name())
    }

    fn admin_publication_name(&self) -> String {
        admin_publication_name(self.name())
    }
}

/**
 * A named collection bound to its schema and the shared database.
 * Every insert is validated first; nothing invalid reaches the store.
 */
pub struct RecordCollection<T: Entity> {
    schema: RecordSchema,
    db: Database,
    _record: PhantomData<fn() -> T>,
}

impl<T: Entity> RecordCollection<T> {
    pub fn new(db: Database) -> Result<Self, SchemaError> {
        Ok(RecordCollection {
            schema: RecordSchema::compile(T::COLLECTION, T::schema())?,
            db,
            _record: PhantomData,
        })
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.schema
    }

    pub async fn insert(&self, record: &T) -> Result<String, CollectionError> {
        let value = serde_json::to_value(record).map_err(|err| CollectionError::Malformed {
            collection: T::COLLECTION.to_string(),
            reason: err.to_string(),
        })?;
        self.insert_value(value).await
    }

    /// Validate and store a raw JSON object.
    pub async fn insert_value(&self, value: Value) -> Result<String, CollectionError> {
        self.schema.validate(&value)?;
        let document = match value {
            Value::Object(map) => map,
            // the schema only accepts objects
            _ => Document::new(),
        };
        Ok(self.db.insert(T::COLLECTION, document).await?)
    }

    pub async fn find(&self, filter: &Filter) -> Result<Vec<T>, CollectionError> {
        self.db
            .find(T::COLLECTION, filter)
            .await?
            .into_iter()
            .map(|document| {
                serde_json::from_value(Value::Object(document)).map_err(|err| {
                    CollectionError::Malformed {
                        collection: T::COLLECTION.to_string(),
                        reason: err.to_string(),
                    }
                })
            })
            .collect()
    }

    pub async fn all(&self) -> Result<Vec<T>, CollectionError> {
        self.find(&Filter::all()).await
    }

    pub async fn is_empty(&self) -> Result<bool, CollectionError> {
        Ok(self.db.find_one(T::COLLECTION, &Filter::all()).await?.is_none())
    }
}

impl<T: Entity> CollectionInfo for RecordCollection<T> {
    fn name(&self) -> &str {
        T::COLLECTION
    }
}

/// One wrapper per entity, built once at startup.
pub struct Catalog {
    pub projects: RecordCollection<Project>,
    pub interests: RecordCollection<Interest>,
    pub profiles: RecordCollection<Profile>,
    pub statuses: RecordCollection<Status>,
    pub profiles_interests: RecordCollection<ProfileInterest>,
    pub profiles_projects: RecordCollection<ProfileProject>,
    pub projects_interests: RecordCollection<ProjectInterest>,
    pub projects_statuses: RecordCollection<ProjectStatus>,
    pub comments: RecordCollection<Comment>,
    db: Database,
}

impl Catalog {
    pub fn new(db: Database) -> Result<Self, SchemaError> {
        Ok(Catalog {
            projects: RecordCollection::new(db.clone())?,
            interests: RecordCollection::new(db.clone())?,
            profiles: RecordCollection::new(db.clone())?,
            statuses: RecordCollection::new(db.clone())?,
            profiles_interests: RecordCollection::new(db.clone())?,
            profiles_projects: RecordCollection::new(db.clone())?,
            projects_interests: RecordCollection::new(db.clone())?,
            projects_statuses: RecordCollection::new(db.clone())?,
            comments: RecordCollection::new(db.clone())?,
            db,
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn collections(&self) -> Vec<&dyn CollectionInfo> {
        vec![
            &self.interests as &dyn CollectionInfo,
            &self.profiles,
            &self.profiles_interests,
            &self.profiles_projects,
            &self.projects,
            &self.projects_interests,
            &self.statuses,
            &self.projects_statuses,
            &self.comments,
        ]
    }
}
