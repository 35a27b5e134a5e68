use crate::models::{comment::Comment, Entity};
use crate::services::{
    auth::Identity,
    collection::Catalog,
    db::{Database, Document},
    publications::{
        AdminOnly, OwnerScoped, Publication, PublicationError, PublishAll, RoleAssignments,
    },
};
use std::{collections::HashMap, sync::Arc};
use tracing::info;

/**
 * Named publications plus the unnamed ones every connection receives.
 * Filled once at startup, read-only afterwards.
 */
#[derive(Default)]
pub struct PublicationRegistry {
    named: HashMap<String, Arc<dyn Publication>>,
    universal: Vec<Arc<dyn Publication>>,
}

impl PublicationRegistry {
    pub fn new() -> Self {
        PublicationRegistry::default()
    }

    pub fn register(
        &mut self,
        name: impl Into<String>,
        publication: impl Publication + 'static,
    ) -> Result<(), PublicationError> {
        let name = name.into();
        if self.named.contains_key(&name) {
            return Err(PublicationError::Duplicate(name));
        }
        self.named.insert(name, Arc::new(publication));
        Ok(())
    }

    pub fn register_universal(&mut self, publication: impl Publication + 'static) {
        self.universal.push(Arc::new(publication));
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Publication>, PublicationError> {
        self.named
            .get(name)
            .cloned()
            .ok_or_else(|| PublicationError::NotFound(name.to_string()))
    }

    pub fn universal(&self) -> &[Arc<dyn Publication>] {
        &self.universal
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.named.keys().cloned().collect();
        names.sort();
        names
    }

    /// What a new subscriber to `name` would be sent before `ready`.
    pub async fn snapshot(
        &self,
        db: &Database,
        name: &str,
        requester: Option<&Identity>,
    ) -> Result<Vec<Document>, PublicationError> {
        let publication = self.get(name)?;
        match publication.query(db, requester).await? {
            Some(query) => Ok(db.find(&query.collection, &query.filter).await?),
            None => Ok(Vec::new()),
        }
    }
}

/**
 * Register the user and admin channel of every catalog collection.
 * Comments are owner-scoped; the rest are public reads.
 */
pub fn register_publications(catalog: &Catalog) -> Result<PublicationRegistry, PublicationError> {
    let mut registry = PublicationRegistry::new();

    for collection in catalog.collections() {
        let name = collection.name();
        if name == Comment::COLLECTION {
            registry.register(collection.user_publication_name(), OwnerScoped::new(name))?;
        } else {
            registry.register(collection.user_publication_name(), PublishAll::new(name))?;
        }
        registry.register(collection.admin_publication_name(), AdminOnly::new(name))?;
    }
    registry.register_universal(RoleAssignments);

    info!("Registered {} publications", registry.named.len());
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        comment::Comment,
        interest::Interest,
        user::{RoleAssignment, ROLE_ASSIGNMENT_COLLECTION},
    };
    use crate::test_support::{add_user, test_catalog};
    use serde_json::{json, Value};

    const COMMENTS: &str = "CommentsCollection.publication.user";

    #[tokio::test]
    async fn every_collection_gets_both_channels() {
        let catalog = test_catalog();
        let registry = register_publications(&catalog).unwrap();

        assert_eq!(registry.names().len(), 18);
        for collection in catalog.collections() {
            assert!(registry.get(&collection.user_publication_name()).is_ok());
            assert!(registry.get(&collection.admin_publication_name()).is_ok());
        }
        assert_eq!(registry.universal().len(), 1);
    }

    #[tokio::test]
    async fn public_channels_deliver_the_whole_collection() {
        let catalog = test_catalog();
        let registry = register_publications(&catalog).unwrap();
        for name in ["AI", "HPC", "Software Engineering"] {
            catalog.interests.insert(&Interest::new(name)).await.unwrap();
        }

        let docs = registry
            .snapshot(catalog.db(), "InterestsCollection.publication.user", None)
            .await
            .unwrap();
        let names: Vec<&Value> = docs.iter().map(|d| &d["name"]).collect();
        assert_eq!(names, vec![&json!("AI"), &json!("HPC"), &json!("Software Engineering")]);
    }

    #[tokio::test]
    async fn comments_are_empty_when_anonymous() {
        let catalog = test_catalog();
        let registry = register_publications(&catalog).unwrap();
        catalog.comments.insert(&Comment::new("john", "hi")).await.unwrap();

        let docs = registry.snapshot(catalog.db(), COMMENTS, None).await.unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn comments_are_scoped_to_the_owner() {
        let catalog = test_catalog();
        let registry = register_publications(&catalog).unwrap();
        let john = add_user(catalog.db(), "john").await;
        add_user(catalog.db(), "admin").await;
        catalog.comments.insert(&Comment::new("john", "mine")).await.unwrap();
        catalog.comments.insert(&Comment::new("admin", "not mine")).await.unwrap();
        catalog.comments.insert(&Comment::new("john", "also mine")).await.unwrap();

        let docs = registry
            .snapshot(catalog.db(), COMMENTS, Some(&john))
            .await
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d["owner"] == json!("john")));
    }

    #[tokio::test]
    async fn missing_user_record_yields_nothing() {
        let catalog = test_catalog();
        let registry = register_publications(&catalog).unwrap();
        catalog.comments.insert(&Comment::new("ghost", "boo")).await.unwrap();

        let ghost = Identity::new("no-such-user");
        let docs = registry
            .snapshot(catalog.db(), COMMENTS, Some(&ghost))
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn role_assignments_follow_the_requester() {
        let catalog = test_catalog();
        let registry = register_publications(&catalog).unwrap();
        let db = catalog.db();
        for (user, role) in [("u1", "admin"), ("u2", "user")] {
            let doc = serde_json::to_value(RoleAssignment::new(user, role)).unwrap();
            db.insert(ROLE_ASSIGNMENT_COLLECTION, doc.as_object().cloned().unwrap())
                .await
                .unwrap();
        }

        let roles = &registry.universal()[0];
        assert!(roles.query(db, None).await.unwrap().is_none());

        let query = roles.query(db, Some(&Identity::new("u1"))).await.unwrap().unwrap();
        let docs = db.find(&query.collection, &query.filter).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0]["role"]["_id"], json!("admin"));
    }

    #[tokio::test]
    async fn admin_channels_need_the_admin_role() {
        let catalog = test_catalog();
        let registry = register_publications(&catalog).unwrap();
        let db = catalog.db();
        catalog.comments.insert(&Comment::new("john", "x")).await.unwrap();
        let doc = serde_json::to_value(RoleAssignment::new("boss", "admin")).unwrap();
        db.insert(ROLE_ASSIGNMENT_COLLECTION, doc.as_object().cloned().unwrap())
            .await
            .unwrap();

        let channel = "CommentsCollection.publication.admin";
        let as_user = registry
            .snapshot(db, channel, Some(&Identity::new("john")))
            .await
            .unwrap();
        let as_admin = registry
            .snapshot(db, channel, Some(&Identity::new("boss")))
            .await
            .unwrap();
        assert!(as_user.is_empty());
        assert_eq!(as_admin.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_and_unknown_names_are_errors() {
        let mut registry = PublicationRegistry::new();
        registry.register("x", PublishAll::new("X")).unwrap();
        assert!(matches!(
            registry.register("x", PublishAll::new("X")),
            Err(PublicationError::Duplicate(_))
        ));
        assert!(matches!(registry.get("y"), Err(PublicationError::NotFound(_))));
    }
}
