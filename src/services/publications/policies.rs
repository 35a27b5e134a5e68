use crate::models::user::{ADMIN_ROLE, ROLE_ASSIGNMENT_COLLECTION, USERS_COLLECTION};
use crate::services::{
    auth::Identity,
    db::{Database, Filter},
    publications::{Publication, PublicationError, Query},
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

/// Every document, for every subscriber.
pub struct PublishAll {
    collection: String,
}

impl PublishAll {
    pub fn new(collection: impl Into<String>) -> Self {
        PublishAll {
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Publication for PublishAll {
    async fn query(
        &self,
        _db: &Database,
        _requester: Option<&Identity>,
    ) -> Result<Option<Query>, PublicationError> {
        Ok(Some(Query::new(&self.collection, Filter::all())))
    }
}

/**
 * Documents whose owner field equals the requester's username.
 * Anonymous requesters, and users without a `users` record, get nothing.
 */
pub struct OwnerScoped {
    collection: String,
    owner_field: &'static str,
}

impl OwnerScoped {
    pub fn new(collection: impl Into<String>) -> Self {
        OwnerScoped {
            collection: collection.into(),
            owner_field: "owner",
        }
    }
}

async fn username_of(
    db: &Database,
    identity: &Identity,
) -> Result<Option<String>, PublicationError> {
    let user = db
        .find_one(USERS_COLLECTION, &Filter::eq("_id", identity.user_id.as_str()))
        .await?;
    Ok(user.and_then(|user| user.get("username").and_then(Value::as_str).map(str::to_string)))
}

#[async_trait]
impl Publication for OwnerScoped {
    async fn query(
        &self,
        db: &Database,
        requester: Option<&Identity>,
    ) -> Result<Option<Query>, PublicationError> {
        let Some(identity) = requester else {
            return Ok(None);
        };

        match username_of(db, identity).await? {
            Some(username) => Ok(Some(Query::new(
                &self.collection,
                Filter::eq(self.owner_field, username),
            ))),
            None => {
                warn!(
                    "no user record for {}, publishing nothing from {}",
                    identity.user_id, self.collection
                );
                Ok(None)
            }
        }
    }
}

/// The requester's own role assignments; sent to every connection.
pub struct RoleAssignments;

#[async_trait]
impl Publication for RoleAssignments {
    async fn query(
        &self,
        _db: &Database,
        requester: Option<&Identity>,
    ) -> Result<Option<Query>, PublicationError> {
        Ok(requester.map(|identity| {
            Query::new(
                ROLE_ASSIGNMENT_COLLECTION,
                Filter::eq("user._id", identity.user_id.as_str()),
            )
        }))
    }
}

pub(crate) async fn has_role(
    db: &Database,
    identity: &Identity,
    role: &str,
) -> Result<bool, PublicationError> {
    let assignment = db
        .find_one(
            ROLE_ASSIGNMENT_COLLECTION,
            &Filter::eq("user._id", identity.user_id.as_str()).and("role._id", role),
        )
        .await?;
    Ok(assignment.is_some())
}

/// Everything, but only for holders of the admin role.
pub struct AdminOnly {
    collection: String,
}

impl AdminOnly {
    pub fn new(collection: impl Into<String>) -> Self {
        AdminOnly {
            collection: collection.into(),
        }
    }
}

#[async_trait]
impl Publication for AdminOnly {
    async fn query(
        &self,
        db: &Database,
        requester: Option<&Identity>,
    ) -> Result<Option<Query>, PublicationError> {
        let Some(identity) = requester else {
            return Ok(None);
        };
        if has_role(db, identity, ADMIN_ROLE).await? {
            Ok(Some(Query::new(&self.collection, Filter::all())))
        } else {
            Ok(None)
        }
    }
}
