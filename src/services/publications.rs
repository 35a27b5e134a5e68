pub mod policies;
pub mod registry;

pub use policies::{AdminOnly, OwnerScoped, PublishAll, RoleAssignments};
pub use registry::{register_publications, PublicationRegistry};

use crate::services::{
    auth::Identity,
    db::{Database, Filter, StoreError},
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PublicationError {
    #[error("Subscription '{0}' not found")]
    NotFound(String),

    #[error("publication {0} is already registered")]
    Duplicate(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The live view a publication hands out: documents of one collection
/// matching a filter, now and as they are inserted.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filter: Filter,
}

impl Query {
    pub fn new(collection: impl Into<String>, filter: Filter) -> Self {
        Query {
            collection: collection.into(),
            filter,
        }
    }
}

/**
 * A named view over a collection, evaluated per subscriber.
 * `Ok(None)` means "nothing for you": the subscription settles at once, empty.
 */
#[async_trait]
pub trait Publication: Send + Sync {
    async fn query(
        &self,
        db: &Database,
        requester: Option<&Identity>,
    ) -> Result<Option<Query>, PublicationError>;
}
