use crate::services::{
    auth::Identity,
    collection::{Catalog, CollectionError},
    form::FormError,
    schema::SchemaError,
};
use serde_json::Value;
use thiserror::Error;

pub mod add_project;

pub use add_project::ADD_PROJECT_METHOD;

#[derive(Error, Debug)]
pub enum MethodError {
    #[error("Method '{0}' not found")]
    NotFound(String),

    #[error(transparent)]
    Form(#[from] FormError),

    #[error(transparent)]
    Collection(#[from] CollectionError),
}

impl From<SchemaError> for MethodError {
    fn from(err: SchemaError) -> Self {
        MethodError::Form(err.into())
    }
}

/**
 * Entry point for remote writes, shared by HTTP and the websocket.
 * Returns the method's result value.
 */
pub async fn call(
    catalog: &Catalog,
    requester: Option<&Identity>,
    method: &str,
    params: Value,
) -> Result<Value, MethodError> {
    match method {
        ADD_PROJECT_METHOD => add_project::add_project(catalog, requester, params).await,
        other => Err(MethodError::NotFound(other.to_string())),
    }
}
