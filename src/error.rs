use crate::services::{
    auth::SessionError,
    collection::CollectionError,
    db::StoreError,
    form::FormError,
    methods::MethodError,
    publications::PublicationError,
    schema::{SchemaError, Violations},
};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(Violations),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Store(_) | AppError::Session(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation-error",
            AppError::BadRequest(_) => "bad-request",
            AppError::NotFound(_) => "not-found",
            AppError::Store(_) => "store-error",
            AppError::Session(_) => "session-error",
            AppError::Internal(_) => "internal-error",
        }
    }
}

impl From<SchemaError> for AppError {
    fn from(err: SchemaError) -> Self {
        match err {
            SchemaError::Invalid { violations, .. } => AppError::Validation(violations),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<FormError> for AppError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Invalid(violations) => AppError::Validation(violations),
            FormError::NotAnObject | FormError::Malformed(_) => {
                AppError::BadRequest(err.to_string())
            }
            FormError::Schema(err) => err.into(),
        }
    }
}

impl From<CollectionError> for AppError {
    fn from(err: CollectionError) -> Self {
        match err {
            CollectionError::Schema(err) => err.into(),
            CollectionError::Store(err) => AppError::Store(err),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<PublicationError> for AppError {
    fn from(err: PublicationError) -> Self {
        match err {
            PublicationError::NotFound(_) => AppError::NotFound(err.to_string()),
            PublicationError::Store(err) => AppError::Store(err),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<MethodError> for AppError {
    fn from(err: MethodError) -> Self {
        match err {
            MethodError::NotFound(_) => AppError::NotFound(err.to_string()),
            MethodError::Form(err) => err.into(),
            MethodError::Collection(err) => err.into(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("request failed: {}", self);
        }

        let mut body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        if let AppError::Validation(violations) = &self {
            body["violations"] = json!(violations);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::Value;

    #[tokio::test]
    async fn malformed_form_data_is_a_bad_request() {
        let err = AppError::from(FormError::Malformed("invalid type: integer".to_string()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let resp = err.into_response();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], json!("bad-request"));
        assert!(body["message"].as_str().unwrap().contains("invalid type"));
    }
}
