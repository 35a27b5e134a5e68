use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

use crate::config::AppConfig;
use crate::services::{
    auth::SessionResolver, collection::Catalog, publications::PublicationRegistry,
};

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub publications: Arc<PublicationRegistry>, //filled once at startup, read-only afterwards
    pub sessions: Arc<dyn SessionResolver>,
    pub config: Arc<AppConfig>,
}

pub fn build_router(state: AppState) -> Router {
    //setting cors
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(services::routes::list_publications))
        .route(
            "/api/publications/{name}",
            get(services::routes::publication_snapshot),
        )
        .route(
            "/api/forms/add-project",
            get(services::routes::add_project_form),
        )
        .route("/api/methods/{name}", post(services::routes::call_method))
        .merge(services::socket::router())
        .with_state(state)
        .layer(cors)
}
