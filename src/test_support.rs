use crate::config::AppConfig;
use crate::models::user::{User, USERS_COLLECTION};
use crate::services::{
    auth::{Identity, MemorySessions},
    collection::Catalog,
    db::{memory_store::MemoryStore, Database},
    publications::register_publications,
};
use crate::AppState;
use std::sync::Arc;

pub fn test_catalog() -> Catalog {
    Catalog::new(Database::new(Arc::new(MemoryStore::new()))).unwrap()
}

pub fn test_state() -> (AppState, Arc<MemorySessions>) {
    let catalog = test_catalog();
    let publications = register_publications(&catalog).unwrap();
    let sessions = Arc::new(MemorySessions::new());
    let state = AppState {
        catalog: Arc::new(catalog),
        publications: Arc::new(publications),
        sessions: sessions.clone(),
        config: Arc::new(AppConfig::in_memory()),
    };
    (state, sessions)
}

/// Stores a `users` record and returns the identity that logs in as it.
pub async fn add_user(db: &Database, username: &str) -> Identity {
    let user = User {
        id: format!("{}-id", username),
        username: username.to_string(),
    };
    let document = serde_json::to_value(&user).unwrap();
    db.insert(USERS_COLLECTION, document.as_object().cloned().unwrap())
        .await
        .unwrap();
    Identity::new(user.id)
}
