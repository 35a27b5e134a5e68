use crate::config::{AppConfig, StoreBackend};
use crate::services::db::{memory_store::MemoryStore, mongo_store::MongoStore, Database};
use anyhow::Result;
use mongodb::Client;
use std::sync::Arc;
use tracing::{info, warn};

/**
 * function to connect_db
 * picks the configured backend and wraps it in a Database handle
 */
pub async fn connect_db(config: &AppConfig) -> Result<Database> {
    match &config.store {
        StoreBackend::Mongo { uri, database } => {
            let client = Client::with_uri_str(uri).await?;
            info!("Connected to MongoDB database {}", database);
            Ok(Database::new(Arc::new(MongoStore::new(client.database(database)))))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory document store, data is lost on restart");
            Ok(Database::new(Arc::new(MemoryStore::new())))
        }
    }
}
