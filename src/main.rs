use std::sync::Arc;

use anyhow::Result;
use dotenv::dotenv;
use project_catalog::{
    build_router,
    config::AppConfig,
    services::{
        self,
        auth::{MemorySessions, SessionResolver},
        collection::Catalog,
        publications::register_publications,
        redis::session_tokens::RedisSessions,
    },
    AppState,
};
//Logging
use tracing::{info, warn};
use tracing_appender::rolling;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let config = AppConfig::from_env()?;

    let file_appender = rolling::daily(&config.log_dir, "project-catalog.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .init();

    info!("Logging initialised");

    let db = services::db::connect_db::connect_db(&config).await?;
    let catalog = Catalog::new(db)?;

    if let Some(path) = &config.seed_file {
        let seed = services::seed::read_seed_from_disk(path.clone()).await?;
        let inserted = services::seed::seed_empty_collections(&catalog, &seed).await?;
        info!("Seed file loaded, {} documents inserted", inserted);
    }

    let publications = register_publications(&catalog)?;

    let sessions: Arc<dyn SessionResolver> = match &config.redis_url {
        Some(url) => Arc::new(RedisSessions::new(
            services::redis::connect_redis(url).await?,
        )),
        None => {
            warn!("REDIS_URL not set, every client is anonymous");
            Arc::new(MemorySessions::new())
        }
    };

    let bind_addr = config.bind_addr.clone();
    let state = AppState {
        catalog: Arc::new(catalog),
        publications: Arc::new(publications),
        sessions,
        config: Arc::new(config),
    };

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("Listening on {}", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
