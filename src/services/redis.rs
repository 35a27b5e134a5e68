use anyhow::Result;
use redis::{aio::ConnectionManager, Client};

pub mod session_tokens;

/**
 * function to connect_redis
 */
pub async fn connect_redis(redis_url: &str) -> Result<ConnectionManager> {
    let client = Client::open(redis_url)?;
    let manager = client.get_connection_manager().await?;
    Ok(manager)
}
