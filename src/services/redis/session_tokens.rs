use crate::services::auth::{Identity, SessionError, SessionResolver};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::debug;

fn session_key(token: &str) -> String {
    format!("session:{}", token)
}

/// Login tokens stored in redis as `session:<token>` -> user id.
pub struct RedisSessions {
    conn: ConnectionManager,
}

impl RedisSessions {
    pub fn new(conn: ConnectionManager) -> Self {
        RedisSessions { conn }
    }
}

#[async_trait]
impl SessionResolver for RedisSessions {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, SessionError> {
        let mut redis_conn = self.conn.clone();
        let user_id: Option<String> = redis_conn.get(session_key(token)).await?;
        if user_id.is_none() {
            debug!("unknown session token");
        }
        Ok(user_id.map(Identity::new))
    }
}
