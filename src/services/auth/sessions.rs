use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

/// The logged-in user behind a request or connection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Identity {
            user_id: user_id.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("session lookup failed: {0}")]
    Redis(#[from] redis::RedisError),
}

/**
 * Maps a login token to the user it was issued for.
 * Tokens are issued elsewhere; an unknown token is simply anonymous.
 */
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, SessionError>;
}

#[derive(Default)]
pub struct MemorySessions {
    tokens: DashMap<String, String>,
}

impl MemorySessions {
    pub fn new() -> Self {
        MemorySessions::default()
    }

    pub fn insert(&self, token: impl Into<String>, user_id: impl Into<String>) {
        self.tokens.insert(token.into(), user_id.into());
    }
}

#[async_trait]
impl SessionResolver for MemorySessions {
    async fn resolve(&self, token: &str) -> Result<Option<Identity>, SessionError> {
        Ok(self
            .tokens
            .get(token)
            .map(|user_id| Identity::new(user_id.value().clone())))
    }
}
