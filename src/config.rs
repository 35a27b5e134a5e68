use std::{collections::HashMap, env, path::PathBuf, time::Duration};
use thiserror::Error;

const DEFAULT_DATABASE: &str = "projectCatalog";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum StoreBackend {
    Mongo { uri: String, database: String },
    Memory,
}

/// Process settings, read once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreBackend,
    pub redis_url: Option<String>,
    pub bind_addr: String,
    pub log_dir: PathBuf,
    pub log_filter: String,
    pub subscription_timeout: Duration,
    pub seed_file: Option<PathBuf>,
}

impl AppConfig {
    /**
     * Read settings from the process environment.
     * Call `dotenv().ok()` first so `.env` values are visible.
     */
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).filter(|value| !value.is_empty()).cloned();

        let store = match get("STORE_BACKEND").as_deref().unwrap_or("mongodb") {
            "mongodb" | "mongo" => StoreBackend::Mongo {
                uri: get("MONGODB_URI").ok_or(ConfigError::Missing("MONGODB_URI"))?,
                database: get("MONGODB_DATABASE").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            },
            "memory" => StoreBackend::Memory,
            other => {
                return Err(ConfigError::Invalid {
                    key: "STORE_BACKEND",
                    value: other.to_string(),
                })
            }
        };

        let subscription_timeout = match get("SUBSCRIPTION_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse().map_err(|_| ConfigError::Invalid {
                key: "SUBSCRIPTION_TIMEOUT_SECS",
                value: raw.clone(),
            })?),
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(AppConfig {
            store,
            redis_url: get("REDIS_URL"),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            log_dir: PathBuf::from(get("LOG_DIR").unwrap_or_else(|| "logs".to_string())),
            log_filter: get("LOG_FILTER").unwrap_or_else(|| "info".to_string()),
            subscription_timeout,
            seed_file: get("SEED_FILE").map(PathBuf::from),
        })
    }

    /// Settings for tests and local experiments: memory store, no redis.
    pub fn in_memory() -> Self {
        AppConfig {
            store: StoreBackend::Memory,
            redis_url: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_dir: PathBuf::from("logs"),
            log_filter: "info".to_string(),
            subscription_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            seed_file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn mongo_is_the_default_backend() {
        let config =
            AppConfig::from_vars(vars(&[("MONGODB_URI", "mongodb://localhost:27017")])).unwrap();
        assert_eq!(
            config.store,
            StoreBackend::Mongo {
                uri: "mongodb://localhost:27017".to_string(),
                database: "projectCatalog".to_string(),
            }
        );
        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.subscription_timeout, Duration::from_secs(10));
        assert!(config.redis_url.is_none());
    }

    #[test]
    fn mongo_without_uri_is_rejected() {
        let err = AppConfig::from_vars(vars(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("MONGODB_URI"));
    }

    #[test]
    fn memory_backend_needs_no_uri() {
        let config = AppConfig::from_vars(vars(&[
            ("STORE_BACKEND", "memory"),
            ("SUBSCRIPTION_TIMEOUT_SECS", "3"),
            ("SEED_FILE", "seed.json"),
        ]))
        .unwrap();
        assert_eq!(config.store, StoreBackend::Memory);
        assert_eq!(config.subscription_timeout, Duration::from_secs(3));
        assert_eq!(config.seed_file, Some(PathBuf::from("seed.json")));
    }

    #[test]
    fn bad_values_are_reported() {
        let err = AppConfig::from_vars(vars(&[("STORE_BACKEND", "sqlite")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "STORE_BACKEND", .. }));

        let err = AppConfig::from_vars(vars(&[
            ("STORE_BACKEND", "memory"),
            ("SUBSCRIPTION_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SUBSCRIPTION_TIMEOUT_SECS", .. }));
    }
}
