use std::collections::HashMap;

use crate::utils::RetryConfig;

// ============================================================================
// Service Configuration
// ============================================================================
//
// Read from environment variables:
//   COURSES_STORE            memory | scylla          (default: memory)
//   SCYLLA_NODE              host:port                (default: 127.0.0.1:9042)
//   SCYLLA_KEYSPACE          keyspace name            (default: courses_ks)
//   METRICS_PORT             0 disables the server    (default: 9090)
//   CONFLICT_RETRY_ATTEMPTS  attempts per mutation    (default: 5)
//
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum StoreBackend {
    Memory,
    Scylla { node: String, keyspace: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub store: StoreBackend,
    pub metrics_port: Option<u16>,
    pub retry: RetryConfig,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Unknown store backend: {0} (expected memory or scylla)")]
    UnknownStore(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::Memory,
            metrics_port: Some(9090),
            retry: RetryConfig::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let store = match get("COURSES_STORE").unwrap_or("memory") {
            "memory" => StoreBackend::Memory,
            "scylla" => StoreBackend::Scylla {
                node: get("SCYLLA_NODE").unwrap_or("127.0.0.1:9042").to_string(),
                keyspace: get("SCYLLA_KEYSPACE").unwrap_or("courses_ks").to_string(),
            },
            other => return Err(ConfigError::UnknownStore(other.to_string())),
        };

        let metrics_port = match get("METRICS_PORT") {
            None => Some(9090),
            Some(raw) => match raw.parse::<u16>() {
                Ok(0) => None,
                Ok(port) => Some(port),
                Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: "METRICS_PORT",
                        value: raw.to_string(),
                    })
                }
            },
        };

        let mut retry = RetryConfig::default();
        if let Some(raw) = get("CONFLICT_RETRY_ATTEMPTS") {
            let attempts = raw.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: "CONFLICT_RETRY_ATTEMPTS",
                value: raw.to_string(),
            })?;
            retry = retry.with_max_attempts(attempts);
        }

        Ok(Self { store, metrics_port, retry })
    }
}
