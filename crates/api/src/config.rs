use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use thiserror::Error;

const DEV_JWT_SECRET: &str = "dev-secret";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required config key {0}")]
    Missing(&'static str),

    #[error("{key} {reason}")]
    Invalid { key: &'static str, reason: &'static str },
}

#[derive(Clone)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub jwt_secret: String,
    pub db_max_connections: u32,
}

// Keeps the secret and credentials in the URL out of logs.
impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("db_max_connections", &self.db_max_connections)
            .finish_non_exhaustive()
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let kv: HashMap<String, String> = std::env::vars().collect();
        Self::from_kv(&kv)
    }

    pub fn from_kv(kv: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let bind_addr = parse_socket_addr(
            kv.get("BIND_ADDR"),
            SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 8080),
            "BIND_ADDR",
        )?;

        let database_url = require_nonempty(kv, "DATABASE_URL")?;

        let jwt_secret = match kv.get("JWT_SECRET").map(|s| s.trim()) {
            Some(secret) if !secret.is_empty() => secret.to_string(),
            _ => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                DEV_JWT_SECRET.to_string()
            }
        };

        let db_max_connections = match kv.get("DB_MAX_CONNECTIONS") {
            None => 5,
            Some(v) => v.trim().parse::<u32>().map_err(|_| ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                reason: "must be a positive integer",
            })?,
        };
        if db_max_connections == 0 {
            return Err(ConfigError::Invalid {
                key: "DB_MAX_CONNECTIONS",
                reason: "must be >= 1",
            });
        }

        Ok(Self {
            bind_addr,
            database_url,
            jwt_secret,
            db_max_connections,
        })
    }
}

fn require_nonempty(kv: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    let value = kv.get(key).map(|v| v.trim()).unwrap_or_default();
    if value.is_empty() {
        return Err(ConfigError::Missing(key));
    }
    Ok(value.to_string())
}

fn parse_socket_addr(
    value: Option<&String>,
    default: SocketAddr,
    key: &'static str,
) -> Result<SocketAddr, ConfigError> {
    match value {
        None => Ok(default),
        Some(v) => v.trim().parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            key,
            reason: "must be a valid host:port socket address",
        }),
    }
}
