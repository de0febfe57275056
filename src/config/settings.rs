use crate::error::ConfigError;
use std::net::SocketAddr;
use std::str::FromStr;

/// Which record store backs the API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

impl FromStr for StoreKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreKind::Postgres),
            "memory" => Ok(StoreKind::Memory),
            _ => Err(()),
        }
    }
}

/// Page-size bounds for list endpoints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListDefaults {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for ListDefaults {
    fn default() -> Self {
        ListDefaults {
            default_limit: 10,
            max_limit: 1000,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub store: StoreKind,
    /// Required when `store` is `Postgres`.
    pub database_url: Option<String>,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
    pub list: ListDefaults,
}

impl ServerConfig {
    /// Read from process env. Call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let store = match get("OMS_STORE") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "OMS_STORE",
                value: v.clone(),
            })?,
            None => StoreKind::Postgres,
        };
        let database_url = get("DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let list = ListDefaults {
            default_limit: parse_or(get("OMS_DEFAULT_PAGE_LIMIT"), "OMS_DEFAULT_PAGE_LIMIT", 10)?,
            max_limit: parse_or(get("OMS_MAX_PAGE_LIMIT"), "OMS_MAX_PAGE_LIMIT", 1000)?,
        };
        if list.default_limit == 0 || list.default_limit > list.max_limit {
            return Err(ConfigError::Invalid {
                key: "OMS_DEFAULT_PAGE_LIMIT",
                value: list.default_limit.to_string(),
            });
        }

        Ok(ServerConfig {
            store,
            database_url,
            bind_addr: parse_or(get("OMS_BIND_ADDR"), "OMS_BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 8080)))?,
            max_connections: parse_or(get("OMS_MAX_CONNECTIONS"), "OMS_MAX_CONNECTIONS", 5)?,
            body_limit_bytes: parse_or(get("OMS_BODY_LIMIT_BYTES"), "OMS_BODY_LIMIT_BYTES", 1024 * 1024)?,
            list,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match raw {
        Some(v) => v.parse().map_err(|_| ConfigError::Invalid { key, value: v }),
        None => Ok(default),
    }
}
