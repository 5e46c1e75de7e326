//! Process settings from the environment (optionally loaded from `.env` by the binary).

use crate::error::ConfigError;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Where the table/operation universe comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SchemaSource {
    /// Read `information_schema` of the connected database at startup.
    Introspect,
    /// Read a declared schema JSON file.
    File(PathBuf),
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub db_schema: String,
    pub schema_source: SchemaSource,
    pub bind: SocketAddr,
    pub api_prefix: String,
    /// Single-record actions need a non-empty target segment.
    pub require_target: bool,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub body_limit: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: "postgres://localhost/bridge".into(),
            db_schema: "public".into(),
            schema_source: SchemaSource::Introspect,
            bind: SocketAddr::from(([0, 0, 0, 0], 3000)),
            api_prefix: "/api".into(),
            require_target: false,
            max_connections: 5,
            acquire_timeout: Duration::from_secs(30),
            body_limit: 1024 * 1024,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Build settings from a variable map; unset variables keep their defaults.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let mut s = Settings::default();
        let get = |name: &str| vars.get(name).map(|v| v.trim()).filter(|v| !v.is_empty());

        if let Some(v) = get("DATABASE_URL") {
            s.database_url = v.to_string();
        }
        if let Some(v) = get("BRIDGE_DB_SCHEMA") {
            s.db_schema = v.to_string();
        }
        if let Some(v) = get("BRIDGE_SCHEMA_SOURCE") {
            s.schema_source = if v.eq_ignore_ascii_case("introspect") {
                SchemaSource::Introspect
            } else {
                SchemaSource::File(PathBuf::from(v))
            };
        }
        if let Some(v) = get("BRIDGE_BIND") {
            s.bind = v.parse().map_err(|e| setting("BRIDGE_BIND", e))?;
        }
        if let Some(v) = get("BRIDGE_API_PREFIX") {
            s.api_prefix = normalize_prefix(v);
        }
        if let Some(v) = get("BRIDGE_REQUIRE_TARGET") {
            s.require_target = parse_bool(v).ok_or_else(|| setting("BRIDGE_REQUIRE_TARGET", "expected true or false"))?;
        }
        if let Some(v) = get("BRIDGE_MAX_CONNECTIONS") {
            s.max_connections = v.parse().map_err(|e| setting("BRIDGE_MAX_CONNECTIONS", e))?;
            if s.max_connections == 0 {
                return Err(setting("BRIDGE_MAX_CONNECTIONS", "must be at least 1"));
            }
        }
        if let Some(v) = get("BRIDGE_ACQUIRE_TIMEOUT_SECS") {
            let secs: u64 = v.parse().map_err(|e| setting("BRIDGE_ACQUIRE_TIMEOUT_SECS", e))?;
            s.acquire_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = get("BRIDGE_BODY_LIMIT") {
            s.body_limit = v.parse().map_err(|e| setting("BRIDGE_BODY_LIMIT", e))?;
        }
        Ok(s)
    }
}

fn setting(name: &'static str, message: impl ToString) -> ConfigError {
    ConfigError::Setting {
        name,
        message: message.to_string(),
    }
}

fn parse_bool(v: &str) -> Option<bool> {
    match v.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// "/api/" -> "/api", "api" -> "/api", "/" -> "" (mount at root).
fn normalize_prefix(v: &str) -> String {
    let trimmed = v.trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}
