use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{config_error, Error};

pub const ROUTING_CREDENTIAL_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const DEFAULT_ROUTES_API_BASE: &str = "https://routes.googleapis.com";

#[derive(Clone, Debug)]
pub struct Config {
    pub listen_addr: SocketAddr,
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub routes_api_base: String,
    pub routes_timeout: Duration,
    pub rate_limit_window: Duration,
    pub rate_limit_max_requests: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: None,
            database_max_connections: 5,
            routes_api_base: DEFAULT_ROUTES_API_BASE.into(),
            routes_timeout: Duration::from_millis(5000),
            rate_limit_window: Duration::from_secs(60),
            rate_limit_max_requests: 4,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from any variable source; unset or blank variables keep their default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            listen_addr: parse_or(get("LISTEN_ADDR"), "LISTEN_ADDR", defaults.listen_addr)?,
            database_url: get("DATABASE_URL"),
            database_max_connections: parse_or(
                get("DATABASE_MAX_CONNECTIONS"),
                "DATABASE_MAX_CONNECTIONS",
                defaults.database_max_connections,
            )?,
            routes_api_base: get("GOOGLE_ROUTES_API_BASE")
                .map(|base| base.trim_end_matches('/').to_owned())
                .unwrap_or(defaults.routes_api_base),
            routes_timeout: Duration::from_millis(parse_or(
                get("GOOGLE_ROUTES_TIMEOUT_MS"),
                "GOOGLE_ROUTES_TIMEOUT_MS",
                defaults.routes_timeout.as_millis() as u64,
            )?),
            rate_limit_window: Duration::from_secs(parse_or(
                get("RATE_LIMIT_WINDOW_SECS"),
                "RATE_LIMIT_WINDOW_SECS",
                defaults.rate_limit_window.as_secs(),
            )?),
            rate_limit_max_requests: parse_or(
                get("RATE_LIMIT_MAX_REQUESTS"),
                "RATE_LIMIT_MAX_REQUESTS",
                defaults.rate_limit_max_requests,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(value: Option<String>, name: &str, default: T) -> Result<T, Error> {
    match value {
        Some(raw) => raw.trim().parse().map_err(|_| config_error(name, &raw)),
        None => Ok(default),
    }
}

/// Source of the routing provider credential. Absence is a normal operating mode.
pub trait CredentialProvider: Send + Sync {
    fn routing_credential(&self) -> Option<String>;
}

/// Reads the credential from the environment on every call.
#[derive(Clone, Debug)]
pub struct EnvCredentials {
    var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        Self {
            var: ROUTING_CREDENTIAL_VAR.into(),
        }
    }
}

impl CredentialProvider for EnvCredentials {
    fn routing_credential(&self) -> Option<String> {
        env::var(&self.var)
            .ok()
            .filter(|key| !key.trim().is_empty())
    }
}

#[derive(Clone, Debug, Default)]
pub struct StaticCredential(pub Option<String>);

impl StaticCredential {
    pub fn some(key: impl Into<String>) -> Self {
        Self(Some(key.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl CredentialProvider for StaticCredential {
    fn routing_credential(&self) -> Option<String> {
        self.0.clone().filter(|key| !key.trim().is_empty())
    }
}
