//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use stockroom_infra::ReconcilerConfig;

pub const BIND_ADDR_ENV: &str = "STOCKROOM_BIND_ADDR";
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const PHOTO_DIR_ENV: &str = "STOCKROOM_PHOTO_DIR";
pub const PUBLIC_BASE_URL_ENV: &str = "STOCKROOM_PUBLIC_BASE_URL";
pub const MAX_WRITE_ATTEMPTS_ENV: &str = "STOCKROOM_MAX_WRITE_ATTEMPTS";
pub const MAX_PHOTO_BYTES_ENV: &str = "STOCKROOM_MAX_PHOTO_BYTES";

#[derive(Debug, Error)]
#[error("{var}={value:?} is invalid: {reason}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub bind_addr: SocketAddr,
    /// Postgres connection string; in-memory documents when unset.
    pub database_url: Option<String>,
    /// Directory for photo files; in-memory photos when unset.
    pub photo_dir: Option<PathBuf>,
    /// Externally visible origin, used to build photo URLs.
    pub public_base_url: String,
    pub max_photo_bytes: usize,
    pub reconciler: ReconcilerConfig,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            database_url: None,
            photo_dir: None,
            public_base_url: "http://localhost:8080".to_string(),
            max_photo_bytes: 10 * 1024 * 1024,
            reconciler: ReconcilerConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup; unset or blank variables keep
    /// their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(v) = get(BIND_ADDR_ENV) {
            config.bind_addr = parse(BIND_ADDR_ENV, &v)?;
        }
        config.database_url = get(DATABASE_URL_ENV);
        config.photo_dir = get(PHOTO_DIR_ENV).map(PathBuf::from);
        if let Some(v) = get(PUBLIC_BASE_URL_ENV) {
            config.public_base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = get(MAX_PHOTO_BYTES_ENV) {
            config.max_photo_bytes = parse(MAX_PHOTO_BYTES_ENV, &v)?;
        }
        if let Some(v) = get(MAX_WRITE_ATTEMPTS_ENV) {
            let attempts: u32 = parse(MAX_WRITE_ATTEMPTS_ENV, &v)?;
            if attempts == 0 {
                return Err(ConfigError {
                    var: MAX_WRITE_ATTEMPTS_ENV,
                    value: v,
                    reason: "must be at least 1".to_string(),
                });
            }
            config.reconciler.max_write_attempts = attempts;
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(ApiConfig::from_lookup(lookup(&[])).unwrap(), ApiConfig::default());
    }

    #[test]
    fn reads_every_variable() {
        let config = ApiConfig::from_lookup(lookup(&[
            (BIND_ADDR_ENV, "127.0.0.1:9000"),
            (DATABASE_URL_ENV, "postgres://localhost/stockroom"),
            (PHOTO_DIR_ENV, "/var/lib/stockroom/photos"),
            (PUBLIC_BASE_URL_ENV, "https://stock.example/"),
            (MAX_WRITE_ATTEMPTS_ENV, "9"),
            (MAX_PHOTO_BYTES_ENV, "1024"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, SocketAddr::from(([127, 0, 0, 1], 9000)));
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/stockroom"));
        assert_eq!(config.photo_dir, Some(PathBuf::from("/var/lib/stockroom/photos")));
        assert_eq!(config.public_base_url, "https://stock.example");
        assert_eq!(config.reconciler.max_write_attempts, 9);
        assert_eq!(config.max_photo_bytes, 1024);
    }

    #[test]
    fn rejects_malformed_values() {
        let err = ApiConfig::from_lookup(lookup(&[(MAX_WRITE_ATTEMPTS_ENV, "many")])).unwrap_err();
        assert_eq!(err.var, MAX_WRITE_ATTEMPTS_ENV);

        let err = ApiConfig::from_lookup(lookup(&[(MAX_WRITE_ATTEMPTS_ENV, "0")])).unwrap_err();
        assert_eq!(err.reason, "must be at least 1");

        assert!(ApiConfig::from_lookup(lookup(&[(BIND_ADDR_ENV, "nowhere")])).is_err());
    }

    #[test]
    fn blank_values_are_ignored() {
        let config = ApiConfig::from_lookup(lookup(&[(DATABASE_URL_ENV, "  ")])).unwrap();
        assert_eq!(config.database_url, None);
    }
}
