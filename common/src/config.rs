//! Environment-backed configuration primitives shared by the service configs.
//! Every loader takes a lookup function so it can be exercised without touching the
//! process environment.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(String),
    #[error("{name} is invalid: {reason}")]
    Invalid { name: String, reason: String },
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Browser origins allowed by CORS (`CORS_ORIGINS`, comma separated). Empty disables CORS.
    pub cors_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_lookup<F>(lookup: &F, default_port: u16) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parsed_or(lookup, "PORT", default_port)?;
        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(|origin| {
                        HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                            name: "CORS_ORIGINS".into(),
                            reason: e.to_string(),
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()
            })
            .transpose()?
            .unwrap_or_default();
        Ok(Self { host, port, cors_origins })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid { name: "HOST".into(), reason: e.to_string() })
    }
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_lookup<F>(lookup: &F, default_url: &str) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL").unwrap_or_else(|| default_url.to_string());
        let max_connections = parsed_or(lookup, "DB_MAX_CONNECTIONS", 5)?;
        Ok(Self { url, max_connections })
    }
}

/// Process environment as a lookup function.
pub fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

pub fn required<F>(lookup: &F, name: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or_else(|| ConfigError::Missing(name.to_string()))
}

pub fn parsed_or<F, T>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::Invalid { name: name.to_string(), reason: e.to_string() }),
        None => Ok(default),
    }
}

/// PEM key material from a variable. Single-line values with literal `\n` escapes are
/// expanded, since that is how multi-line keys usually end up in env files.
pub fn pem<F>(lookup: &F, name: &str) -> Result<Vec<u8>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = required(lookup, name)?;
    let pem = raw.replace("\\n", "\n");
    if !pem.contains("-----BEGIN") {
        return Err(ConfigError::Invalid { name: name.to_string(), reason: "not a PEM document".into() });
    }
    Ok(pem.into_bytes())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn server_defaults_and_overrides() {
        let cfg = ServerConfig::from_lookup(&lookup_from(&[]), 3001).unwrap();
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.port, 3001);
        let cfg = ServerConfig::from_lookup(&lookup_from(&[("PORT", "9000"), ("HOST", "127.0.0.1")]), 3001).unwrap();
        assert_eq!(cfg.socket_addr().unwrap(), "127.0.0.1:9000".parse().unwrap());
    }

    #[test]
    fn cors_origins_are_opt_in() {
        let cfg = ServerConfig::from_lookup(&lookup_from(&[]), 3000).unwrap();
        assert!(cfg.cors_origins.is_empty());
        let cfg = ServerConfig::from_lookup(&lookup_from(&[("CORS_ORIGINS", "http://shop.local, http://localhost:5173,")]), 3000).unwrap();
        assert_eq!(cfg.cors_origins, vec![HeaderValue::from_static("http://shop.local"), HeaderValue::from_static("http://localhost:5173")]);
    }

    #[test]
    fn bad_cors_origin_is_reported() {
        let err = ServerConfig::from_lookup(&lookup_from(&[("CORS_ORIGINS", "http://a\u{7f}b")]), 3000).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "CORS_ORIGINS"));
    }

    #[test]
    fn bad_port_is_reported() {
        let err = ServerConfig::from_lookup(&lookup_from(&[("PORT", "http")]), 3000).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref name, .. } if name == "PORT"));
    }

    #[test]
    fn database_defaults() {
        let cfg = DatabaseConfig::from_lookup(&lookup_from(&[]), "sqlite://books.db").unwrap();
        assert_eq!(cfg.url, "sqlite://books.db");
        assert_eq!(cfg.max_connections, 5);
    }

    #[test]
    fn pem_expands_escaped_newlines() {
        let lookup = lookup_from(&[("JWT_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----\\nabc\\n-----END PUBLIC KEY-----")]);
        let pem = pem(&lookup, "JWT_PUBLIC_KEY").unwrap();
        assert_eq!(String::from_utf8(pem).unwrap().lines().count(), 3);
    }

    #[test]
    fn pem_must_be_present_and_look_like_pem() {
        assert_eq!(pem(&lookup_from(&[]), "JWT_PUBLIC_KEY"), Err(ConfigError::Missing("JWT_PUBLIC_KEY".into())));
        assert!(matches!(pem(&lookup_from(&[("K", "secret")]), "K"), Err(ConfigError::Invalid { .. })));
    }
}
