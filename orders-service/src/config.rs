use std::time::Duration;

use bookstore_common::config::{env_lookup, parsed_or, pem, required, ConfigError, DatabaseConfig, ServerConfig};

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_BOOKS_TIMEOUT_MS: u64 = 3000;

#[derive(Clone, Debug)]
pub struct BooksServiceConfig {
    /// Base URL of the books service, e.g. `http://books:3000`.
    pub url: String,
    pub timeout: Duration,
}

#[derive(Clone, Debug)]
pub struct OrdersConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub books: BooksServiceConfig,
    pub jwt_public_key: Vec<u8>,
}

impl OrdersConfig {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(&env_lookup) }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_ms = parsed_or(lookup, "BOOKS_TIMEOUT_MS", DEFAULT_BOOKS_TIMEOUT_MS)?;
        Ok(Self {
            server: ServerConfig::from_lookup(lookup, DEFAULT_PORT)?,
            database: DatabaseConfig::from_lookup(lookup, "sqlite://orders.db")?,
            books: BooksServiceConfig { url: required(lookup, "BOOKS_URL")?, timeout: Duration::from_millis(timeout_ms) },
            jwt_public_key: pem(lookup, "JWT_PUBLIC_KEY")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUBLIC_PEM: &str = include_str!("../../testdata/jwt_public.pem");

    #[test]
    fn books_url_is_required() {
        let lookup = |k: &str| (k == "JWT_PUBLIC_KEY").then(|| PUBLIC_PEM.to_string());
        assert_eq!(OrdersConfig::from_lookup(&lookup).unwrap_err(), ConfigError::Missing("BOOKS_URL".into()));
    }

    #[test]
    fn defaults() {
        let lookup = |k: &str| match k {
            "JWT_PUBLIC_KEY" => Some(PUBLIC_PEM.to_string()),
            "BOOKS_URL" => Some("http://localhost:3000".to_string()),
            _ => None,
        };
        let cfg = OrdersConfig::from_lookup(&lookup).unwrap();
        assert_eq!(cfg.server.port, 3001);
        assert_eq!(cfg.books.timeout, Duration::from_millis(3000));
        assert_eq!(cfg.database.url, "sqlite://orders.db");
    }
}
