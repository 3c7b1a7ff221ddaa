use bookstore_common::config::{env_lookup, pem, ConfigError, DatabaseConfig, ServerConfig};

pub const DEFAULT_PORT: u16 = 3000;

#[derive(Clone, Debug)]
pub struct BooksConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// PEM-encoded RSA public key used to verify bearer tokens.
    pub jwt_public_key: Vec<u8>,
}

impl BooksConfig {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(&env_lookup) }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            server: ServerConfig::from_lookup(lookup, DEFAULT_PORT)?,
            database: DatabaseConfig::from_lookup(lookup, "sqlite://books.db")?,
            jwt_public_key: pem(lookup, "JWT_PUBLIC_KEY")?,
        })
    }
}
