use bookstore_common::config::{env_lookup, pem, ConfigError, DatabaseConfig, ServerConfig};

pub const DEFAULT_PORT: u16 = 3002;

#[derive(Clone, Debug)]
pub struct UsersConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    /// PEM-encoded RSA private key used to sign login tokens.
    pub jwt_private_key: Vec<u8>,
}

impl UsersConfig {
    pub fn from_env() -> Result<Self, ConfigError> { Self::from_lookup(&env_lookup) }

    pub fn from_lookup<F>(lookup: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            server: ServerConfig::from_lookup(lookup, DEFAULT_PORT)?,
            database: DatabaseConfig::from_lookup(lookup, "sqlite://users.db")?,
            jwt_private_key: pem(lookup, "JWT_PRIVATE_KEY")?,
        })
    }
}
