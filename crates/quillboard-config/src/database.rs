use std::env;

use crate::env_or;

/// `DATABASE_URL` is required; `DATABASE_MAX_CONNECTIONS` defaults to 10.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            url: env::var("DATABASE_URL")?,
            max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10),
        })
    }
}
