use crate::errors::{Error, Result};
use sqlx::postgres::PgConnectOptions;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_addr: String,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Full connection URL; takes precedence over the individual parts.
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub max_connections: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Self {
            http_addr: var("HTTP_ADDR", "0.0.0.0:8080"),
            database: DatabaseConfig {
                url: lookup("DATABASE_URL").filter(|url| !url.is_empty()),
                host: var("DB_HOST", "localhost"),
                port: var("DB_PORT", "5432").parse().unwrap_or(5432),
                name: var("DB_NAME", "readings"),
                user: var("DB_USER", "iot"),
                password: var("DB_PASSWORD", ""),
                max_connections: var("DB_MAX_CONNECTIONS", "20").parse().unwrap_or(20),
            },
        }
    }
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> Result<PgConnectOptions> {
        match &self.url {
            Some(url) => url.parse().map_err(Error::Connection),
            None => Ok(PgConnectOptions::new()
                .host(&self.host)
                .port(self.port)
                .database(&self.name)
                .username(&self.user)
                .password(&self.password)),
        }
    }

    /// Connection target without credentials, for logs.
    pub fn describe(&self) -> String {
        match &self.url {
            Some(url) => url.split('@').last().unwrap_or("***").to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.name),
        }
    }
}
