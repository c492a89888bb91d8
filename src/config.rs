use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::Path,
};

use chrono::Duration;
use rand::RngCore;
use serde::Deserialize;

use crate::{
    constants::{
        DEFAULT_CONFIG_PATH, DEFAULT_HOST, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT,
        DEFAULT_TOKEN_LIFETIME_HOURS,
    },
    error::ConfigError,
};

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub secret_key: Option<String>,
    pub token_lifetime_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            secret_key: None,
            token_lifetime_hours: DEFAULT_TOKEN_LIFETIME_HOURS,
        }
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

impl Config {
    /// Reads the TOML file at `path` (or `config.toml` when present), then
    /// applies environment overrides. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(value) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_env("DATABASE_MAX_CONNECTIONS", value)?;
        }
        if let Some(secret) = lookup("SECRET_KEY") {
            self.auth.secret_key = Some(secret);
        }
        if let Some(value) = lookup("TOKEN_LIFETIME_HOURS") {
            self.auth.token_lifetime_hours = parse_env("TOKEN_LIFETIME_HOURS", value)?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = parse_env("PORT", value)?;
        }

        Ok(())
    }

    pub fn bind_address(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = parse_env("HOST", self.server.host.to_owned())?;
        Ok(SocketAddr::new(ip, self.server.port))
    }

    pub fn database_url(&self) -> Result<&str, ConfigError> {
        self.database
            .url
            .as_deref()
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))
    }

    pub fn token_lifetime(&self) -> Duration {
        Duration::hours(self.auth.token_lifetime_hours)
    }

    /// Without a configured secret every restart invalidates issued tokens.
    pub fn signing_secret(&self) -> Vec<u8> {
        match self.auth.secret_key.as_deref() {
            Some(secret) if !secret.is_empty() => secret.as_bytes().to_vec(),
            _ => {
                log::warn!("SECRET_KEY is not set; generating a random signing key");
                let mut secret = vec![0u8; 32];
                rand::thread_rng().fill_bytes(&mut secret);
                secret
            }
        }
    }
}
