//! Configuration loading from muster.toml.

use std::path::{Path, PathBuf};

use policy::{Capability, Principal};
use serde::Deserialize;
use server::TokenAuthenticator;

/// Top-level configuration.
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Address the server binds to.
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Path of the SQLite database.
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Principals allowed to call the service, each with a bearer token
    /// and an explicit capability list.
    #[serde(default, rename = "principal")]
    pub principals: Vec<PrincipalConfig>,
}

/// One `[[principal]]` table.
#[derive(Debug, Deserialize)]
pub struct PrincipalConfig {
    pub name: String,
    pub token: String,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
}

fn default_bind() -> String {
    "127.0.0.1:8087".to_string()
}

fn default_database() -> PathBuf {
    PathBuf::from("muster.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            database: default_database(),
            principals: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Build the token authenticator from the configured principals.
    pub fn authenticator(&self) -> TokenAuthenticator {
        self.principals.iter().fold(
            TokenAuthenticator::new(),
            |auth, entry| {
                let principal = entry
                    .capabilities
                    .iter()
                    .fold(Principal::new(&entry.name), |p, cap| p.grant(*cap));
                auth.register(&entry.token, principal)
            },
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
