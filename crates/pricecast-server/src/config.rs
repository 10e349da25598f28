//! Configuration module for the Pricecast server.
//!
//! Values are layered: built-in defaults, then an optional TOML file
//! (`pricecast.toml`, or the path in `PRICECAST_CONFIG`), then environment
//! variables such as `PRICECAST__SERVER__ADDRESS`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "PRICECAST_CONFIG";

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// The address to bind the HTTP server to.
    #[serde(default = "default_address")]
    pub address: SocketAddr,
    /// Allow cross-origin requests from browser dashboards.
    #[serde(default = "default_true")]
    pub cors: bool,
}

fn default_true() -> bool {
    true
}

fn default_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5001))
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { address: default_address(), cors: true }
    }
}

/// Location of the compiled percentage-change data.
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_compiled_csv")]
    pub compiled_csv: PathBuf,
}

fn default_compiled_csv() -> PathBuf {
    PathBuf::from("data").join("compiled_percentage_changes.csv")
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { compiled_csv: default_compiled_csv() }
    }
}

/// Root configuration for Pricecast.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
}

impl Config {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from the default file locations and the environment.
    pub fn load() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        Self::load_from(explicit.as_deref())
    }

    /// Load configuration from `path` (required when given) and the environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("pricecast").required(false),
        };
        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix("PRICECAST").separator("__").try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}
