//! Server configuration: defaults, then an optional JSON file, then
//! environment variables.
//!
//! | Source                  | Sets                                   |
//! |-------------------------|----------------------------------------|
//! | `POTSHOT_CONFIG` (path) | any field, JSON, camelCase             |
//! | `PORT`                  | port of the bind address               |
//! | `POTSHOT_BIND`          | the whole bind address                 |
//!
//! Later sources win.

use std::fs;

use potshot_room::GameConfig;
use serde::Deserialize;

/// Address used when nothing else is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Errors raised while loading [`ServerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Everything the `potshot` binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub game: GameConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            game: GameConfig::default(),
        }
    }
}

/// On-disk shape. Every field is optional so a file can override just one.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct FileConfig {
    bind_addr: Option<String>,
    starting_currency: Option<i64>,
    starting_pot: Option<i64>,
    raise_amount: Option<i64>,
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Loads configuration, reading variables through `var`.
    ///
    /// Empty variables are treated as unset.
    pub fn load_with<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| var(key).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let Some(path) = var("POTSHOT_CONFIG") {
            let contents = fs::read_to_string(&path)?;
            cfg.apply_file(&contents)?;
            tracing::debug!(%path, "loaded config file");
        }

        if let Some(port) = var("PORT") {
            let port: u16 = port.parse().map_err(|_| {
                ConfigError::Invalid(format!("PORT must be a port number, got {port:?}"))
            })?;
            cfg.bind_addr = with_port(&cfg.bind_addr, port);
        }
        if let Some(bind) = var("POTSHOT_BIND") {
            cfg.bind_addr = bind;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// Overlays the fields present in a JSON config file.
    pub fn apply_file(&mut self, contents: &str) -> Result<(), ConfigError> {
        let file: FileConfig = serde_json::from_str(contents)?;
        if let Some(v) = file.bind_addr {
            self.bind_addr = v;
        }
        if let Some(v) = file.starting_currency {
            self.game.starting_currency = v;
        }
        if let Some(v) = file.starting_pot {
            self.game.starting_pot = v;
        }
        if let Some(v) = file.raise_amount {
            self.game.raise_amount = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address is empty".into()));
        }
        self.game
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}

/// Replaces the port of `addr`, keeping its host.
fn with_port(addr: &str, port: u16) -> String {
    let host = match addr.rsplit_once(':') {
        Some((host, _)) => host,
        None => addr,
    };
    format!("{host}:{port}")
}
