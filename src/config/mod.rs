mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable overriding `library.root_dir`.
pub const ENV_MOVIES_DIR: &str = "MOVIES_DIR";
/// Environment variable overriding `metadata.api_key`.
pub const ENV_TMDB_API_KEY: &str = "TMDB_API_KEY";
/// Environment variable overriding `database.path`.
pub const ENV_DATABASE: &str = "CINEVAULT_DB";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./cinevault.toml",
        "./config.toml",
        "~/.config/cinevault/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(Config::default())
}

impl Config {
    /// Apply environment overrides from the process environment.
    ///
    /// Called once at startup; components never read the environment
    /// themselves.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` as the environment.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_MOVIES_DIR) {
            self.library.root_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = get(ENV_TMDB_API_KEY) {
            self.metadata.api_key = Some(key);
        }
        if let Some(path) = get(ENV_DATABASE) {
            self.database.path = PathBuf::from(path);
        }
    }
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.metadata.timeout_secs == 0 {
        anyhow::bail!("metadata.timeout_secs must be at least 1");
    }

    if config.metadata.requests_per_second == 0 {
        anyhow::bail!("metadata.requests_per_second must be at least 1");
    }

    if let Some(ref dir) = config.library.root_dir {
        if !dir.is_dir() {
            tracing::warn!("Library root is not a directory: {:?}", dir);
        }
    }

    Ok(())
}
