//! Configuration loading from `~/.murmur/config.toml` with defaults.

use murmur_types::config::BotConfig;
use std::path::{Path, PathBuf};
use tracing::info;

/// Load bot configuration from a TOML file, with defaults.
///
/// A missing file is normal (first run); a file that fails to read or parse
/// is logged and replaced by defaults rather than aborting startup.
pub fn load_config(path: Option<&Path>) -> BotConfig {
    let config_path = path
        .map(|p| p.to_path_buf())
        .unwrap_or_else(default_config_path);

    if config_path.exists() {
        match std::fs::read_to_string(&config_path) {
            Ok(contents) => match toml::from_str::<BotConfig>(&contents) {
                Ok(config) => {
                    info!(path = %config_path.display(), "Loaded configuration");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %config_path.display(),
                        "Failed to parse config, using defaults"
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %config_path.display(),
                    "Failed to read config file, using defaults"
                );
            }
        }
    } else {
        info!(
            path = %config_path.display(),
            "Config file not found, using defaults"
        );
    }

    BotConfig::default()
}

/// Get the default config file path (`~/.murmur/config.toml`).
pub fn default_config_path() -> PathBuf {
    murmur_types::config::default_data_dir().join("config.toml")
}
