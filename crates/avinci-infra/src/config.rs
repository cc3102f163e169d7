//! Configuration loader for Avinci.
//!
//! Reads `config.toml` from the data directory (`~/.avinci/` in production)
//! and deserializes it into [`AvinciConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use avinci_types::config::{AvinciConfig, LlmConfig};
use secrecy::SecretString;

/// Resolve the data directory.
///
/// Checks `AVINCI_DATA_DIR` first, then falls back to `~/.avinci`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("AVINCI_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".avinci");
    }

    // Last resort: current directory
    PathBuf::from(".avinci")
}

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AvinciConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> AvinciConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AvinciConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AvinciConfig::default();
        }
    };

    match toml::from_str::<AvinciConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AvinciConfig::default()
        }
    }
}

/// Read the model API key from the environment variable named in the config.
pub fn resolve_api_key(config: &LlmConfig) -> Option<SecretString> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// Like [`resolve_api_key`] with a caller-supplied variable lookup.
///
/// Blank values count as unset.
pub fn resolve_api_key_with(
    config: &LlmConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    lookup(&config.api_key_env)
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}
