//! Configuration types for Avinci.
//!
//! `AvinciConfig` represents the top-level `config.toml` that controls the
//! HTTP bind address, model backend selection, upstream timeouts, and session
//! storage. Every field has a default so an empty file is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Avinci service.
///
/// Loaded from `~/.avinci/config.toml`. All fields have sensible defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AvinciConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the HTTP API listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:4000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Model backend settings shared by generation and image captioning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name (e.g. "openai", "gemini", "mistral").
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
    /// Override for the provider's API base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model used for persona response generation.
    #[serde(default = "default_model")]
    pub model: String,
    /// Multimodal model used for image grounding.
    #[serde(default = "default_model")]
    pub vision_model: String,
    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Upper bound on each external call, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_provider_name() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_name: default_provider_name(),
            base_url: None,
            model: default_model(),
            vision_model: default_model(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Where conversation sessions are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// Process-local map; sessions vanish on restart.
    #[default]
    Memory,
    /// SQLite file in the data directory.
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: SessionBackend,
    /// Session lifetime in seconds, refreshed on every append.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_ttl_secs() -> u64 {
    3600
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            ttl_secs: default_ttl_secs(),
        }
    }
}
