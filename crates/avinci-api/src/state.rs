//! Application state wiring all services together.
//!
//! AppState holds the chat engine used by both CLI and REST API. The engine is
//! generic over its agent lookup and session store; AppState pins it to the
//! concrete infra implementations.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use avinci_core::chat::ChatEngine;
use avinci_core::llm::box_provider::{BoxLlmProvider, BoxVisionProvider};
use avinci_core::llm::synthesizer::ResponseSynthesizer;
use avinci_core::vision::VisionGrounding;
use avinci_infra::config::{load_config, resolve_api_key, resolve_data_dir};
use avinci_infra::llm::{create_providers, offline_providers};
use avinci_infra::session::AnySessionStore;
use avinci_infra::sqlite::agent::SqliteAgentRepository;
use avinci_infra::sqlite::pool::DatabasePool;
use avinci_types::config::{AvinciConfig, LlmConfig};

/// Concrete type alias for the engine generics pinned to infra implementations.
pub type ConcreteChatEngine = ChatEngine<SqliteAgentRepository, AnySessionStore>;

/// Whether a command talks to the model backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelAccess {
    /// Serving and chatting: a missing API key is a startup error.
    Required,
    /// History and clear only touch stored sessions.
    Offline,
}

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_engine: Arc<ConcreteChatEngine>,
    pub config: Arc<AvinciConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Initialize the application state: load config, connect to DB, wire the engine.
    pub async fn init(access: ModelAccess) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let config = load_config(&data_dir).await;

        let db_pool = DatabasePool::open(&data_dir)
            .await
            .context("failed to open the Avinci database")?;

        let (llm, vision) = model_providers(&config.llm, access)?;

        Ok(Self::from_parts(config, data_dir, db_pool, llm, vision))
    }

    /// Wire the engine from already-built collaborators.
    pub fn from_parts(
        config: AvinciConfig,
        data_dir: PathBuf,
        db_pool: DatabasePool,
        llm: BoxLlmProvider,
        vision: BoxVisionProvider,
    ) -> Self {
        let timeout = Duration::from_secs(config.llm.timeout_secs);

        let engine = ChatEngine::new(
            SqliteAgentRepository::new(db_pool.clone()),
            AnySessionStore::from_config(&config.session, &db_pool),
            VisionGrounding::new(vision, timeout),
            ResponseSynthesizer::new(llm, config.llm.model.clone(), timeout),
        );

        tracing::debug!(
            session_backend = engine.sessions().backend_name(),
            model = %config.llm.model,
            "chat engine ready"
        );

        Self {
            chat_engine: Arc::new(engine),
            config: Arc::new(config),
            data_dir,
        }
    }
}

/// Build the model providers, falling back to offline ones when the command
/// allows it and no API key is set.
fn model_providers(
    config: &LlmConfig,
    access: ModelAccess,
) -> anyhow::Result<(BoxLlmProvider, BoxVisionProvider)> {
    let api_key = resolve_api_key(config);
    match (access, create_providers(config, api_key.as_ref())) {
        (_, Ok(providers)) => Ok(providers),
        (ModelAccess::Offline, Err(_)) => Ok(offline_providers(config)),
        (ModelAccess::Required, Err(e)) => Err(e).with_context(|| {
            format!(
                "no model API key found; set ${} or change [llm] api_key_env in config.toml",
                config.api_key_env
            )
        }),
    }
}
