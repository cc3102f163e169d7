//! SQLite agent profile lookup.
//!
//! Implements `AgentRepository` from `avinci-core` over the `agents` table.
//! Read-only: rows are written by the agent management surface.

use avinci_core::repository::AgentRepository;
use avinci_types::agent::{AgentProfile, EmotionalRange, HesitationLevel};
use avinci_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `AgentRepository`.
pub struct SqliteAgentRepository {
    pool: DatabasePool,
}

impl SqliteAgentRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain AgentProfile.
struct AgentRow {
    id: String,
    name: String,
    persona: String,
    knowledge_level: Option<String>,
    language_style: Option<String>,
    emotional_range: Option<String>,
    hesitation_level: Option<String>,
    traits: String,
    prompt: Option<String>,
}

impl AgentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            persona: row.try_get("persona")?,
            knowledge_level: row.try_get("knowledge_level")?,
            language_style: row.try_get("language_style")?,
            emotional_range: row.try_get("emotional_range")?,
            hesitation_level: row.try_get("hesitation_level")?,
            traits: row.try_get("traits")?,
            prompt: row.try_get("prompt")?,
        })
    }

    fn into_profile(self) -> Result<AgentProfile, RepositoryError> {
        let traits: Vec<String> = serde_json::from_str(&self.traits).map_err(|e| {
            RepositoryError::Serialization(format!("invalid traits for agent {}: {e}", self.id))
        })?;

        Ok(AgentProfile {
            id: self.id,
            name: self.name,
            persona: self.persona,
            knowledge_level: self.knowledge_level.map(Into::into),
            language_style: self.language_style.map(Into::into),
            emotional_range: self
                .emotional_range
                .map(EmotionalRange::from)
                .unwrap_or_default(),
            hesitation_level: self
                .hesitation_level
                .map(HesitationLevel::from)
                .unwrap_or_default(),
            traits,
            prompt: self.prompt,
        })
    }
}

impl AgentRepository for SqliteAgentRepository {
    async fn get_agent(&self, id: &str) -> Result<Option<AgentProfile>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, persona, knowledge_level, language_style, emotional_range,
                    hesitation_level, traits, prompt
             FROM agents WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let agent_row =
                    AgentRow::from_row(&row).map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(agent_row.into_profile()?))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::test_pool;
    use avinci_types::agent::{KnowledgeLevel, LanguageStyle};

    #[tokio::test]
    async fn test_get_agent_maps_all_columns() {
        let (_dir, pool) = test_pool().await;
        sqlx::query(
            "INSERT INTO agents (id, name, persona, knowledge_level, language_style,
                                 emotional_range, hesitation_level, traits, prompt)
             VALUES ('a1', 'Dana', 'senior designer', 'Expert', 'Formal',
                     'Highly Expressive', 'High', '[\"blunt\",\"visual\"]', 'Runs a studio.')",
        )
        .execute(&pool.writer)
        .await
        .unwrap();

        let repo = SqliteAgentRepository::new(pool);
        let agent = repo.get_agent("a1").await.unwrap().unwrap();

        assert_eq!(agent.name, "Dana");
        assert_eq!(agent.persona, "senior designer");
        assert_eq!(agent.knowledge_level, Some(KnowledgeLevel::Expert));
        assert_eq!(agent.language_style, Some(LanguageStyle::Formal));
        assert_eq!(agent.emotional_range, EmotionalRange::HighlyExpressive);
        assert_eq!(agent.hesitation_level, HesitationLevel::High);
        assert_eq!(agent.traits, vec!["blunt", "visual"]);
        assert_eq!(agent.prompt.as_deref(), Some("Runs a studio."));
    }

    #[tokio::test]
    async fn test_missing_dimensions_use_defaults() {
        let (_dir, pool) = test_pool().await;
        sqlx::query("INSERT INTO agents (id, name, persona) VALUES ('a2', 'Sam', 'shopper')")
            .execute(&pool.writer)
            .await
            .unwrap();

        let repo = SqliteAgentRepository::new(pool);
        let agent = repo.get_agent("a2").await.unwrap().unwrap();

        assert_eq!(agent.knowledge_level, None);
        assert_eq!(agent.emotional_range, EmotionalRange::Moderate);
        assert_eq!(agent.hesitation_level, HesitationLevel::Medium);
        assert!(agent.traits.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_dimension_value_kept_verbatim() {
        let (_dir, pool) = test_pool().await;
        sqlx::query(
            "INSERT INTO agents (id, name, persona, knowledge_level) VALUES ('a3', 'Kim', 'nurse', 'Guru')",
        )
        .execute(&pool.writer)
        .await
        .unwrap();

        let repo = SqliteAgentRepository::new(pool);
        let agent = repo.get_agent("a3").await.unwrap().unwrap();
        assert_eq!(
            agent.knowledge_level,
            Some(KnowledgeLevel::Unrecognized("Guru".to_string()))
        );
    }

    #[tokio::test]
    async fn test_absent_agent_is_none() {
        let (_dir, pool) = test_pool().await;
        let repo = SqliteAgentRepository::new(pool);
        assert!(repo.get_agent("nobody").await.unwrap().is_none());
    }
}
