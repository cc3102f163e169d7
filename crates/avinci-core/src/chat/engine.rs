//! ChatEngine: one persona-conditioned chat turn, end to end.
//!
//! Per turn:
//! 1. validate the request (no lookups or external calls on failure)
//! 2. resolve the agent profile
//! 3. pick the prior history: caller-supplied, else the stored session
//! 4. caption the attached image, if any
//! 5. assemble context, generate, humanize
//! 6. record the user and agent turns together, only after every call succeeded
//!
//! Turns for the same session key are not serialized against each other.

use std::sync::{Mutex, PoisonError};

use avinci_types::chat::{
    ChatTurnRequest, ChatTurnResponse, ConversationTurn, SessionKey, TurnMetadata,
};
use avinci_types::error::ChatError;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use tracing::{debug, info, warn};

use super::context::ContextAssembler;
use super::session_store::SessionStore;
use crate::llm::synthesizer::ResponseSynthesizer;
use crate::persona::Humanizer;
use crate::repository::AgentRepository;
use crate::vision::VisionGrounding;

pub struct ChatEngine<A, S> {
    agents: A,
    sessions: S,
    vision: VisionGrounding,
    synthesizer: ResponseSynthesizer,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl<A: AgentRepository, S: SessionStore> ChatEngine<A, S> {
    pub fn new(
        agents: A,
        sessions: S,
        vision: VisionGrounding,
        synthesizer: ResponseSynthesizer,
    ) -> Self {
        Self {
            agents,
            sessions,
            vision,
            synthesizer,
            rng: Mutex::new(Box::new(StdRng::from_entropy())),
        }
    }

    /// Replace the humanizer's randomness source, e.g. with a seeded RNG.
    pub fn with_rng<R: RngCore + Send + 'static>(mut self, rng: R) -> Self {
        self.rng = Mutex::new(Box::new(rng));
        self
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    /// Run one chat turn for `caller`.
    #[tracing::instrument(
        name = "chat_turn",
        skip(self, request),
        fields(
            agent_id = %request.agent_id,
            caller = %caller,
            has_image = request.image.is_some(),
        )
    )]
    pub async fn chat_turn(
        &self,
        request: ChatTurnRequest,
        caller: &str,
    ) -> Result<ChatTurnResponse, ChatError> {
        validate(&request)?;
        let user_turn = ConversationTurn::user(&request.agent_id, &request.text);

        let profile = self
            .agents
            .get_agent(&request.agent_id)
            .await?
            .ok_or(ChatError::NotFound)?;

        for (dimension, value) in profile.unrecognized_dimensions() {
            warn!(dimension, value, "unrecognized profile value, clause omitted");
        }

        let key = SessionKey::new(&request.agent_id, caller);
        let stored = if request.conversation_history.is_empty() {
            self.sessions.read_all(&key).await?
        } else {
            Vec::new()
        };

        let grounding = match &request.image {
            Some(image) => Some(self.vision.ground(image).await?),
            None => None,
        };

        let messages = if request.conversation_history.is_empty() {
            ContextAssembler::assemble(&profile, &stored, &request.text, grounding.as_deref())
        } else {
            ContextAssembler::assemble(
                &profile,
                &request.conversation_history,
                &request.text,
                grounding.as_deref(),
            )
        };
        debug!(message_count = messages.len(), "context assembled");

        let synthesis = self.synthesizer.synthesize(messages).await?;

        let text = {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            Humanizer::humanize(&synthesis.text, &profile, &mut *rng)
        };

        let tokens = synthesis.usage.output_tokens;
        let processing_time = synthesis.processing_time_ms;
        let agent_turn = ConversationTurn::agent(
            &request.agent_id,
            text,
            TurnMetadata {
                processing_time,
                tokens,
                model: synthesis.model,
            },
        );

        self.sessions
            .append_all(&key, &[user_turn, agent_turn.clone()])
            .await?;

        info!(processing_time_ms = processing_time, tokens, "chat turn complete");

        Ok(ChatTurnResponse {
            message: agent_turn,
            agent_id: request.agent_id,
            processing_time,
            tokens,
        })
    }

    /// The stored conversation for `(agent_id, caller)`, oldest first.
    pub async fn history(
        &self,
        agent_id: &str,
        caller: &str,
    ) -> Result<Vec<ConversationTurn>, ChatError> {
        if agent_id.trim().is_empty() {
            return Err(ChatError::Validation("agentId is required".to_string()));
        }
        let turns = self
            .sessions
            .read_all(&SessionKey::new(agent_id, caller))
            .await?;
        Ok(turns)
    }

    /// Drop the stored conversation for `(agent_id, caller)`. Succeeds when nothing is stored.
    pub async fn clear_history(&self, agent_id: &str, caller: &str) -> Result<(), ChatError> {
        if agent_id.trim().is_empty() {
            return Err(ChatError::Validation("agentId is required".to_string()));
        }
        self.sessions
            .clear(&SessionKey::new(agent_id, caller))
            .await?;
        info!(agent_id, caller, "conversation history cleared");
        Ok(())
    }
}

fn validate(request: &ChatTurnRequest) -> Result<(), ChatError> {
    if request.agent_id.trim().is_empty() {
        return Err(ChatError::Validation("agentId is required".to_string()));
    }
    if request.text.trim().is_empty() {
        return Err(ChatError::Validation("text is required".to_string()));
    }
    if let Some(image) = &request.image {
        VisionGrounding::validate(image)?;
    }
    Ok(())
}
