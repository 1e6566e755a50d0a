//! Assistant orchestrator: owns the shared pipeline and the open sessions.
//!
//! One orchestrator per process. Each chat widget opens its own session;
//! sessions share the knowledge base but nothing else.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use civica_core::config::{AssistantConfig, CivicaConfig};
use tracing::info;
use uuid::Uuid;

use crate::error::AssistantError;
use crate::knowledge::KnowledgeBase;
use crate::pipeline::{AssistantPipeline, ReplyPipeline};
use crate::session::{ConversationSession, SessionSettings};
use crate::types::SessionSummary;

/// Central coordinator handing out conversation sessions.
pub struct AssistantOrchestrator {
    config: AssistantConfig,
    pipeline: Arc<dyn ReplyPipeline>,
    sessions: Mutex<HashMap<Uuid, ConversationSession>>,
}

impl AssistantOrchestrator {
    /// Create an orchestrator using the rule-based pipeline over `knowledge`.
    pub fn new(config: AssistantConfig, knowledge: Arc<KnowledgeBase>) -> Self {
        let pipeline = Arc::new(AssistantPipeline::new(knowledge, config.max_facts));
        Self::with_pipeline(config, pipeline)
    }

    /// Build from a full configuration, overlaying its `[knowledge]` table
    /// on the built-in facts.
    pub fn from_config(config: &CivicaConfig) -> Self {
        let knowledge = KnowledgeBase::from_config(&config.knowledge);
        info!(facts = knowledge.len(), "Knowledge base loaded");
        Self::new(config.assistant.clone(), Arc::new(knowledge))
    }

    /// Create an orchestrator around an arbitrary reply pipeline.
    pub fn with_pipeline(config: AssistantConfig, pipeline: Arc<dyn ReplyPipeline>) -> Self {
        Self {
            config,
            pipeline,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AssistantConfig {
        &self.config
    }

    /// Open a new session, greeted with the welcome message.
    pub fn open_session(&self) -> Result<ConversationSession, AssistantError> {
        if !self.config.enabled {
            return Err(AssistantError::Disabled);
        }

        let session = ConversationSession::open(
            Arc::clone(&self.pipeline),
            SessionSettings::from(&self.config),
            self.config.domain_context.as_str(),
        );
        self.lock_sessions().insert(session.id(), session.clone());
        Ok(session)
    }

    pub fn get_session(&self, id: Uuid) -> Result<ConversationSession, AssistantError> {
        self.lock_sessions()
            .get(&id)
            .cloned()
            .ok_or(AssistantError::SessionNotFound(id))
    }

    /// Close a session. Its history is discarded once the last handle drops.
    pub fn close_session(&self, id: Uuid) -> Result<(), AssistantError> {
        let removed = self.lock_sessions().remove(&id);
        match removed {
            Some(session) => {
                info!(session_id = %id, messages = session.message_count(), "Session closed");
                Ok(())
            }
            None => Err(AssistantError::SessionNotFound(id)),
        }
    }

    /// Summaries of every open session, oldest first.
    pub fn list_sessions(&self) -> Vec<SessionSummary> {
        let mut summaries: Vec<SessionSummary> =
            self.lock_sessions().values().map(|s| s.summary()).collect();
        summaries.sort_by(|a, b| a.started_at.cmp(&b.started_at));
        summaries
    }

    fn lock_sessions(&self) -> MutexGuard<'_, HashMap<Uuid, ConversationSession>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }
}
