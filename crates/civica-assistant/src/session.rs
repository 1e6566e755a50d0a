//! Conversation session and its turn state machine.
//!
//! Turn lifecycle:
//! Idle -> Thinking -> Responding -> Idle
//! Thinking -> Error -> Idle
//!
//! One turn may be in flight per session. A submission while a turn is
//! running, or with blank text, is ignored. Once a turn is accepted it runs
//! on its own task and always reaches `Idle`, even if the submitter stops
//! waiting.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Local, TimeZone};
use civica_core::config::AssistantConfig;
use tokio::sync::{broadcast, watch};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::AssistantError;
use crate::pipeline::ReplyPipeline;
use crate::types::{
    ConversationMessage, RejectReason, Sender, SessionSummary, Submission, TurnState,
};

// =============================================================================
// Settings
// =============================================================================

/// Timing and canned texts for a session.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Simulated processing time before the pipeline runs.
    pub thinking_delay: Duration,
    /// How long `last_error` stays set after a failed turn.
    pub error_grace: Duration,
    pub welcome_message: String,
    pub apology_message: String,
    pub error_banner: String,
}

impl From<&AssistantConfig> for SessionSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            thinking_delay: config.thinking_delay(),
            error_grace: config.error_grace(),
            welcome_message: config.welcome_message.clone(),
            apology_message: config.apology_message.clone(),
            error_banner: config.error_banner.clone(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

// =============================================================================
// State machine
// =============================================================================

/// Capacity of the per-session transition channel.
const TRANSITION_CHANNEL_CAPACITY: usize = 64;

/// Validate that a turn state transition is allowed.
///
/// Valid transitions:
/// - Idle -> Thinking
/// - Thinking -> Responding
/// - Thinking -> Error
/// - Responding -> Idle
/// - Error -> Idle
pub fn validate_transition(from: TurnState, to: TurnState) -> Result<(), AssistantError> {
    let valid = matches!(
        (from, to),
        (TurnState::Idle, TurnState::Thinking)
            | (TurnState::Thinking, TurnState::Responding)
            | (TurnState::Thinking, TurnState::Error)
            | (TurnState::Responding, TurnState::Idle)
            | (TurnState::Error, TurnState::Idle)
    );

    if valid {
        Ok(())
    } else {
        Err(AssistantError::InvalidTransition(from, to))
    }
}

struct SessionState {
    messages: Vec<ConversationMessage>,
    turn_state: TurnState,
    last_error: Option<String>,
    /// Bumped on every failure so a stale clear does not wipe a newer banner.
    error_generation: u64,
    last_message_id: i64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            turn_state: TurnState::Idle,
            last_error: None,
            error_generation: 0,
            last_message_id: 0,
        }
    }

    fn append(&mut self, sender: Sender, text: String, is_error: bool) -> ConversationMessage {
        let id = Local::now()
            .timestamp_millis()
            .max(self.last_message_id + 1);
        self.last_message_id = id;

        let message = ConversationMessage {
            id,
            text,
            sender,
            is_error,
        };
        self.messages.push(message.clone());
        message
    }
}

// =============================================================================
// ConversationSession
// =============================================================================

/// Handle to one chat widget's conversation.
///
/// Clones share the same history and state. The history lives only as long
/// as the session; nothing is persisted.
#[derive(Clone)]
pub struct ConversationSession {
    id: Uuid,
    started_at: i64,
    domain_context: Arc<str>,
    settings: Arc<SessionSettings>,
    pipeline: Arc<dyn ReplyPipeline>,
    state: Arc<Mutex<SessionState>>,
    state_tx: Arc<watch::Sender<TurnState>>,
    transition_tx: broadcast::Sender<TurnState>,
}

impl ConversationSession {
    /// Open a session and greet the user with the welcome message.
    pub fn open(
        pipeline: Arc<dyn ReplyPipeline>,
        settings: SessionSettings,
        domain_context: impl Into<Arc<str>>,
    ) -> Self {
        let (state_tx, _) = watch::channel(TurnState::Idle);
        let (transition_tx, _) = broadcast::channel(TRANSITION_CHANNEL_CAPACITY);
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Local::now().timestamp(),
            domain_context: domain_context.into(),
            settings: Arc::new(settings),
            pipeline,
            state: Arc::new(Mutex::new(SessionState::new())),
            state_tx: Arc::new(state_tx),
            transition_tx,
        };

        {
            let mut state = session.lock();
            if state.messages.is_empty() {
                let welcome = session.settings.welcome_message.clone();
                state.append(Sender::Assistant, welcome, false);
            }
        }

        info!(session_id = %session.id, "Conversation session opened");
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Opaque descriptive text supplied when the session was opened.
    pub fn domain_context(&self) -> &str {
        &self.domain_context
    }

    /// Snapshot of the history, oldest first.
    pub fn messages(&self) -> Vec<ConversationMessage> {
        self.lock().messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn turn_state(&self) -> TurnState {
        self.lock().turn_state
    }

    /// Transient banner text, set after a failed turn until the grace
    /// window elapses.
    pub fn last_error(&self) -> Option<String> {
        self.lock().last_error.clone()
    }

    /// Receiver holding the latest turn state.
    ///
    /// Only the most recent value is kept; use
    /// [`subscribe_transitions`](Self::subscribe_transitions) to see every
    /// state a turn passes through.
    pub fn subscribe(&self) -> watch::Receiver<TurnState> {
        self.state_tx.subscribe()
    }

    /// Receiver of every state entered after this call, in order.
    pub fn subscribe_transitions(&self) -> broadcast::Receiver<TurnState> {
        self.transition_tx.subscribe()
    }

    pub fn summary(&self) -> SessionSummary {
        let state = self.lock();
        SessionSummary {
            id: self.id,
            started_at: format_epoch(self.started_at),
            message_count: state.messages.len(),
            turn_state: state.turn_state,
        }
    }

    /// History serialized as a JSON array for a web front end.
    pub fn messages_json(&self) -> Result<String, AssistantError> {
        Ok(serde_json::to_string(&self.messages())?)
    }

    /// Submit one user query and wait for the turn to finish.
    ///
    /// The user message is appended, verbatim, before the thinking delay
    /// starts. Blank text, or a call while another turn is in flight, is
    /// rejected without touching the history or the turn state. Dropping the
    /// returned future does not cancel an accepted turn.
    pub async fn submit_query(&self, text: &str) -> Submission {
        if text.trim().is_empty() {
            debug!(session_id = %self.id, "Ignoring blank query");
            return Submission::Rejected(RejectReason::Blank);
        }

        {
            let mut state = self.lock();
            if state.turn_state != TurnState::Idle {
                debug!(session_id = %self.id, state = %state.turn_state, "Turn already in flight");
                return Submission::Rejected(RejectReason::TurnInFlight);
            }
            state.append(Sender::User, text.to_string(), false);
            self.advance(&mut state, TurnState::Thinking);
        }

        let session = self.clone();
        let query = text.to_string();
        let turn = tokio::spawn(async move { session.run_turn(query).await });

        match turn.await {
            Ok(submission) => submission,
            Err(e) => {
                error!(session_id = %self.id, error = %e, "Turn task aborted");
                self.recover_aborted_turn(e.to_string())
            }
        }
    }

    // -- Private helpers --

    async fn run_turn(&self, query: String) -> Submission {
        tokio::time::sleep(self.settings.thinking_delay).await;

        let pipeline = Arc::clone(&self.pipeline);
        let outcome = match tokio::task::spawn_blocking(move || pipeline.reply(&query)).await {
            Ok(result) => result,
            Err(e) => Err(AssistantError::ResponseGeneration(format!(
                "pipeline task failed: {}",
                e
            ))),
        };

        match outcome {
            Ok(reply) => self.finish_reply(reply),
            Err(e) => self.finish_error(e),
        }
    }

    /// Bring a session whose turn task died back to `Idle`.
    fn recover_aborted_turn(&self, reason: String) -> Submission {
        if self.turn_state() == TurnState::Thinking {
            return self.finish_error(AssistantError::ResponseGeneration(reason));
        }

        let mut state = self.lock();
        if matches!(state.turn_state, TurnState::Responding | TurnState::Error) {
            self.advance(&mut state, TurnState::Idle);
        }
        match state.messages.last().cloned() {
            Some(msg) if msg.sender == Sender::Assistant && !msg.is_error => {
                Submission::Replied(msg)
            }
            Some(msg) => Submission::Failed(msg),
            None => Submission::Rejected(RejectReason::TurnInFlight),
        }
    }

    fn finish_reply(&self, reply: String) -> Submission {
        let mut state = self.lock();
        self.advance(&mut state, TurnState::Responding);
        let message = state.append(Sender::Assistant, reply, false);
        self.advance(&mut state, TurnState::Idle);
        debug!(session_id = %self.id, message_id = message.id, "Reply appended");
        Submission::Replied(message)
    }

    fn finish_error(&self, err: AssistantError) -> Submission {
        warn!(session_id = %self.id, error = %err, "Turn failed");

        let (message, generation) = {
            let mut state = self.lock();
            self.advance(&mut state, TurnState::Error);
            let apology = self.settings.apology_message.clone();
            let message = state.append(Sender::Assistant, apology, true);
            state.last_error = Some(self.settings.error_banner.clone());
            state.error_generation += 1;
            let generation = state.error_generation;
            self.advance(&mut state, TurnState::Idle);
            (message, generation)
        };

        let shared = Arc::clone(&self.state);
        let grace = self.settings.error_grace;
        tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let mut state = shared.lock().unwrap_or_else(|e| e.into_inner());
            if state.error_generation == generation {
                state.last_error = None;
            }
        });

        Submission::Failed(message)
    }

    fn advance(&self, state: &mut SessionState, to: TurnState) {
        match validate_transition(state.turn_state, to) {
            Ok(()) => {
                state.turn_state = to;
                self.state_tx.send_replace(to);
                // No subscribers is fine.
                let _ = self.transition_tx.send(to);
            }
            Err(e) => error!(session_id = %self.id, error = %e, "Rejected turn transition"),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Format epoch seconds as an RFC 3339 string.
fn format_epoch(epoch: i64) -> String {
    Local
        .timestamp_opt(epoch, 0)
        .single()
        .map(|dt: DateTime<Local>| dt.to_rfc3339())
        .unwrap_or_else(|| epoch.to_string())
}

// =============================================================================
// Tests
// =============================================================================
