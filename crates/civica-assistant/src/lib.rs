//! Conversational assistant for the Civica citizen-services front end.
//!
//! Classifies free-text citizen queries into intent categories, retrieves
//! and ranks facts from a static knowledge base, composes a reply, and drives
//! the per-widget conversation turn state machine.

pub mod analyzer;
pub mod composer;
pub mod error;
pub mod knowledge;
pub mod orchestrator;
pub mod pipeline;
pub mod ranker;
pub mod session;
pub mod types;

pub use analyzer::QueryAnalyzer;
pub use composer::ResponseComposer;
pub use error::AssistantError;
pub use knowledge::KnowledgeBase;
pub use orchestrator::AssistantOrchestrator;
pub use pipeline::{AssistantPipeline, ReplyPipeline};
pub use ranker::RelevanceRanker;
pub use session::{ConversationSession, SessionSettings};
pub use types::{
    ConversationMessage, IntentCategory, QueryAnalysis, RankedFact, RejectReason, Sender,
    SessionSummary, Submission, TurnState,
};
