//! Shared types for the assistant: intent categories, analysis results,
//! conversation messages and turn states.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssistantError;

// =============================================================================
// IntentCategory
// =============================================================================

/// Topical class of a citizen query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    StatusInquiry,
    Documents,
    Process,
    Timing,
    Materials,
    SocialWorkVisit,
    /// Fallback for queries no detector recognises.
    General,
}

impl IntentCategory {
    /// Every category, in classification-table order with `General` last.
    pub const ALL: [IntentCategory; 7] = [
        IntentCategory::StatusInquiry,
        IntentCategory::Documents,
        IntentCategory::Process,
        IntentCategory::Timing,
        IntentCategory::Materials,
        IntentCategory::SocialWorkVisit,
        IntentCategory::General,
    ];

    /// Stable snake_case identifier, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::StatusInquiry => "status_inquiry",
            IntentCategory::Documents => "documents",
            IntentCategory::Process => "process",
            IntentCategory::Timing => "timing",
            IntentCategory::Materials => "materials",
            IntentCategory::SocialWorkVisit => "social_work_visit",
            IntentCategory::General => "general",
        }
    }

    /// Human-readable label used in reply lead-ins.
    pub fn label(&self) -> &'static str {
        match self {
            IntentCategory::StatusInquiry => "consulta de estado",
            IntentCategory::Documents => "documentos",
            IntentCategory::Process => "proceso",
            IntentCategory::Timing => "tiempos",
            IntentCategory::Materials => "materiales",
            IntentCategory::SocialWorkVisit => "trabajo social",
            IntentCategory::General => "general",
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntentCategory {
    type Err = AssistantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IntentCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AssistantError::UnknownCategory(s.to_string()))
    }
}

// =============================================================================
// Analysis and ranking
// =============================================================================

/// Result of analysing one raw query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryAnalysis {
    /// Matched categories in table order. Never empty.
    pub categories: Vec<IntentCategory>,
    /// Distinct lower-cased tokens longer than three characters.
    pub keywords: Vec<String>,
    /// Whether the query reads as a question.
    pub is_question: bool,
}

/// A knowledge fact with its keyword relevance score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedFact {
    pub fact: String,
    /// Category whose fact list supplied this candidate.
    pub category: IntentCategory,
    /// Number of query keywords found in the fact.
    pub score: usize,
}

// =============================================================================
// Conversation
// =============================================================================

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// One entry of a session's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Epoch milliseconds, strictly increasing within a session.
    pub id: i64,
    pub text: String,
    pub sender: Sender,
    #[serde(default)]
    pub is_error: bool,
}

/// Turn state of a conversation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnState {
    Idle,
    Thinking,
    Responding,
    Error,
}

impl fmt::Display for TurnState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnState::Idle => "idle",
            TurnState::Thinking => "thinking",
            TurnState::Responding => "responding",
            TurnState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Why a submitted query was ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// The text was empty or whitespace only.
    Blank,
    /// Another turn is still in flight.
    TurnInFlight,
}

/// Outcome of `ConversationSession::submit_query`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// The turn completed and this assistant reply was appended.
    Replied(ConversationMessage),
    /// The turn failed and this apology was appended.
    Failed(ConversationMessage),
    /// Nothing was appended and the turn state is unchanged.
    Rejected(RejectReason),
}

/// Lightweight view of an open session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub started_at: String,
    pub message_count: usize,
    pub turn_state: TurnState,
}
