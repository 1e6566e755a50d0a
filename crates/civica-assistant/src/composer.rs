//! Reply composition from ranked facts.
//!
//! Questions get a direct answer (top fact plus one complementary fact);
//! statements get a lead-in naming the matched categories followed by every
//! selected fact. Thin evidence appends an invitation to narrow the request.

use crate::types::{IntentCategory, QueryAnalysis, RankedFact};

/// Connective placed before the complementary fact of a direct answer.
pub const SECONDARY_CONNECTIVE: &str = "Además, ten en cuenta que: ";

/// Prompt appended when the reply rests on little evidence.
pub const FOLLOW_UP_PROMPT: &str =
    "¿Necesitas más información específica sobre algún aspecto del proceso?";

const PARAGRAPH_BREAK: &str = "\n\n";

/// Pure formatter turning an analysis and its ranked facts into reply text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseComposer;

impl ResponseComposer {
    pub fn new() -> Self {
        Self
    }

    /// Compose the reply text.
    pub fn compose(&self, analysis: &QueryAnalysis, ranked: &[RankedFact]) -> String {
        let mut reply = match ranked {
            [first, rest @ ..] if analysis.is_question => {
                let mut answer = first.fact.clone();
                if let Some(second) = rest.first() {
                    answer.push_str(PARAGRAPH_BREAK);
                    answer.push_str(SECONDARY_CONNECTIVE);
                    answer.push_str(&second.fact);
                }
                answer
            }
            _ => {
                let facts: Vec<&str> = ranked.iter().map(|r| r.fact.as_str()).collect();
                format!("{}{}", lead_in(&analysis.categories), facts.join(PARAGRAPH_BREAK))
            }
        };

        if is_thin_evidence(analysis, ranked) {
            reply.push_str(PARAGRAPH_BREAK);
            reply.push_str(FOLLOW_UP_PROMPT);
        }

        reply
    }
}

/// Opening sentence naming the matched categories.
pub fn lead_in(categories: &[IntentCategory]) -> String {
    let labels: Vec<&str> = categories.iter().map(IntentCategory::label).collect();
    format!(
        "Basado en tu consulta sobre {}, puedo informarte que:{}",
        labels.join(" y "),
        PARAGRAPH_BREAK
    )
}

/// Fewer than two facts, or keywords that matched none of the facts.
fn is_thin_evidence(analysis: &QueryAnalysis, ranked: &[RankedFact]) -> bool {
    ranked.len() < 2 || (!analysis.keywords.is_empty() && ranked.iter().all(|r| r.score == 0))
}
