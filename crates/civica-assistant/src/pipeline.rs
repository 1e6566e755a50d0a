//! Query-to-reply pipeline.
//!
//! [`ReplyPipeline`] is the seam a conversation session calls once per turn.
//! [`AssistantPipeline`] is the rule-based implementation: analyze, rank
//! against the knowledge base, compose.

use std::sync::Arc;

use tracing::debug;

use crate::analyzer::QueryAnalyzer;
use crate::composer::ResponseComposer;
use crate::error::AssistantError;
use crate::knowledge::KnowledgeBase;
use crate::ranker::RelevanceRanker;

/// Produces the reply text for one raw query.
pub trait ReplyPipeline: Send + Sync {
    fn reply(&self, raw_query: &str) -> Result<String, AssistantError>;
}

/// Rule-based classification, retrieval and composition.
pub struct AssistantPipeline {
    analyzer: QueryAnalyzer,
    knowledge: Arc<KnowledgeBase>,
    ranker: RelevanceRanker,
    composer: ResponseComposer,
}

impl AssistantPipeline {
    pub fn new(knowledge: Arc<KnowledgeBase>, max_facts: usize) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(),
            knowledge,
            ranker: RelevanceRanker::new(max_facts),
            composer: ResponseComposer::new(),
        }
    }

    pub fn knowledge(&self) -> &Arc<KnowledgeBase> {
        &self.knowledge
    }
}

impl ReplyPipeline for AssistantPipeline {
    fn reply(&self, raw_query: &str) -> Result<String, AssistantError> {
        let analysis = self.analyzer.analyze(raw_query);
        let ranked = self.ranker.rank(&analysis, &self.knowledge);
        debug!(
            categories = ?analysis.categories,
            keywords = analysis.keywords.len(),
            is_question = analysis.is_question,
            top_score = ranked.first().map(|r| r.score).unwrap_or(0),
            "Query analyzed"
        );

        let reply = self.composer.compose(&analysis, &ranked);
        if reply.trim().is_empty() {
            return Err(AssistantError::ResponseGeneration(
                "composed reply is empty".to_string(),
            ));
        }
        Ok(reply)
    }
}
