//! Keyword relevance ranking of candidate facts.

use crate::knowledge::KnowledgeBase;
use crate::types::{QueryAnalysis, RankedFact};

/// Default number of facts a reply draws from.
pub const DEFAULT_MAX_FACTS: usize = 3;

/// Scores the facts of every matched category against the query keywords.
#[derive(Debug, Clone)]
pub struct RelevanceRanker {
    /// Maximum number of facts returned by [`rank`](Self::rank).
    pub max_facts: usize,
}

impl Default for RelevanceRanker {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FACTS)
    }
}

impl RelevanceRanker {
    pub fn new(max_facts: usize) -> Self {
        Self { max_facts }
    }

    /// Number of `keywords` occurring in `fact`, ignoring case.
    ///
    /// Keywords are expected lower-cased and distinct, as produced by the
    /// analyzer.
    pub fn score(fact: &str, keywords: &[String]) -> usize {
        let lower = fact.to_lowercase();
        keywords
            .iter()
            .filter(|kw| lower.contains(kw.as_str()))
            .count()
    }

    /// Rank the candidates of every matched category.
    ///
    /// Candidates are the category fact lists concatenated in category order,
    /// duplicates included. The sort is stable, so equal scores keep their
    /// knowledge-base order. At most `max_facts` are returned.
    pub fn rank(&self, analysis: &QueryAnalysis, knowledge: &KnowledgeBase) -> Vec<RankedFact> {
        let mut ranked: Vec<RankedFact> = analysis
            .categories
            .iter()
            .flat_map(|&category| {
                knowledge
                    .facts_for(category)
                    .iter()
                    .map(move |fact| (category, fact))
            })
            .map(|(category, fact)| RankedFact {
                score: Self::score(fact, &analysis.keywords),
                fact: fact.clone(),
                category,
            })
            .collect();

        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.truncate(self.max_facts);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IntentCategory;

    fn analysis(categories: Vec<IntentCategory>, keywords: &[&str]) -> QueryAnalysis {
        QueryAnalysis {
            categories,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            is_question: false,
        }
    }

    fn facts(list: &[&str]) -> Vec<String> {
        list.iter().map(|f| f.to_string()).collect()
    }

    fn small_kb() -> KnowledgeBase {
        KnowledgeBase::from_entries([
            (
                IntentCategory::Materials,
                facts(&["uno cemento", "dos bloques", "tres cemento bloques", "cuatro"]),
            ),
            (IntentCategory::Timing, facts(&["cinco días", "seis cemento"])),
            (IntentCategory::General, facts(&["general"])),
        ])
    }

    #[test]
    fn test_score_counts_distinct_keywords() {
        let keywords = vec!["cemento".to_string(), "bloques".to_string()];
        assert_eq!(RelevanceRanker::score("tres cemento bloques", &keywords), 2);
        assert_eq!(RelevanceRanker::score("nada", &keywords), 0);
    }

    #[test]
    fn test_score_case_insensitive() {
        let keywords = vec!["cemento".to_string()];
        assert_eq!(RelevanceRanker::score("CEMENTO gris", &keywords), 1);
    }

    #[test]
    fn test_score_substring_match() {
        let keywords = vec!["visita".to_string()];
        assert_eq!(RelevanceRanker::score("Las visitas se programan", &keywords), 1);
    }

    #[test]
    fn test_rank_orders_by_score() {
        let ranked = RelevanceRanker::default().rank(
            &analysis(vec![IntentCategory::Materials], &["cemento", "bloques"]),
            &small_kb(),
        );
        assert_eq!(ranked[0].fact, "tres cemento bloques");
        assert_eq!(ranked[0].score, 2);
        assert_eq!(ranked[1].fact, "uno cemento");
        assert_eq!(ranked[2].fact, "dos bloques");
    }

    #[test]
    fn test_rank_is_stable_without_keywords() {
        let ranked = RelevanceRanker::new(10).rank(
            &analysis(vec![IntentCategory::Materials, IntentCategory::Timing], &[]),
            &small_kb(),
        );
        let order: Vec<&str> = ranked.iter().map(|r| r.fact.as_str()).collect();
        assert_eq!(
            order,
            vec![
                "uno cemento",
                "dos bloques",
                "tres cemento bloques",
                "cuatro",
                "cinco días",
                "seis cemento"
            ]
        );
        assert!(ranked.iter().all(|r| r.score == 0));
    }

    #[test]
    fn test_rank_ties_keep_concatenation_order() {
        let ranked = RelevanceRanker::new(10).rank(
            &analysis(
                vec![IntentCategory::Materials, IntentCategory::Timing],
                &["cemento"],
            ),
            &small_kb(),
        );
        let top: Vec<&str> = ranked.iter().take(3).map(|r| r.fact.as_str()).collect();
        assert_eq!(top, vec!["uno cemento", "tres cemento bloques", "seis cemento"]);
        assert_eq!(ranked[2].category, IntentCategory::Timing);
    }

    #[test]
    fn test_rank_truncates_to_max() {
        let ranked = RelevanceRanker::default().rank(
            &analysis(vec![IntentCategory::Materials, IntentCategory::Timing], &[]),
            &small_kb(),
        );
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn test_rank_returns_all_when_fewer_than_max() {
        let ranked = RelevanceRanker::default()
            .rank(&analysis(vec![IntentCategory::General], &[]), &small_kb());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].fact, "general");
    }

    #[test]
    fn test_rank_does_not_deduplicate_across_categories() {
        let kb = KnowledgeBase::from_entries([
            (IntentCategory::Process, facts(&["compartido"])),
            (IntentCategory::Timing, facts(&["compartido"])),
            (IntentCategory::General, facts(&["general"])),
        ]);
        let ranked = RelevanceRanker::default().rank(
            &analysis(vec![IntentCategory::Process, IntentCategory::Timing], &[]),
            &kb,
        );
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].fact, ranked[1].fact);
        assert_eq!(ranked[0].category, IntentCategory::Process);
        assert_eq!(ranked[1].category, IntentCategory::Timing);
    }

    #[test]
    fn test_rank_missing_category_uses_general_facts() {
        let ranked = RelevanceRanker::default()
            .rank(&analysis(vec![IntentCategory::Documents], &[]), &small_kb());
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].fact, "general");
        assert_eq!(ranked[0].category, IntentCategory::Documents);
    }

    #[test]
    fn test_rank_never_exceeds_three_on_builtin() {
        let kb = KnowledgeBase::builtin();
        let all: Vec<IntentCategory> = IntentCategory::ALL.to_vec();
        let ranked = RelevanceRanker::default().rank(&analysis(all, &["solicitud"]), &kb);
        assert_eq!(ranked.len(), 3);
        assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_rank_zero_limit() {
        let ranked = RelevanceRanker::new(0)
            .rank(&analysis(vec![IntentCategory::Materials], &[]), &small_kb());
        assert!(ranked.is_empty());
    }
}
