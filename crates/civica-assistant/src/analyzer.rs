//! Rule-based query analyzer.
//!
//! Classifies a raw citizen query into intent categories, extracts
//! significant keywords and detects interrogative form.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::{IntentCategory, QueryAnalysis};

// =============================================================================
// Classification table
// =============================================================================

/// Trigger terms for one category. A category matches when any of its terms
/// occurs anywhere in the query, ignoring case.
struct CategoryRule {
    category: IntentCategory,
    terms: &'static [&'static str],
}

static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: IntentCategory::StatusInquiry,
        terms: &["estado", "situación", "avance", "progreso", "solicitud"],
    },
    CategoryRule {
        category: IntentCategory::Documents,
        terms: &[
            "documento",
            "documentación",
            "papel",
            "archivo",
            "adjunto",
            "cédula",
            "comprobante",
        ],
    },
    CategoryRule {
        category: IntentCategory::Process,
        terms: &[
            "proceso",
            "flujo",
            "procedimiento",
            "pasos",
            "cómo funciona",
            "cómo hacer",
        ],
    },
    CategoryRule {
        category: IntentCategory::Timing,
        terms: &["tiempo", "duración", "cuánto tarda", "plazo", "cuándo"],
    },
    CategoryRule {
        category: IntentCategory::Materials,
        terms: &["material", "materiales", "recursos", "insumos", "kit"],
    },
    CategoryRule {
        category: IntentCategory::SocialWorkVisit,
        terms: &[
            "trabajo social",
            "asistente social",
            "visita",
            "trabajador social",
        ],
    },
];

/// Interrogative markers: a question mark or a Spanish question word.
static QUESTION_MARKERS: &[&str] = &[
    "?", "cómo", "qué", "cuál", "cuándo", "dónde", "por qué", "quién",
];

/// Tokens must be longer than this many characters to count as keywords.
pub const KEYWORD_LENGTH_THRESHOLD: usize = 3;

// =============================================================================
// Compiled matchers (compiled once, reused across calls)
// =============================================================================

struct CompiledRule {
    category: IntentCategory,
    matcher: Regex,
}

static COMPILED_RULES: LazyLock<Vec<CompiledRule>> = LazyLock::new(|| {
    CATEGORY_RULES
        .iter()
        .map(|rule| CompiledRule {
            category: rule.category,
            matcher: term_matcher(rule.terms),
        })
        .collect()
});

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| term_matcher(QUESTION_MARKERS));

/// Build a case-insensitive matcher for any of the literal `terms`.
fn term_matcher(terms: &[&str]) -> Regex {
    let alts: Vec<String> = terms.iter().map(|t| regex::escape(t)).collect();
    Regex::new(&format!(r"(?i)(?:{})", alts.join("|"))).expect("Invalid term matcher")
}

// =============================================================================
// QueryAnalyzer
// =============================================================================

/// Stateless, deterministic query analyzer.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryAnalyzer;

impl QueryAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Classify a query into every category whose detector matches.
    ///
    /// Detectors are independent, so several categories can match at once.
    /// Falls back to `[General]` when none do.
    pub fn classify(&self, raw_query: &str) -> Vec<IntentCategory> {
        let categories: Vec<IntentCategory> = COMPILED_RULES
            .iter()
            .filter(|rule| rule.matcher.is_match(raw_query))
            .map(|rule| rule.category)
            .collect();

        if categories.is_empty() {
            tracing::debug!("No category matched, falling back to general");
            vec![IntentCategory::General]
        } else {
            categories
        }
    }

    /// Lower-cased whitespace tokens longer than the keyword threshold,
    /// deduplicated in order of first appearance.
    pub fn extract_keywords(&self, raw_query: &str) -> Vec<String> {
        let mut keywords: Vec<String> = Vec::new();
        for token in raw_query.to_lowercase().split_whitespace() {
            if token.chars().count() > KEYWORD_LENGTH_THRESHOLD
                && !keywords.iter().any(|k| k == token)
            {
                keywords.push(token.to_string());
            }
        }
        keywords
    }

    /// Whether the query contains a question mark or a question word.
    pub fn is_question(&self, raw_query: &str) -> bool {
        QUESTION_RE.is_match(raw_query)
    }

    /// Run classification, keyword extraction and question detection.
    pub fn analyze(&self, raw_query: &str) -> QueryAnalysis {
        QueryAnalysis {
            categories: self.classify(raw_query),
            keywords: self.extract_keywords(raw_query),
            is_question: self.is_question(raw_query),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> QueryAnalyzer {
        QueryAnalyzer::new()
    }

    // ---- Classification ----

    #[test]
    fn test_classify_status_inquiry() {
        assert_eq!(
            analyzer().classify("¿Cuál es el estado de mi solicitud?"),
            vec![IntentCategory::StatusInquiry]
        );
    }

    #[test]
    fn test_classify_materials() {
        assert_eq!(
            analyzer().classify("materiales para reparar el techo"),
            vec![IntentCategory::Materials]
        );
    }

    #[test]
    fn test_classify_documents() {
        assert_eq!(
            analyzer().classify("necesito una copia de la cédula"),
            vec![IntentCategory::Documents]
        );
    }

    #[test]
    fn test_classify_process_phrase() {
        assert_eq!(
            analyzer().classify("explícame cómo funciona todo"),
            vec![IntentCategory::Process]
        );
    }

    #[test]
    fn test_classify_social_work_visit() {
        assert_eq!(
            analyzer().classify("vendrá el trabajador social"),
            vec![IntentCategory::SocialWorkVisit]
        );
    }

    #[test]
    fn test_classify_is_non_exclusive() {
        let categories = analyzer().classify("¿Cuánto tarda la visita de trabajo social?");
        assert_eq!(
            categories,
            vec![IntentCategory::Timing, IntentCategory::SocialWorkVisit]
        );
    }

    #[test]
    fn test_classify_preserves_table_order() {
        let categories =
            analyzer().classify("el proceso de mi solicitud necesita otro documento");
        assert_eq!(
            categories,
            vec![
                IntentCategory::StatusInquiry,
                IntentCategory::Documents,
                IntentCategory::Process,
            ]
        );
    }

    #[test]
    fn test_classify_case_insensitive() {
        assert_eq!(
            analyzer().classify("ESTADO DEL KIT"),
            vec![IntentCategory::StatusInquiry, IntentCategory::Materials]
        );
        assert_eq!(
            analyzer().classify("CÓMO FUNCIONA"),
            vec![IntentCategory::Process]
        );
    }

    #[test]
    fn test_classify_matches_inside_words() {
        // "kit" is a substring trigger, not a whole-word one
        assert_eq!(
            analyzer().classify("kits escolares"),
            vec![IntentCategory::Materials]
        );
    }

    #[test]
    fn test_classify_fallback_general() {
        assert_eq!(analyzer().classify("asdf qwer"), vec![IntentCategory::General]);
    }

    #[test]
    fn test_classify_empty_string() {
        assert_eq!(analyzer().classify(""), vec![IntentCategory::General]);
    }

    #[test]
    fn test_classify_never_empty() {
        let inputs = [
            "",
            "   ",
            "?",
            "🚀🚀",
            "hola",
            "estado",
            "material documento proceso plazo visita solicitud",
        ];
        for input in inputs {
            assert!(!analyzer().classify(input).is_empty(), "empty for {:?}", input);
        }
    }

    #[test]
    fn test_every_rule_category_is_reachable() {
        for rule in CATEGORY_RULES {
            for term in rule.terms {
                assert!(
                    analyzer().classify(term).contains(&rule.category),
                    "term {:?} should select {:?}",
                    term,
                    rule.category
                );
            }
        }
    }

    #[test]
    fn test_general_has_no_rule() {
        assert!(CATEGORY_RULES
            .iter()
            .all(|r| r.category != IntentCategory::General));
    }

    // ---- Keywords ----

    #[test]
    fn test_keywords_length_threshold() {
        let keywords = analyzer().extract_keywords("el de la mi casa techo");
        assert_eq!(keywords, vec!["casa".to_string(), "techo".to_string()]);
    }

    #[test]
    fn test_keywords_lowercased() {
        let keywords = analyzer().extract_keywords("Estado SOLICITUD");
        assert_eq!(keywords, vec!["estado".to_string(), "solicitud".to_string()]);
    }

    #[test]
    fn test_keywords_deduplicated_in_first_order() {
        let keywords = analyzer().extract_keywords("techo estado TECHO estado");
        assert_eq!(keywords, vec!["techo".to_string(), "estado".to_string()]);
    }

    #[test]
    fn test_keywords_keep_punctuation() {
        let keywords = analyzer().extract_keywords("¿Cuál es el estado de mi solicitud?");
        assert_eq!(
            keywords,
            vec![
                "¿cuál".to_string(),
                "estado".to_string(),
                "solicitud?".to_string()
            ]
        );
    }

    #[test]
    fn test_keywords_count_characters_not_bytes() {
        // "más" is 3 characters but 4 bytes
        let keywords = analyzer().extract_keywords("más cédula");
        assert_eq!(keywords, vec!["cédula".to_string()]);
    }

    #[test]
    fn test_keywords_all_short_tokens() {
        assert!(analyzer().extract_keywords("yo no sé qué es").is_empty());
    }

    #[test]
    fn test_keywords_extra_whitespace() {
        let keywords = analyzer().extract_keywords("  techo\t\tcasa \n ");
        assert_eq!(keywords, vec!["techo".to_string(), "casa".to_string()]);
    }

    // ---- Question detection ----

    #[test]
    fn test_question_mark() {
        assert!(analyzer().is_question("estado?"));
    }

    #[test]
    fn test_question_words() {
        for q in [
            "cómo entrego los papeles",
            "qué necesito",
            "cuál es mi turno",
            "cuándo llega",
            "dónde queda la oficina",
            "por qué me rechazaron",
            "quién aprueba",
        ] {
            assert!(analyzer().is_question(q), "{:?} should be a question", q);
        }
    }

    #[test]
    fn test_question_word_case_insensitive() {
        assert!(analyzer().is_question("QUÉ PASÓ CON MI SOLICITUD"));
    }

    #[test]
    fn test_statement_is_not_question() {
        assert!(!analyzer().is_question("materiales para reparar el techo"));
        assert!(!analyzer().is_question("porque lo necesito"));
    }

    // ---- Full analysis ----

    #[test]
    fn test_analyze_status_question() {
        let analysis = analyzer().analyze("¿Cuál es el estado de mi solicitud?");
        assert!(analysis.categories.contains(&IntentCategory::StatusInquiry));
        assert!(analysis.is_question);
        assert!(analysis.keywords.contains(&"estado".to_string()));
    }

    #[test]
    fn test_analyze_statement() {
        let analysis = analyzer().analyze("materiales para reparar el techo");
        assert_eq!(analysis.categories, vec![IntentCategory::Materials]);
        assert!(!analysis.is_question);
        assert_eq!(
            analysis.keywords,
            vec![
                "materiales".to_string(),
                "para".to_string(),
                "reparar".to_string(),
                "techo".to_string()
            ]
        );
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let input = "¿Cuánto tarda el kit de materiales y la visita?";
        assert_eq!(analyzer().analyze(input), analyzer().analyze(input));
    }

    #[test]
    fn test_analyze_very_long_input() {
        let long_input = format!("{} plazo", "palabra ".repeat(1000));
        let analysis = analyzer().analyze(&long_input);
        assert_eq!(analysis.categories, vec![IntentCategory::Timing]);
        assert_eq!(analysis.keywords, vec!["palabra".to_string(), "plazo".to_string()]);
    }
}
