//! Query analysis.
//!
//! Short queries are treated as lookups for a definition or title and get
//! tighter phrase-oriented ranking; longer ones are general searches with
//! looser term matching.

use serde::{Deserialize, Serialize};

/// How a query should be ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// At most three tokens: likely a term or title lookup.
    Definition,
    /// Longer free-text query.
    General,
}

/// Analyzed form of a raw query.
#[derive(Debug, Clone)]
pub struct SearchContext {
    /// Ranking mode.
    pub query_type: QueryType,
    /// Trimmed query as submitted.
    pub original: String,
    /// Uppercase variant, for exact-match case variations.
    pub uppercase: String,
    /// Lowercase variant.
    pub lowercase: String,
}

impl SearchContext {
    /// Returns `true` if there is no query text at all.
    pub fn is_empty(&self) -> bool {
        self.original.is_empty()
    }
}

/// Analyze a raw query into a [`SearchContext`].
///
/// A trimmed query of at most three whitespace-separated tokens is a
/// [`QueryType::Definition`]; everything longer is [`QueryType::General`].
/// An empty query analyzes to an empty `Definition` context, which the
/// engines treat as "no text conditions".
pub fn analyze_query(raw: &str) -> SearchContext {
    let clean = raw.trim();
    let token_count = clean.split_whitespace().count();
    let query_type = if token_count <= 3 {
        QueryType::Definition
    } else {
        QueryType::General
    };
    SearchContext {
        query_type,
        original: clean.to_string(),
        uppercase: clean.to_uppercase(),
        lowercase: clean.to_lowercase(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_query_is_definition() {
        assert_eq!(analyze_query("btree").query_type, QueryType::Definition);
        assert_eq!(analyze_query("b tree index").query_type, QueryType::Definition);
    }

    #[test]
    fn test_four_tokens_is_general() {
        assert_eq!(
            analyze_query("how does a btree work").query_type,
            QueryType::General
        );
    }

    #[test]
    fn test_trims_and_builds_case_variants() {
        let ctx = analyze_query("  Database Systems  ");
        assert_eq!(ctx.original, "Database Systems");
        assert_eq!(ctx.uppercase, "DATABASE SYSTEMS");
        assert_eq!(ctx.lowercase, "database systems");
    }

    #[test]
    fn test_empty_query() {
        let ctx = analyze_query("   ");
        assert!(ctx.is_empty());
        assert_eq!(ctx.query_type, QueryType::Definition);
    }
}
