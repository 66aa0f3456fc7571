//! Query tree nodes.
//!
//! Nodes mirror the clause vocabulary of inverted-index engines (boolean,
//! match, phrase, term, prefix, fuzzy, ids, range, more-like-this,
//! function-score) without committing to any engine's wire format. Every
//! scoring clause carries a `boost`; boolean nodes carry
//! `minimum_should_match`.
//!
//! Constructors chain:
//!
//! ```rust
//! use biblio_query::ast::{field, BoolQuery, QueryNode};
//!
//! let query = BoolQuery::new()
//!     .should(QueryNode::match_phrase(field::CONTENT, "relational algebra").slop(1).boost(10.0))
//!     .should(QueryNode::match_(field::CONTENT, "relational algebra").min_should_match_pct(70).boost(4.0))
//!     .minimum_should_match(1)
//!     .into_node();
//! ```

use serde::{Deserialize, Serialize};

/// Index field paths understood by executors.
///
/// Language- and case-variant subfields follow the `base.variant`
/// convention; adapters map them onto engine-specific analyzed fields, and
/// the reference executor resolves the base field and applies the variant's
/// matching rules itself.
pub mod field {
    /// Full extracted text.
    pub const CONTENT: &str = "content";
    /// Korean-analyzed content variant.
    pub const CONTENT_KO: &str = "content.korean";
    /// Vietnamese-analyzed content variant.
    pub const CONTENT_VI: &str = "content.vietnamese";
    /// Keyword (unanalyzed) content variant, for sorting only.
    pub const CONTENT_KEYWORD: &str = "content.keyword";

    /// Analyzed filename.
    pub const FILENAME: &str = "filename";
    /// Korean-analyzed filename variant.
    pub const FILENAME_KO: &str = "filename.korean";
    /// Vietnamese-analyzed filename variant.
    pub const FILENAME_VI: &str = "filename.vietnamese";
    /// Edge-ngram search variant of the filename.
    pub const FILENAME_SEARCH: &str = "filename.search";
    /// Raw (unanalyzed, case-sensitive) filename.
    pub const FILENAME_RAW: &str = "filename.raw";
    /// Lowercased keyword variant, for case-insensitive sorting.
    pub const FILENAME_LOWERCASE: &str = "filename.lowercase";

    /// Majors facet.
    pub const MAJORS: &str = "majors";
    /// Course codes facet.
    pub const COURSE_CODES: &str = "courseCodes";
    /// Course level facet.
    pub const COURSE_LEVEL: &str = "courseLevel";
    /// Categories facet.
    pub const CATEGORIES: &str = "categories";
    /// Tags facet.
    pub const TAGS: &str = "tags";
    /// Extracted-metadata values.
    pub const EXTRACTED_METADATA_VALUE: &str = "extractedMetadata.value";

    /// Document language code.
    pub const LANGUAGE: &str = "language";
    /// Document type.
    pub const DOCUMENT_TYPE: &str = "documentType";
    /// Owner user id.
    pub const USER_ID: &str = "userId";
    /// Sharing type.
    pub const SHARING_TYPE: &str = "sharingType";
    /// Sharing allow-list.
    pub const SHARED_WITH: &str = "sharedWith";
    /// Soft-delete flag.
    pub const DELETED: &str = "deleted";
    /// Moderation state.
    pub const REPORT_STATUS: &str = "reportStatus";
    /// Recommendation counter.
    pub const RECOMMENDATION_COUNT: &str = "recommendationCount";
    /// Favorite counter.
    pub const FAVORITE_COUNT: &str = "favoriteCount";
    /// Document id.
    pub const ID: &str = "_id";
    /// Creation timestamp.
    pub const CREATED_AT: &str = "createdAt";
}

/// A node in the query tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryNode {
    /// Boolean combination of sub-queries.
    Bool(BoolQuery),
    /// Analyzed match against one field.
    Match(MatchQuery),
    /// Phrase match with optional slop.
    MatchPhrase(MatchPhraseQuery),
    /// Cross-field match over weighted fields.
    MultiMatch(MultiMatchQuery),
    /// Exact single-value match.
    Term(TermQuery),
    /// Exact any-of-values match.
    Terms(TermsQuery),
    /// Prefix match on the raw field value.
    Prefix(PrefixQuery),
    /// Fuzzy match with edit-distance tolerance.
    Fuzzy(FuzzyQuery),
    /// Match by document id.
    Ids(IdsQuery),
    /// Numeric greater-than filter.
    RangeGt(RangeGtQuery),
    /// Term-overlap similarity against a reference text.
    MoreLikeThis(MoreLikeThisQuery),
    /// Field-value-factor scoring over a filtered subset.
    FunctionScore(FunctionScoreQuery),
}

impl QueryNode {
    /// Analyzed match clause.
    pub fn match_(field: impl Into<String>, text: impl Into<String>) -> MatchQuery {
        MatchQuery {
            field: field.into(),
            text: text.into(),
            minimum_should_match_pct: None,
            fuzziness_auto: false,
            prefix_length: 0,
            boost: 1.0,
        }
    }

    /// Phrase match clause.
    pub fn match_phrase(field: impl Into<String>, text: impl Into<String>) -> MatchPhraseQuery {
        MatchPhraseQuery {
            field: field.into(),
            text: text.into(),
            slop: 0,
            boost: 1.0,
        }
    }

    /// Exact term clause.
    pub fn term(field: impl Into<String>, value: impl Into<String>) -> TermQuery {
        TermQuery {
            field: field.into(),
            value: value.into(),
            boost: 1.0,
        }
    }

    /// Any-of-terms clause.
    pub fn terms<I, S>(field: impl Into<String>, values: I) -> TermsQuery
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TermsQuery {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
            boost: 1.0,
        }
    }

    /// Prefix clause on the raw field value.
    pub fn prefix(field: impl Into<String>, value: impl Into<String>) -> PrefixQuery {
        PrefixQuery {
            field: field.into(),
            value: value.into(),
            boost: 1.0,
        }
    }

    /// Fuzzy clause with automatic edit distance.
    pub fn fuzzy(field: impl Into<String>, value: impl Into<String>) -> FuzzyQuery {
        FuzzyQuery {
            field: field.into(),
            value: value.into(),
            prefix_length: 0,
            boost: 1.0,
        }
    }

    /// Ids clause.
    pub fn ids<I, S>(values: I) -> IdsQuery
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        IdsQuery {
            values: values.into_iter().map(Into::into).collect(),
            boost: 1.0,
        }
    }

    /// Greater-than clause on a numeric field.
    pub fn range_gt(field: impl Into<String>, value: f64) -> RangeGtQuery {
        RangeGtQuery {
            field: field.into(),
            value,
            boost: 1.0,
        }
    }
}

/// Boolean combination with per-section clause lists.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoolQuery {
    /// All must match; scores contribute.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<QueryNode>,
    /// Optional matches; scores contribute.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<QueryNode>,
    /// All must match; no score contribution.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<QueryNode>,
    /// None may match.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must_not: Vec<QueryNode>,
    /// Minimum number of `should` clauses that must match.
    ///
    /// When absent: 1 if the node has `should` clauses but no
    /// `must`/`filter`, otherwise 0.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match: Option<u32>,
    /// Multiplier applied to the combined score.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl BoolQuery {
    /// New empty boolean node.
    pub fn new() -> Self {
        Self {
            boost: 1.0,
            ..Self::default()
        }
    }

    /// Add a must clause.
    pub fn must(mut self, node: impl Into<QueryNode>) -> Self {
        self.must.push(node.into());
        self
    }

    /// Add a should clause.
    pub fn should(mut self, node: impl Into<QueryNode>) -> Self {
        self.should.push(node.into());
        self
    }

    /// Add a filter clause.
    pub fn filter(mut self, node: impl Into<QueryNode>) -> Self {
        self.filter.push(node.into());
        self
    }

    /// Add a must-not clause.
    pub fn must_not(mut self, node: impl Into<QueryNode>) -> Self {
        self.must_not.push(node.into());
        self
    }

    /// Require at least `n` should clauses to match.
    pub fn minimum_should_match(mut self, n: u32) -> Self {
        self.minimum_should_match = Some(n);
        self
    }

    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }

    /// Wrap into a [`QueryNode`].
    pub fn into_node(self) -> QueryNode {
        QueryNode::Bool(self)
    }

    /// Effective minimum-should-match under engine defaults.
    pub fn effective_minimum_should_match(&self) -> u32 {
        match self.minimum_should_match {
            Some(n) => n,
            None => {
                if !self.should.is_empty() && self.must.is_empty() && self.filter.is_empty() {
                    1
                } else {
                    0
                }
            }
        }
    }
}

impl From<BoolQuery> for QueryNode {
    fn from(q: BoolQuery) -> Self {
        QueryNode::Bool(q)
    }
}

/// Analyzed match against one field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchQuery {
    /// Target field path.
    pub field: String,
    /// Query text (analyzed at evaluation time).
    pub text: String,
    /// Percentage of query terms that must match (None = any one term).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match_pct: Option<u8>,
    /// Tolerate typos with automatic edit distance.
    #[serde(default)]
    pub fuzziness_auto: bool,
    /// Leading characters that must match exactly when fuzzy.
    #[serde(default)]
    pub prefix_length: usize,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl MatchQuery {
    /// Require `pct`% of query terms to match.
    pub fn min_should_match_pct(mut self, pct: u8) -> Self {
        self.minimum_should_match_pct = Some(pct);
        self
    }

    /// Enable automatic-edit-distance fuzziness.
    pub fn fuzziness_auto(mut self) -> Self {
        self.fuzziness_auto = true;
        self
    }

    /// Set the fuzzy prefix length.
    pub fn prefix_length(mut self, n: usize) -> Self {
        self.prefix_length = n;
        self
    }

    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<MatchQuery> for QueryNode {
    fn from(q: MatchQuery) -> Self {
        QueryNode::Match(q)
    }
}

/// Phrase match with slop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchPhraseQuery {
    /// Target field path.
    pub field: String,
    /// Phrase text.
    pub text: String,
    /// Allowed positional slack between phrase terms.
    #[serde(default)]
    pub slop: u32,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl MatchPhraseQuery {
    /// Set the slop.
    pub fn slop(mut self, slop: u32) -> Self {
        self.slop = slop;
        self
    }

    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<MatchPhraseQuery> for QueryNode {
    fn from(q: MatchPhraseQuery) -> Self {
        QueryNode::MatchPhrase(q)
    }
}

/// Cross-field match over weighted fields (AND semantics across terms).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiMatchQuery {
    /// Weighted target fields.
    pub fields: Vec<(String, f32)>,
    /// Query text.
    pub text: String,
    /// Percentage of query terms that must match across the blended fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match_pct: Option<u8>,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl MultiMatchQuery {
    /// Cross-field clause over `fields`.
    pub fn new<I, S>(text: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, f32)>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(f, w)| (f.into(), w)).collect(),
            text: text.into(),
            minimum_should_match_pct: None,
            boost: 1.0,
        }
    }

    /// Require `pct`% of query terms to match.
    pub fn min_should_match_pct(mut self, pct: u8) -> Self {
        self.minimum_should_match_pct = Some(pct);
        self
    }

    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<MultiMatchQuery> for QueryNode {
    fn from(q: MultiMatchQuery) -> Self {
        QueryNode::MultiMatch(q)
    }
}

/// Exact single-value match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermQuery {
    /// Target field path.
    pub field: String,
    /// Value to match exactly.
    pub value: String,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl TermQuery {
    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<TermQuery> for QueryNode {
    fn from(q: TermQuery) -> Self {
        QueryNode::Term(q)
    }
}

/// Exact any-of-values match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TermsQuery {
    /// Target field path.
    pub field: String,
    /// Values; any one matching suffices.
    pub values: Vec<String>,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl TermsQuery {
    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<TermsQuery> for QueryNode {
    fn from(q: TermsQuery) -> Self {
        QueryNode::Terms(q)
    }
}

/// Prefix match on the raw field value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrefixQuery {
    /// Target field path.
    pub field: String,
    /// Required prefix.
    pub value: String,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl PrefixQuery {
    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<PrefixQuery> for QueryNode {
    fn from(q: PrefixQuery) -> Self {
        QueryNode::Prefix(q)
    }
}

/// Fuzzy match with automatic edit distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyQuery {
    /// Target field path.
    pub field: String,
    /// Value to match within edit distance.
    pub value: String,
    /// Leading characters that must match exactly.
    #[serde(default)]
    pub prefix_length: usize,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl FuzzyQuery {
    /// Set the fuzzy prefix length.
    pub fn prefix_length(mut self, n: usize) -> Self {
        self.prefix_length = n;
        self
    }

    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<FuzzyQuery> for QueryNode {
    fn from(q: FuzzyQuery) -> Self {
        QueryNode::Fuzzy(q)
    }
}

/// Match by document id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdsQuery {
    /// Ids; any one matching suffices.
    pub values: Vec<String>,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl IdsQuery {
    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<IdsQuery> for QueryNode {
    fn from(q: IdsQuery) -> Self {
        QueryNode::Ids(q)
    }
}

/// Numeric greater-than filter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RangeGtQuery {
    /// Target numeric field.
    pub field: String,
    /// Exclusive lower bound.
    pub value: f64,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl From<RangeGtQuery> for QueryNode {
    fn from(q: RangeGtQuery) -> Self {
        QueryNode::RangeGt(q)
    }
}

/// Term-overlap similarity against a reference text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoreLikeThisQuery {
    /// Fields to compare against.
    pub fields: Vec<String>,
    /// Reference text significant terms are drawn from.
    pub like_text: String,
    /// Minimum times a term must occur in the reference to be significant.
    #[serde(default = "default_one")]
    pub min_term_freq: u32,
    /// Minimum documents a term must occur in (advisory for adapters).
    #[serde(default = "default_one")]
    pub min_doc_freq: u32,
    /// Cap on significant terms drawn from the reference.
    #[serde(default = "default_max_query_terms")]
    pub max_query_terms: usize,
    /// Percentage of significant terms that must match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_should_match_pct: Option<u8>,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl MoreLikeThisQuery {
    /// Similarity clause over `fields` against `like_text`.
    pub fn new<I, S>(fields: I, like_text: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
            like_text: like_text.into(),
            min_term_freq: 1,
            min_doc_freq: 1,
            max_query_terms: default_max_query_terms(),
            minimum_should_match_pct: None,
            boost: 1.0,
        }
    }

    /// Set the minimum reference term frequency.
    pub fn min_term_freq(mut self, n: u32) -> Self {
        self.min_term_freq = n;
        self
    }

    /// Set the minimum document frequency.
    pub fn min_doc_freq(mut self, n: u32) -> Self {
        self.min_doc_freq = n;
        self
    }

    /// Cap the number of significant terms.
    pub fn max_query_terms(mut self, n: usize) -> Self {
        self.max_query_terms = n;
        self
    }

    /// Require `pct`% of significant terms to match.
    pub fn min_should_match_pct(mut self, pct: u8) -> Self {
        self.minimum_should_match_pct = Some(pct);
        self
    }

    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<MoreLikeThisQuery> for QueryNode {
    fn from(q: MoreLikeThisQuery) -> Self {
        QueryNode::MoreLikeThis(q)
    }
}

/// Field-value-factor scoring over a filtered subset.
///
/// Documents matching `filter` score `boost × log1p(field × factor)`
/// (multiply combine mode); non-matching documents are unaffected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionScoreQuery {
    /// Subset the function applies to.
    pub filter: Box<QueryNode>,
    /// Numeric field feeding the factor.
    pub field: String,
    /// Multiplier applied to the field value before the modifier.
    #[serde(default = "default_boost_f64")]
    pub factor: f64,
    /// Value used when the field is missing.
    #[serde(default)]
    pub missing: f64,
    /// Score multiplier.
    #[serde(default = "default_boost")]
    pub boost: f32,
}

impl FunctionScoreQuery {
    /// Log1p field-value-factor clause.
    pub fn log1p(filter: impl Into<QueryNode>, field: impl Into<String>) -> Self {
        Self {
            filter: Box::new(filter.into()),
            field: field.into(),
            factor: 1.0,
            missing: 0.0,
            boost: 1.0,
        }
    }

    /// Set the score multiplier.
    pub fn boost(mut self, boost: f32) -> Self {
        self.boost = boost;
        self
    }
}

impl From<FunctionScoreQuery> for QueryNode {
    fn from(q: FunctionScoreQuery) -> Self {
        QueryNode::FunctionScore(q)
    }
}

fn default_boost() -> f32 {
    1.0
}

fn default_boost_f64() -> f64 {
    1.0
}

fn default_one() -> u32 {
    1
}

fn default_max_query_terms() -> usize {
    25
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_builder_chains() {
        let q = BoolQuery::new()
            .should(QueryNode::term(field::MAJORS, "CS").boost(1.5))
            .filter(QueryNode::term(field::DELETED, "false"))
            .minimum_should_match(1)
            .boost(2.0);

        assert_eq!(q.should.len(), 1);
        assert_eq!(q.filter.len(), 1);
        assert_eq!(q.minimum_should_match, Some(1));
        assert_eq!(q.boost, 2.0);
    }

    #[test]
    fn test_effective_minimum_should_match_defaults() {
        // should-only boolean requires one match
        let q = BoolQuery::new().should(QueryNode::term(field::TAGS, "sql"));
        assert_eq!(q.effective_minimum_should_match(), 1);

        // a filter relaxes the default to zero
        let q = BoolQuery::new()
            .should(QueryNode::term(field::TAGS, "sql"))
            .filter(QueryNode::term(field::DELETED, "false"));
        assert_eq!(q.effective_minimum_should_match(), 0);

        // explicit value wins
        let q = BoolQuery::new()
            .should(QueryNode::term(field::TAGS, "sql"))
            .minimum_should_match(1)
            .filter(QueryNode::term(field::DELETED, "false"));
        assert_eq!(q.effective_minimum_should_match(), 1);
    }

    #[test]
    fn test_node_serialization_tagged() {
        let node: QueryNode = QueryNode::match_phrase(field::CONTENT, "b tree").slop(1).into();
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"match_phrase\""));
        assert!(json.contains("\"slop\":1"));
    }

    #[test]
    fn test_more_like_this_defaults() {
        let q = MoreLikeThisQuery::new([field::CONTENT], "reference text");
        assert_eq!(q.min_term_freq, 1);
        assert_eq!(q.max_query_terms, 25);
        assert!(q.minimum_should_match_pct.is_none());
    }

    #[test]
    fn test_roundtrip() {
        let node = BoolQuery::new()
            .must(QueryNode::match_(field::CONTENT, "index").min_should_match_pct(70))
            .must_not(QueryNode::ids(["d1"]))
            .into_node();
        let json = serde_json::to_string(&node).unwrap();
        let back: QueryNode = serde_json::from_str(&json).unwrap();
        let QueryNode::Bool(b) = back else {
            panic!("expected bool node");
        };
        assert_eq!(b.must.len(), 1);
        assert_eq!(b.must_not.len(), 1);
    }
}
