//! Ranking policy constants.
//!
//! Every boost, threshold, and highlighter shape the engines use lives
//! here, in one versioned struct. The values are hand-tuned against the
//! production corpus; change them here, never inline in the query
//! builders. The struct is serde-loadable so a deployment can override a
//! subset from configuration.

use serde::{Deserialize, Serialize};

/// The complete ranking policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringPolicy {
    /// Policy revision, bumped whenever constants are retuned.
    pub version: u32,
    /// Queries shorter than this (in characters) are not searched.
    pub min_search_length: usize,
    /// Cap on returned typeahead suggestions.
    pub max_suggestions: usize,
    /// Favorite ids resolved per user, most recent first.
    pub max_favorite_ids: usize,
    /// Identity-filter batch size safe for the backend.
    pub favorite_batch_size: usize,

    pub definition: DefinitionBoosts,
    pub general: GeneralBoosts,
    pub suggestion: SuggestionBoosts,
    pub recommendation: RecommendationBoosts,
    pub popularity: PopularityBoosts,
    pub search_preferences: PreferenceWeights,
    pub suggestion_preferences: PreferenceWeights,
    pub min_score: MinScorePolicy,
    pub highlight: HighlightPolicy,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            version: 1,
            min_search_length: 2,
            max_suggestions: 10,
            max_favorite_ids: 1000,
            favorite_batch_size: 1000,
            definition: DefinitionBoosts::default(),
            general: GeneralBoosts::default(),
            suggestion: SuggestionBoosts::default(),
            recommendation: RecommendationBoosts::default(),
            popularity: PopularityBoosts::default(),
            search_preferences: PreferenceWeights::for_search(),
            suggestion_preferences: PreferenceWeights::for_suggestions(),
            min_score: MinScorePolicy::default(),
            highlight: HighlightPolicy::default(),
        }
    }
}

/// Boosts for definition-style (short) queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionBoosts {
    pub phrase_ko: f32,
    pub phrase_vi: f32,
    pub phrase_default: f32,
    pub term_ko: f32,
    pub term_vi: f32,
    pub term_default: f32,
    /// Filename weight in the cross-field clause.
    pub cross_field_filename_weight: f32,
    /// Content weight in the cross-field clause.
    pub cross_field_content_weight: f32,
    pub cross_field_msm_pct: u8,
    pub cross_field: f32,
}

impl Default for DefinitionBoosts {
    fn default() -> Self {
        Self {
            phrase_ko: 18.0,
            phrase_vi: 15.0,
            phrase_default: 15.0,
            term_ko: 12.0,
            term_vi: 10.0,
            term_default: 10.0,
            cross_field_filename_weight: 4.0,
            cross_field_content_weight: 3.0,
            cross_field_msm_pct: 75,
            cross_field: 4.0,
        }
    }
}

/// Boosts for general (longer) queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralBoosts {
    pub phrase_slop: u32,
    pub phrase_ko: f32,
    pub phrase_vi: f32,
    pub phrase_default: f32,
    /// Phrase clauses over the upper/lowercase query variants.
    pub case_variant_phrase: f32,
    pub term_ko: f32,
    pub term_ko_msm_pct: u8,
    /// Universal-field fallback term match (also the vi/default weight).
    pub term_fallback: f32,
    pub term_fallback_msm_pct: u8,
    pub filename_msm_pct: u8,
    pub filename_ko: f32,
    pub filename_vi: f32,
    pub filename_universal: f32,
    pub filename_search: f32,
    pub filename_exact: f32,
    pub filename_exact_case_variant: f32,
}

impl Default for GeneralBoosts {
    fn default() -> Self {
        Self {
            phrase_slop: 1,
            phrase_ko: 12.0,
            phrase_vi: 10.0,
            phrase_default: 10.0,
            case_variant_phrase: 9.0,
            term_ko: 8.0,
            term_ko_msm_pct: 60,
            term_fallback: 4.0,
            term_fallback_msm_pct: 70,
            filename_msm_pct: 60,
            filename_ko: 6.0,
            filename_vi: 5.0,
            filename_universal: 5.0,
            filename_search: 4.0,
            filename_exact: 6.0,
            filename_exact_case_variant: 5.5,
        }
    }
}

/// Looser boosts for typeahead suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionBoosts {
    pub content_phrase_slop: u32,
    pub content_phrase_ko: f32,
    pub content_phrase_default: f32,
    pub content_term_ko: f32,
    pub content_term_default: f32,
    pub content_msm_pct: u8,
    /// Case-variant matches on the universal content field (vi branch).
    pub content_case_variant: f32,
    pub content_fuzzy: f32,
    pub content_fuzzy_prefix_len: usize,
    pub content_fuzzy_ko: f32,
    pub content_fuzzy_prefix_len_ko: usize,
    pub filename_phrase_slop: u32,
    pub filename_phrase_ko: f32,
    pub filename_term_ko: f32,
    pub filename_phrase_vi: f32,
    pub filename_term_vi: f32,
    pub filename_exact: f32,
    pub filename_match: f32,
    pub filename_search: f32,
    pub filename_prefix: f32,
    pub filename_fuzzy: f32,
    pub filename_fuzzy_prefix_len: usize,
}

impl Default for SuggestionBoosts {
    fn default() -> Self {
        Self {
            content_phrase_slop: 3,
            content_phrase_ko: 5.0,
            content_phrase_default: 4.0,
            content_term_ko: 4.0,
            content_term_default: 3.5,
            content_msm_pct: 30,
            content_case_variant: 2.0,
            content_fuzzy: 2.5,
            content_fuzzy_prefix_len: 2,
            content_fuzzy_ko: 3.0,
            content_fuzzy_prefix_len_ko: 1,
            filename_phrase_slop: 2,
            filename_phrase_ko: 5.5,
            filename_term_ko: 5.0,
            filename_phrase_vi: 4.5,
            filename_term_vi: 4.0,
            filename_exact: 5.0,
            filename_match: 4.0,
            filename_search: 3.5,
            filename_prefix: 3.0,
            filename_fuzzy: 2.5,
            filename_fuzzy_prefix_len: 2,
        }
    }
}

/// Boosts for seeded and preference-only recommendations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationBoosts {
    pub mlt_content: f32,
    pub mlt_content_min_term_freq: u32,
    pub mlt_content_max_terms: usize,
    pub mlt_content_msm_pct: u8,
    pub mlt_filename: f32,
    pub mlt_filename_min_term_freq: u32,
    pub mlt_filename_max_terms: usize,
    pub metadata_majors: f32,
    pub metadata_categories: f32,
    pub metadata_course_codes: f32,
    pub metadata_level: f32,
    pub metadata_tags: f32,
    pub metadata_extracted: f32,
    /// Applied over the base preference weights below.
    pub preference_multiplier: f32,
    pub pref_majors: f32,
    pub pref_course_codes: f32,
    pub pref_level: f32,
    pub pref_categories: f32,
    pub pref_tags: f32,
    /// Per-interaction weight, capped at `interaction_cap`.
    pub interaction_weight: f32,
    pub interaction_cap: f32,
    pub language: f32,
    pub recent_views: f32,
}

impl Default for RecommendationBoosts {
    fn default() -> Self {
        Self {
            mlt_content: 10.0,
            mlt_content_min_term_freq: 2,
            mlt_content_max_terms: 25,
            mlt_content_msm_pct: 30,
            mlt_filename: 5.0,
            mlt_filename_min_term_freq: 1,
            mlt_filename_max_terms: 10,
            metadata_majors: 3.0,
            metadata_categories: 2.0,
            metadata_course_codes: 3.0,
            metadata_level: 3.0,
            metadata_tags: 4.0,
            metadata_extracted: 2.0,
            preference_multiplier: 2.0,
            pref_majors: 3.0,
            pref_course_codes: 3.0,
            pref_level: 2.0,
            pref_categories: 2.5,
            pref_tags: 2.0,
            interaction_weight: 0.5,
            interaction_cap: 3.0,
            language: 5.0,
            recent_views: 1.5,
        }
    }
}

/// Popularity function-score weights (`boost × log1p(count)`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularityBoosts {
    pub recommendation_count: f32,
    pub favorite_count: f32,
}

impl Default for PopularityBoosts {
    fn default() -> Self {
        Self {
            recommendation_count: 5.0,
            favorite_count: 2.0,
        }
    }
}

/// Preference boost weights, deliberately below text boosts so relevance
/// stays the primary factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreferenceWeights {
    pub majors: f32,
    pub course_codes: f32,
    pub level: f32,
    pub categories: f32,
    pub tags: f32,
    pub language: f32,
}

impl PreferenceWeights {
    /// Weights for full search.
    pub fn for_search() -> Self {
        Self {
            majors: 1.5,
            course_codes: 1.5,
            level: 1.0,
            categories: 1.0,
            tags: 1.0,
            language: 1.5,
        }
    }

    /// Stronger weights for typeahead, where personalization is expected.
    pub fn for_suggestions() -> Self {
        Self {
            majors: 2.5,
            course_codes: 2.5,
            level: 2.0,
            categories: 2.0,
            tags: 2.0,
            language: 2.5,
        }
    }
}

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self::for_search()
    }
}

/// Minimum-score floor by language and query type, scaled by query length.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MinScorePolicy {
    pub definition_vi: f32,
    pub general_vi: f32,
    pub definition_ko: f32,
    pub general_ko: f32,
    pub definition_default: f32,
    pub general_default: f32,
}

impl Default for MinScorePolicy {
    fn default() -> Self {
        Self {
            definition_vi: 6.0,
            general_vi: 10.0,
            definition_ko: 5.0,
            general_ko: 8.0,
            definition_default: 8.0,
            general_default: 15.0,
        }
    }
}

impl MinScorePolicy {
    /// The floor for a query: the (language, type) base scaled down for
    /// short queries, which cannot accumulate as much score.
    pub fn floor(&self, query: &str, query_type: crate::QueryType, language: &str) -> f32 {
        use crate::QueryType::Definition;
        let base = match language {
            "vi" => {
                if query_type == Definition {
                    self.definition_vi
                } else {
                    self.general_vi
                }
            }
            "ko" => {
                if query_type == Definition {
                    self.definition_ko
                } else {
                    self.general_ko
                }
            }
            _ => {
                if query_type == Definition {
                    self.definition_default
                } else {
                    self.general_default
                }
            }
        };

        let length = query.trim().chars().count();
        if length <= 3 {
            base * 0.4
        } else if length <= 5 {
            base * 0.6
        } else if length <= 10 {
            base * 0.8
        } else {
            base
        }
    }
}

/// Highlighter shapes and tag pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightPolicy {
    pub search_pre_tag: String,
    pub search_post_tag: String,
    pub suggestion_pre_tag: String,
    pub suggestion_post_tag: String,
    pub filename_fragment_size: usize,
    pub filename_fragments: usize,
    pub content_definition_fragment_size: usize,
    pub content_definition_fragments: usize,
    pub content_general_fragment_size: usize,
    pub content_general_fragments: usize,
    pub suggestion_content_fragment_size: usize,
    pub suggestion_content_fragments: usize,
}

impl Default for HighlightPolicy {
    fn default() -> Self {
        Self {
            search_pre_tag: "<em><b>".to_string(),
            search_post_tag: "</b></em>".to_string(),
            suggestion_pre_tag: "@@HIGHLIGHT@@".to_string(),
            suggestion_post_tag: "@@E_HIGHLIGHT@@".to_string(),
            filename_fragment_size: 60,
            filename_fragments: 1,
            content_definition_fragment_size: 200,
            content_definition_fragments: 1,
            content_general_fragment_size: 150,
            content_general_fragments: 2,
            suggestion_content_fragment_size: 150,
            suggestion_content_fragments: 1,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
