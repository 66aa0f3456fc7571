//! Query-tree construction for ranked search.
//!
//! The scorer translates an analyzed query into boost clauses according to
//! the [`ScoringPolicy`]: tight phrase-first clauses for definition-style
//! queries, broader term matching with case variants for general ones, plus
//! the shared popularity and preference boosts. All clauses are `should`
//! clauses; callers gate them with `minimum_should_match = 1` whenever any
//! text condition is present.

use biblio_core::DocumentPreferences;
use biblio_query::ast::{FunctionScoreQuery, MultiMatchQuery};
use biblio_query::{field, BoolQuery, HighlightField, HighlightSpec, QueryNode, SortOrder, SortSpec};

use crate::context::{QueryType, SearchContext};
use crate::policy::{PreferenceWeights, ScoringPolicy};

/// Builds ranking clauses from a [`ScoringPolicy`].
pub struct RelevanceScorer<'a> {
    policy: &'a ScoringPolicy,
}

impl<'a> RelevanceScorer<'a> {
    pub fn new(policy: &'a ScoringPolicy) -> Self {
        Self { policy }
    }

    /// Text clauses for a non-empty query, per its type and language.
    pub fn text_conditions(&self, ctx: &SearchContext, language: &str) -> Vec<QueryNode> {
        match ctx.query_type {
            QueryType::Definition => self.definition_conditions(ctx, language),
            QueryType::General => self.general_conditions(ctx, language),
        }
    }

    fn definition_conditions(&self, ctx: &SearchContext, language: &str) -> Vec<QueryNode> {
        let p = &self.policy.definition;
        let query = ctx.original.as_str();

        let (content_field, phrase_boost, term_boost) = match language {
            "ko" => (field::CONTENT_KO, p.phrase_ko, p.term_ko),
            "vi" => (field::CONTENT_VI, p.phrase_vi, p.term_vi),
            _ => (field::CONTENT, p.phrase_default, p.term_default),
        };

        vec![
            QueryNode::match_phrase(content_field, query)
                .boost(phrase_boost)
                .into(),
            QueryNode::match_(content_field, query).boost(term_boost).into(),
            MultiMatchQuery::new(
                query,
                [
                    (field::FILENAME, p.cross_field_filename_weight),
                    (field::CONTENT, p.cross_field_content_weight),
                ],
            )
            .min_should_match_pct(p.cross_field_msm_pct)
            .boost(p.cross_field)
            .into(),
        ]
    }

    fn general_conditions(&self, ctx: &SearchContext, language: &str) -> Vec<QueryNode> {
        let p = &self.policy.general;

        // Content matching, phrase-first with language-specific fields.
        let mut content = BoolQuery::new();
        match language {
            "ko" => {
                content = content
                    .should(
                        QueryNode::match_phrase(field::CONTENT_KO, &ctx.original)
                            .slop(p.phrase_slop)
                            .boost(p.phrase_ko),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT_KO, &ctx.original)
                            .min_should_match_pct(p.term_ko_msm_pct)
                            .boost(p.term_ko),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT, &ctx.original)
                            .min_should_match_pct(p.term_fallback_msm_pct)
                            .boost(p.term_fallback),
                    );
            }
            "vi" => {
                content = content
                    .should(
                        QueryNode::match_phrase(field::CONTENT_VI, &ctx.original)
                            .slop(p.phrase_slop)
                            .boost(p.phrase_vi),
                    )
                    .should(
                        QueryNode::match_phrase(field::CONTENT_VI, &ctx.lowercase)
                            .slop(p.phrase_slop)
                            .boost(p.case_variant_phrase),
                    )
                    .should(
                        QueryNode::match_phrase(field::CONTENT_VI, &ctx.uppercase)
                            .slop(p.phrase_slop)
                            .boost(p.case_variant_phrase),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT_VI, &ctx.original)
                            .min_should_match_pct(p.term_fallback_msm_pct)
                            .boost(p.term_fallback),
                    );
            }
            _ => {
                content = content
                    .should(
                        QueryNode::match_phrase(field::CONTENT, &ctx.original)
                            .slop(p.phrase_slop)
                            .boost(p.phrase_default),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT, &ctx.original)
                            .min_should_match_pct(p.term_fallback_msm_pct)
                            .boost(p.term_fallback),
                    )
                    .should(
                        QueryNode::match_phrase(field::CONTENT, &ctx.lowercase)
                            .slop(p.phrase_slop)
                            .boost(p.case_variant_phrase),
                    )
                    .should(
                        QueryNode::match_phrase(field::CONTENT, &ctx.uppercase)
                            .slop(p.phrase_slop)
                            .boost(p.case_variant_phrase),
                    );
            }
        }

        // Filename matching, with exact case variants.
        let mut filename = BoolQuery::new();
        match language {
            "ko" => {
                filename = filename.should(
                    QueryNode::match_(field::FILENAME_KO, &ctx.original)
                        .min_should_match_pct(p.filename_msm_pct)
                        .boost(p.filename_ko),
                );
            }
            "vi" => {
                filename = filename.should(
                    QueryNode::match_(field::FILENAME_VI, &ctx.original)
                        .min_should_match_pct(p.filename_msm_pct)
                        .boost(p.filename_vi),
                );
            }
            _ => {}
        }
        filename = filename
            .should(
                QueryNode::match_(field::FILENAME, &ctx.original)
                    .min_should_match_pct(p.filename_msm_pct)
                    .boost(p.filename_universal),
            )
            .should(
                QueryNode::match_(field::FILENAME_SEARCH, &ctx.original)
                    .min_should_match_pct(p.filename_msm_pct)
                    .boost(p.filename_search),
            )
            .should(QueryNode::term(field::FILENAME_RAW, &ctx.original).boost(p.filename_exact))
            .should(
                QueryNode::term(field::FILENAME_RAW, &ctx.lowercase)
                    .boost(p.filename_exact_case_variant),
            )
            .should(
                QueryNode::term(field::FILENAME_RAW, &ctx.uppercase)
                    .boost(p.filename_exact_case_variant),
            );

        vec![content.into_node(), filename.into_node()]
    }

    /// Popularity boosts shared by search and suggestions: log-damped
    /// function scores over the interaction counters.
    pub fn popularity_boosts(&self) -> Vec<QueryNode> {
        let p = &self.policy.popularity;
        vec![
            FunctionScoreQuery::log1p(
                QueryNode::range_gt(field::RECOMMENDATION_COUNT, 0.0),
                field::RECOMMENDATION_COUNT,
            )
            .boost(p.recommendation_count)
            .into(),
            FunctionScoreQuery::log1p(
                QueryNode::range_gt(field::FAVORITE_COUNT, 0.0),
                field::FAVORITE_COUNT,
            )
            .boost(p.favorite_count)
            .into(),
        ]
    }

    /// Preference boosts over explicit preferred fields and languages.
    pub fn preference_boosts(
        &self,
        prefs: &DocumentPreferences,
        weights: &PreferenceWeights,
    ) -> Vec<QueryNode> {
        let mut clauses = Vec::new();
        push_terms_boost(&mut clauses, field::MAJORS, &prefs.preferred_majors, weights.majors);
        push_terms_boost(
            &mut clauses,
            field::COURSE_CODES,
            &prefs.preferred_course_codes,
            weights.course_codes,
        );
        push_terms_boost(
            &mut clauses,
            field::COURSE_LEVEL,
            &prefs.preferred_levels,
            weights.level,
        );
        push_terms_boost(
            &mut clauses,
            field::CATEGORIES,
            &prefs.preferred_categories,
            weights.categories,
        );
        push_terms_boost(&mut clauses, field::TAGS, &prefs.preferred_tags, weights.tags);
        push_terms_boost(
            &mut clauses,
            field::LANGUAGE,
            &prefs.language_preferences,
            weights.language,
        );
        clauses
    }

    /// Highlight spec for search responses, shaped by query type.
    pub fn search_highlight(&self, ctx: &SearchContext) -> HighlightSpec {
        let h = &self.policy.highlight;
        let (content_size, content_fragments) = match ctx.query_type {
            QueryType::Definition => {
                (h.content_definition_fragment_size, h.content_definition_fragments)
            }
            QueryType::General => (h.content_general_fragment_size, h.content_general_fragments),
        };
        HighlightSpec::new(h.search_pre_tag.clone(), h.search_post_tag.clone())
            .field(HighlightField::new(
                field::FILENAME,
                h.filename_fragment_size,
                h.filename_fragments,
            ))
            .field(HighlightField::new(field::CONTENT, content_size, content_fragments))
    }
}

/// Sort criteria for a request: an explicit field maps to its sortable
/// index variant with a score tiebreak; otherwise relevance then recency.
pub fn sort_specs(sort_field: Option<&str>, sort_direction: Option<&str>) -> Vec<SortSpec> {
    let Some(sort_field) = sort_field.filter(|f| !f.trim().is_empty()) else {
        // Score desc then createdAt desc is the executor's default.
        return Vec::new();
    };
    let order = match sort_direction.map(str::to_ascii_lowercase).as_deref() {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    };
    vec![
        SortSpec::new(sortable_field_name(sort_field), order),
        SortSpec::score_desc(),
    ]
}

fn sortable_field_name(name: &str) -> String {
    match name {
        "filename" => field::FILENAME_LOWERCASE.to_string(),
        "content" => field::CONTENT_KEYWORD.to_string(),
        "created_at" | "createdAt" => field::CREATED_AT.to_string(),
        other => other.to_string(),
    }
}

fn push_terms_boost(
    clauses: &mut Vec<QueryNode>,
    target: &str,
    values: &std::collections::HashSet<String>,
    boost: f32,
) {
    if values.is_empty() {
        return;
    }
    clauses.push(QueryNode::terms(target, values.iter().cloned()).boost(boost).into());
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::analyze_query;
    use uuid::Uuid;

    fn scorer_test<'a>(policy: &'a ScoringPolicy) -> RelevanceScorer<'a> {
        RelevanceScorer::new(policy)
    }

    #[test]
    fn test_definition_conditions_shape() {
        let policy = ScoringPolicy::default();
        let scorer = scorer_test(&policy);
        let ctx = analyze_query("database");
        let clauses = scorer.text_conditions(&ctx, "en");

        assert_eq!(clauses.len(), 3);
        let QueryNode::MatchPhrase(phrase) = &clauses[0] else {
            panic!("expected phrase clause first");
        };
        assert_eq!(phrase.field, field::CONTENT);
        assert_eq!(phrase.boost, 15.0);
        let QueryNode::MultiMatch(cross) = &clauses[2] else {
            panic!("expected cross-field clause last");
        };
        assert_eq!(cross.minimum_should_match_pct, Some(75));
        assert_eq!(cross.boost, 4.0);
    }

    #[test]
    fn test_definition_korean_uses_korean_field() {
        let policy = ScoringPolicy::default();
        let scorer = scorer_test(&policy);
        let ctx = analyze_query("데이터베이스");
        let clauses = scorer.text_conditions(&ctx, "ko");
        let QueryNode::MatchPhrase(phrase) = &clauses[0] else {
            panic!("expected phrase clause");
        };
        assert_eq!(phrase.field, field::CONTENT_KO);
        assert_eq!(phrase.boost, 18.0);
    }

    #[test]
    fn test_general_conditions_are_two_nested_bools() {
        let policy = ScoringPolicy::default();
        let scorer = scorer_test(&policy);
        let ctx = analyze_query("how does a btree index work");
        let clauses = scorer.text_conditions(&ctx, "en");

        assert_eq!(clauses.len(), 2);
        let QueryNode::Bool(content) = &clauses[0] else {
            panic!("expected content bool");
        };
        // phrase + term + two case variants
        assert_eq!(content.should.len(), 4);
        let QueryNode::Bool(filename) = &clauses[1] else {
            panic!("expected filename bool");
        };
        // universal + search + three raw exacts
        assert_eq!(filename.should.len(), 5);
    }

    #[test]
    fn test_general_korean_adds_language_filename_clause() {
        let policy = ScoringPolicy::default();
        let scorer = scorer_test(&policy);
        let ctx = analyze_query("데이터베이스 시스템 강의 자료 요약");
        let clauses = scorer.text_conditions(&ctx, "ko");
        let QueryNode::Bool(filename) = &clauses[1] else {
            panic!("expected filename bool");
        };
        assert_eq!(filename.should.len(), 6);
    }

    #[test]
    fn test_popularity_boosts() {
        let policy = ScoringPolicy::default();
        let scorer = scorer_test(&policy);
        let boosts = scorer.popularity_boosts();
        assert_eq!(boosts.len(), 2);
        let QueryNode::FunctionScore(rec) = &boosts[0] else {
            panic!("expected function score");
        };
        assert_eq!(rec.boost, 5.0);
        assert_eq!(rec.field, field::RECOMMENDATION_COUNT);
    }

    #[test]
    fn test_preference_boosts_skip_empty_sets() {
        let policy = ScoringPolicy::default();
        let scorer = scorer_test(&policy);
        let mut prefs = DocumentPreferences::new(Uuid::new_v4());
        prefs.preferred_majors.insert("CS".into());
        prefs.language_preferences.insert("ko".into());

        let boosts = scorer.preference_boosts(&prefs, &policy.search_preferences);
        assert_eq!(boosts.len(), 2);
    }

    #[test]
    fn test_sort_specs_mapping() {
        let specs = sort_specs(Some("filename"), Some("ASC"));
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].field, field::FILENAME_LOWERCASE);
        assert_eq!(specs[0].order, SortOrder::Asc);
        assert_eq!(specs[1].field, "_score");

        let specs = sort_specs(Some("created_at"), None);
        assert_eq!(specs[0].field, field::CREATED_AT);
        assert_eq!(specs[0].order, SortOrder::Desc);

        assert!(sort_specs(None, None).is_empty());
        assert!(sort_specs(Some("  "), None).is_empty());
    }

    #[test]
    fn test_search_highlight_shape_depends_on_query_type() {
        let policy = ScoringPolicy::default();
        let scorer = scorer_test(&policy);

        let definition = scorer.search_highlight(&analyze_query("btree"));
        assert_eq!(definition.fields[1].fragment_size, 200);
        assert_eq!(definition.fields[1].number_of_fragments, 1);

        let general = scorer.search_highlight(&analyze_query("how does a btree work"));
        assert_eq!(general.fields[1].fragment_size, 150);
        assert_eq!(general.fields[1].number_of_fragments, 2);
        assert_eq!(general.pre_tag, "<em><b>");
    }
}
