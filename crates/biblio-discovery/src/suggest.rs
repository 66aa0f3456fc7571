//! Typeahead suggestions.
//!
//! Suggestions reuse the access and facet filters but match more loosely
//! than search (larger slop, 30% minimum-should-match, fuzzy clauses) and
//! lean harder on personalization. Every failure path degrades to an empty
//! list: typeahead must never surface an error.

use std::sync::Arc;

use biblio_core::{IdentityProvider, PageRequest, PreferenceStore, Result};
use biblio_query::{
    field, BoolQuery, HighlightField, HighlightSpec, QueryNode, SearchExecutor, SearchPlan,
};

use crate::access::with_access_filter;
use crate::context::{analyze_query, SearchContext};
use crate::facets::with_facet_filters;
use crate::language::LanguageDetector;
use crate::policy::ScoringPolicy;
use crate::relevance::RelevanceScorer;
use crate::request::SuggestionRequest;
use crate::results::to_suggestions;

/// Produces typeahead suggestion fragments.
pub struct SuggestionEngine {
    executor: Arc<dyn SearchExecutor>,
    identity: Arc<dyn IdentityProvider>,
    preferences: Arc<dyn PreferenceStore>,
    detector: Arc<dyn LanguageDetector>,
    policy: ScoringPolicy,
}

impl SuggestionEngine {
    pub fn new(
        executor: Arc<dyn SearchExecutor>,
        identity: Arc<dyn IdentityProvider>,
        preferences: Arc<dyn PreferenceStore>,
        detector: Arc<dyn LanguageDetector>,
        policy: ScoringPolicy,
    ) -> Self {
        Self {
            executor,
            identity,
            preferences,
            detector,
            policy,
        }
    }

    /// Suggestions for a partial query. At most
    /// [`ScoringPolicy::max_suggestions`] distinct fragments.
    pub async fn suggest(&self, username: &str, request: &SuggestionRequest) -> Result<Vec<String>> {
        if request.query.trim().chars().count() < self.policy.min_search_length {
            return Ok(Vec::new());
        }

        // Degrade on identity problems; typeahead is best-effort.
        let user = match self.identity.find_by_username(username).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                log::warn!("Suggestion request for unknown user {username}");
                return Ok(Vec::new());
            }
            Err(e) => {
                log::error!("Error resolving user for suggestions: {e}");
                return Ok(Vec::new());
            }
        };

        let ctx = analyze_query(&request.query);
        let scorer = RelevanceScorer::new(&self.policy);

        let mut root = with_access_filter(BoolQuery::new(), &user);
        root = with_facet_filters(root, &request.facets());

        match self.preferences.find_by_user(user.user_id).await {
            Ok(Some(prefs)) => {
                for boost in scorer.preference_boosts(&prefs, &self.policy.suggestion_preferences) {
                    root = root.should(boost);
                }
            }
            Ok(None) => {}
            Err(e) => {
                log::warn!("Preference lookup failed for suggestions: {e}");
            }
        }

        if !ctx.is_empty() {
            let language = self.detector.detect(&ctx.original);
            root = root
                .should(self.content_conditions(&ctx, &language).into_node())
                .should(self.filename_conditions(&ctx, &language).into_node())
                .minimum_should_match(1);
        }

        for boost in scorer.popularity_boosts() {
            root = root.should(boost);
        }

        let h = &self.policy.highlight;
        let plan = SearchPlan::new(root)
            .page(PageRequest::of(0, self.policy.max_suggestions as i64))
            .highlight(
                HighlightSpec::new(h.suggestion_pre_tag.clone(), h.suggestion_post_tag.clone())
                    .field(HighlightField::new(
                        field::FILENAME,
                        h.filename_fragment_size,
                        h.filename_fragments,
                    ))
                    .field(HighlightField::new(
                        field::CONTENT,
                        h.suggestion_content_fragment_size,
                        h.suggestion_content_fragments,
                    )),
            );

        match self.executor.execute(&plan).await {
            Ok(hits) => Ok(to_suggestions(&hits, self.policy.max_suggestions)),
            Err(e) => {
                log::error!("Error getting suggestions: {e}");
                Ok(Vec::new())
            }
        }
    }

    /// Broad content matching: phrase with generous slop, a low
    /// minimum-should-match, and typo-tolerant fuzzy clauses.
    fn content_conditions(&self, ctx: &SearchContext, language: &str) -> BoolQuery {
        let p = &self.policy.suggestion;
        let mut content = BoolQuery::new();

        match language {
            "ko" => {
                content = content
                    .should(
                        QueryNode::match_phrase(field::CONTENT_KO, &ctx.original)
                            .slop(p.content_phrase_slop)
                            .boost(p.content_phrase_ko),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT_KO, &ctx.original)
                            .min_should_match_pct(p.content_msm_pct)
                            .boost(p.content_term_ko),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT_KO, &ctx.original)
                            .fuzziness_auto()
                            .prefix_length(p.content_fuzzy_prefix_len_ko)
                            .boost(p.content_fuzzy_ko),
                    );
            }
            "vi" => {
                content = content
                    .should(
                        QueryNode::match_phrase(field::CONTENT_VI, &ctx.original)
                            .slop(p.content_phrase_slop)
                            .boost(p.content_phrase_default),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT_VI, &ctx.original)
                            .min_should_match_pct(p.content_msm_pct)
                            .boost(p.content_term_default),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT, &ctx.lowercase)
                            .min_should_match_pct(p.content_msm_pct)
                            .boost(p.content_case_variant),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT, &ctx.uppercase)
                            .min_should_match_pct(p.content_msm_pct)
                            .boost(p.content_case_variant),
                    );
            }
            _ => {
                content = content
                    .should(
                        QueryNode::match_phrase(field::CONTENT, &ctx.original)
                            .slop(p.content_phrase_slop)
                            .boost(p.content_phrase_default),
                    )
                    .should(
                        QueryNode::match_(field::CONTENT, &ctx.original)
                            .min_should_match_pct(p.content_msm_pct)
                            .boost(p.content_term_default),
                    );
            }
        }

        content.should(
            QueryNode::match_(field::CONTENT, &ctx.original)
                .fuzziness_auto()
                .prefix_length(p.content_fuzzy_prefix_len)
                .boost(p.content_fuzzy),
        )
    }

    /// Filename matching with exact, prefix, and fuzzy variants.
    fn filename_conditions(&self, ctx: &SearchContext, language: &str) -> BoolQuery {
        let p = &self.policy.suggestion;
        let mut filename = BoolQuery::new();

        match language {
            "ko" => {
                filename = filename
                    .should(
                        QueryNode::match_phrase(field::FILENAME_KO, &ctx.original)
                            .slop(p.filename_phrase_slop)
                            .boost(p.filename_phrase_ko),
                    )
                    .should(
                        QueryNode::match_(field::FILENAME_KO, &ctx.original)
                            .min_should_match_pct(p.content_msm_pct)
                            .boost(p.filename_term_ko),
                    );
            }
            "vi" => {
                filename = filename
                    .should(
                        QueryNode::match_phrase(field::FILENAME_VI, &ctx.original)
                            .slop(p.filename_phrase_slop)
                            .boost(p.filename_phrase_vi),
                    )
                    .should(
                        QueryNode::match_(field::FILENAME_VI, &ctx.original)
                            .min_should_match_pct(p.content_msm_pct)
                            .boost(p.filename_term_vi),
                    );
            }
            _ => {}
        }

        filename
            .should(QueryNode::term(field::FILENAME_RAW, &ctx.original).boost(p.filename_exact))
            .should(
                QueryNode::match_(field::FILENAME, &ctx.original)
                    .min_should_match_pct(p.content_msm_pct)
                    .boost(p.filename_match),
            )
            .should(
                QueryNode::match_(field::FILENAME_SEARCH, &ctx.original)
                    .min_should_match_pct(p.content_msm_pct)
                    .boost(p.filename_search),
            )
            .should(
                QueryNode::prefix(field::FILENAME_RAW, &ctx.lowercase).boost(p.filename_prefix),
            )
            .should(
                QueryNode::fuzzy(field::FILENAME_RAW, &ctx.uppercase)
                    .prefix_length(p.filename_fuzzy_prefix_len)
                    .boost(p.filename_fuzzy),
            )
    }
}
