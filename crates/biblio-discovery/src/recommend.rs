//! Document recommendations.
//!
//! Two modes share the access filter and preference boosts:
//!
//! - **Seeded**: a source document drives more-like-this similarity on
//!   content and filename plus metadata overlap boosts; the seed itself is
//!   excluded from results.
//! - **Preference-only**: no seed; ranking comes entirely from the stored
//!   preference profile, optionally restricted to favorites.
//!
//! Preferences are get-or-create: the first personalization read creates an
//! empty profile.

use std::sync::Arc;

use biblio_core::{
    DocumentPreferences, EffectQueue, Error, IdentityProvider, IndexedDocument, Page, PageRequest,
    PreferenceStore, Result, SideEffect,
};
use biblio_query::ast::MoreLikeThisQuery;
use biblio_query::{field, BoolQuery, QueryNode, SearchExecutor, SearchPlan, SortSpec};
use chrono::Utc;

use crate::access::with_access_filter;
use crate::favorites::FavoriteFilter;
use crate::policy::ScoringPolicy;
use crate::request::{DocumentResponse, RecommendationParams};
use crate::results::to_document_page;

/// Produces seeded and preference-only recommendations.
pub struct RecommendationEngine {
    executor: Arc<dyn SearchExecutor>,
    identity: Arc<dyn IdentityProvider>,
    preferences: Arc<dyn PreferenceStore>,
    favorites: FavoriteFilter,
    policy: ScoringPolicy,
    effects: EffectQueue,
}

impl RecommendationEngine {
    pub fn new(
        executor: Arc<dyn SearchExecutor>,
        identity: Arc<dyn IdentityProvider>,
        preferences: Arc<dyn PreferenceStore>,
        favorites: FavoriteFilter,
        policy: ScoringPolicy,
        effects: EffectQueue,
    ) -> Self {
        Self {
            executor,
            identity,
            preferences,
            favorites,
            policy,
            effects,
        }
    }

    /// Recommendations for the named requester.
    ///
    /// An unknown seed id fails with [`Error::DocumentNotFound`] before any
    /// ranked query is issued; it never silently degrades to
    /// preference-only mode.
    pub async fn recommend(
        &self,
        username: &str,
        params: &RecommendationParams,
    ) -> Result<Page<DocumentResponse>> {
        let user = self
            .identity
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::access(format!("user not found: {username}")))?;

        let prefs = self.preferences.get_or_create(user.user_id).await?;
        let page = PageRequest::of(params.page, params.size);

        let mut root = with_access_filter(BoolQuery::new(), &user);

        let seed_id = params.document_id.as_deref().filter(|id| !id.is_empty());
        if let Some(seed_id) = seed_id {
            let seed = self
                .executor
                .fetch(seed_id)
                .await?
                .ok_or_else(|| Error::document_not_found(seed_id))?;

            root = root.must_not(QueryNode::ids([seed_id]));
            root = self.with_popularity_boost(root);
            root = self.with_content_similarity(root, &seed);
            root = self.with_metadata_similarity(root, &seed);
        } else if params.favorite_only {
            root = root.filter(self.favorites.filter_clause(user.user_id).await);
        }

        root = self.with_preference_boosts(root, &prefs);

        let plan = SearchPlan::new(root)
            .sort(SortSpec::score_desc())
            .page(page);
        let hits = self.executor.execute(&plan).await?;

        self.effects.publish(SideEffect::RecommendationLogged {
            user_id: user.user_id,
            seed_document_id: seed_id.map(str::to_string),
            at: Utc::now(),
        });

        Ok(to_document_page(hits, page))
    }

    fn with_popularity_boost(&self, query: BoolQuery) -> BoolQuery {
        query.should(
            biblio_query::ast::FunctionScoreQuery::log1p(
                QueryNode::range_gt(field::RECOMMENDATION_COUNT, 0.0),
                field::RECOMMENDATION_COUNT,
            )
            .boost(self.policy.popularity.recommendation_count),
        )
    }

    /// More-like-this similarity against the seed's content and filename.
    fn with_content_similarity(&self, mut query: BoolQuery, seed: &IndexedDocument) -> BoolQuery {
        let p = &self.policy.recommendation;

        if !seed.content.is_empty() {
            query = query.should(
                MoreLikeThisQuery::new([field::CONTENT], &seed.content)
                    .min_term_freq(p.mlt_content_min_term_freq)
                    .min_doc_freq(1)
                    .max_query_terms(p.mlt_content_max_terms)
                    .min_should_match_pct(p.mlt_content_msm_pct)
                    .boost(p.mlt_content),
            );
        }
        if !seed.filename.is_empty() {
            query = query.should(
                MoreLikeThisQuery::new([field::FILENAME], &seed.filename)
                    .min_term_freq(p.mlt_filename_min_term_freq)
                    .min_doc_freq(1)
                    .max_query_terms(p.mlt_filename_max_terms)
                    .boost(p.mlt_filename),
            );
        }
        query
    }

    /// Metadata-overlap boosts against the seed's facets.
    fn with_metadata_similarity(&self, mut query: BoolQuery, seed: &IndexedDocument) -> BoolQuery {
        let p = &self.policy.recommendation;

        if !seed.majors.is_empty() {
            query = query.should(
                QueryNode::terms(field::MAJORS, seed.majors.iter().cloned())
                    .boost(p.metadata_majors),
            );
        }
        if !seed.categories.is_empty() {
            query = query.should(
                QueryNode::terms(field::CATEGORIES, seed.categories.iter().cloned())
                    .boost(p.metadata_categories),
            );
        }
        if !seed.course_codes.is_empty() {
            query = query.should(
                QueryNode::terms(field::COURSE_CODES, seed.course_codes.iter().cloned())
                    .boost(p.metadata_course_codes),
            );
        }
        if !seed.course_level.is_empty() {
            query = query.should(
                QueryNode::term(field::COURSE_LEVEL, &seed.course_level).boost(p.metadata_level),
            );
        }
        if !seed.tags.is_empty() {
            query = query.should(
                QueryNode::terms(field::TAGS, seed.tags.iter().cloned()).boost(p.metadata_tags),
            );
        }
        for value in seed.extracted_metadata.values() {
            query = query.should(
                QueryNode::term(field::EXTRACTED_METADATA_VALUE, value)
                    .boost(p.metadata_extracted),
            );
        }
        query
    }

    /// Explicit preferences at the recommendation multiplier, content-type
    /// weights, interaction-history boosts, language preferences, and the
    /// recently-viewed boost.
    fn with_preference_boosts(&self, mut query: BoolQuery, prefs: &DocumentPreferences) -> BoolQuery {
        let p = &self.policy.recommendation;
        let m = p.preference_multiplier;

        query = push_preferred(query, field::MAJORS, &prefs.preferred_majors, p.pref_majors * m);
        query = push_preferred(
            query,
            field::COURSE_CODES,
            &prefs.preferred_course_codes,
            p.pref_course_codes * m,
        );
        query = push_preferred(
            query,
            field::COURSE_LEVEL,
            &prefs.preferred_levels,
            p.pref_level * m,
        );
        query = push_preferred(
            query,
            field::CATEGORIES,
            &prefs.preferred_categories,
            p.pref_categories * m,
        );
        query = push_preferred(query, field::TAGS, &prefs.preferred_tags, p.pref_tags * m);

        for (content_type, weight) in &prefs.content_type_weights {
            if *weight > 0.0 {
                query = query.should(
                    QueryNode::term(field::DOCUMENT_TYPE, content_type)
                        .boost((*weight as f32) * m),
                );
            }
        }

        query = self.with_interaction_boosts(query, field::CATEGORIES, &prefs.category_interaction_counts);
        query = self.with_interaction_boosts(query, field::MAJORS, &prefs.major_interaction_counts);
        query = self.with_interaction_boosts(query, field::COURSE_LEVEL, &prefs.level_interaction_counts);
        query = self.with_interaction_boosts(query, field::TAGS, &prefs.tag_interaction_counts);

        if !prefs.language_preferences.is_empty() {
            query = query.should(
                QueryNode::terms(field::LANGUAGE, prefs.language_preferences.iter().cloned())
                    .boost(p.language),
            );
        }
        if !prefs.recent_viewed_documents.is_empty() {
            query = query.should(
                QueryNode::ids(prefs.recent_viewed_documents.iter().cloned())
                    .boost(p.recent_views),
            );
        }
        query
    }

    fn with_interaction_boosts(
        &self,
        mut query: BoolQuery,
        target: &str,
        counts: &std::collections::HashMap<String, u32>,
    ) -> BoolQuery {
        let p = &self.policy.recommendation;
        for (value, count) in counts {
            if *count > 0 {
                let boost = (*count as f32 * p.interaction_weight).min(p.interaction_cap);
                query = query.should(QueryNode::term(target, value).boost(boost));
            }
        }
        query
    }
}

fn push_preferred(
    query: BoolQuery,
    target: &str,
    values: &std::collections::HashSet<String>,
    boost: f32,
) -> BoolQuery {
    if values.is_empty() {
        return query;
    }
    query.should(QueryNode::terms(target, values.iter().cloned()).boost(boost))
}
