//! The search orchestrator.

use std::sync::Arc;

use biblio_core::{
    EffectQueue, Error, IdentityProvider, Page, PageRequest, PreferenceStore, Result, SideEffect,
};
use biblio_query::{BoolQuery, SearchExecutor, SearchPlan};
use chrono::Utc;

use crate::access::with_access_filter;
use crate::context::analyze_query;
use crate::facets::with_facet_filters;
use crate::favorites::FavoriteFilter;
use crate::language::LanguageDetector;
use crate::policy::ScoringPolicy;
use crate::relevance::{sort_specs, RelevanceScorer};
use crate::request::{DocumentResponse, SearchRequest};
use crate::results::to_document_page;

/// Ranked, access-filtered, personalized document search.
pub struct SearchService {
    executor: Arc<dyn SearchExecutor>,
    identity: Arc<dyn IdentityProvider>,
    preferences: Arc<dyn PreferenceStore>,
    favorites: FavoriteFilter,
    detector: Arc<dyn LanguageDetector>,
    policy: ScoringPolicy,
    effects: EffectQueue,
}

impl SearchService {
    pub fn new(
        executor: Arc<dyn SearchExecutor>,
        identity: Arc<dyn IdentityProvider>,
        preferences: Arc<dyn PreferenceStore>,
        favorites: FavoriteFilter,
        detector: Arc<dyn LanguageDetector>,
        policy: ScoringPolicy,
        effects: EffectQueue,
    ) -> Self {
        Self {
            executor,
            identity,
            preferences,
            favorites,
            detector,
            policy,
            effects,
        }
    }

    /// Execute a search for the named requester.
    ///
    /// A query shorter than the minimum search length short-circuits to an
    /// empty page without touching the index.
    pub async fn search(
        &self,
        username: &str,
        request: &SearchRequest,
    ) -> Result<Page<DocumentResponse>> {
        let user = self
            .identity
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::access(format!("user not found: {username}")))?;

        let page = PageRequest::of(request.page, request.size);
        let raw_query = request.search.as_deref().unwrap_or("");
        let ctx = analyze_query(raw_query);

        if !ctx.is_empty() && ctx.original.chars().count() < self.policy.min_search_length {
            log::debug!("Query below minimum search length, returning empty page");
            return Ok(Page::empty(page));
        }

        let scorer = RelevanceScorer::new(&self.policy);
        let mut root = with_access_filter(BoolQuery::new(), &user);

        if request.favorite_only {
            root = root.filter(self.favorites.filter_clause(user.user_id).await);
        }

        for boost in scorer.popularity_boosts() {
            root = root.should(boost);
        }

        root = with_facet_filters(root, &request.facets());

        if let Some(prefs) = self.preferences.find_by_user(user.user_id).await? {
            for boost in scorer.preference_boosts(&prefs, &self.policy.search_preferences) {
                root = root.should(boost);
            }
        }

        let mut plan = SearchPlan::new(BoolQuery::new());
        if !ctx.is_empty() {
            let language = self.detector.detect(&ctx.original);

            for clause in scorer.text_conditions(&ctx, &language) {
                root = root.should(clause);
            }
            root = root.minimum_should_match(1);

            plan = plan.min_score(self.policy.min_score.floor(
                raw_query,
                ctx.query_type,
                &language,
            ));
        }

        plan.query = root.into_node();
        for spec in sort_specs(request.sort_field.as_deref(), request.sort_direction.as_deref()) {
            plan = plan.sort(spec);
        }
        plan = plan.highlight(scorer.search_highlight(&ctx)).page(page);

        let hits = self.executor.execute(&plan).await?;

        self.effects.publish(SideEffect::SearchLogged {
            user_id: user.user_id,
            query: ctx.original.clone(),
            total_hits: hits.total,
            at: Utc::now(),
        });

        Ok(to_document_page(hits, page))
    }
}
