//! Shared application state: the three discovery engines, wired once.

use std::sync::Arc;

use biblio_core::{EffectQueue, IdentityProvider, PreferenceStore};
use biblio_discovery::{
    FavoriteFilter, FavoriteStore, LanguageDetector, RecommendationEngine, ScoringPolicy,
    SearchService, SuggestionEngine, WhatlangDetector,
};
use biblio_query::SearchExecutor;

/// State handed to every handler. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    /// Ranked document search.
    pub search: Arc<SearchService>,
    /// Typeahead suggestions.
    pub suggestions: Arc<SuggestionEngine>,
    /// Seeded and preference-only recommendations.
    pub recommendations: Arc<RecommendationEngine>,
}

impl AppState {
    /// Wire the engines over the given seams and policy.
    pub fn new(
        executor: Arc<dyn SearchExecutor>,
        identity: Arc<dyn IdentityProvider>,
        preferences: Arc<dyn PreferenceStore>,
        favorites: Arc<dyn FavoriteStore>,
        policy: ScoringPolicy,
        effects: EffectQueue,
    ) -> Self {
        let detector: Arc<dyn LanguageDetector> = Arc::new(WhatlangDetector);

        let search = Arc::new(SearchService::new(
            executor.clone(),
            identity.clone(),
            preferences.clone(),
            FavoriteFilter::new(
                favorites.clone(),
                policy.max_favorite_ids,
                policy.favorite_batch_size,
            ),
            detector.clone(),
            policy.clone(),
            effects.clone(),
        ));

        let suggestions = Arc::new(SuggestionEngine::new(
            executor.clone(),
            identity.clone(),
            preferences.clone(),
            detector,
            policy.clone(),
        ));

        let recommendations = Arc::new(RecommendationEngine::new(
            executor,
            identity,
            preferences,
            FavoriteFilter::new(favorites, policy.max_favorite_ids, policy.favorite_batch_size),
            policy,
            effects,
        ));

        Self {
            search,
            suggestions,
            recommendations,
        }
    }
}
