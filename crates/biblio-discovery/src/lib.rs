//! Biblio Discovery — search, suggestion, and recommendation ranking.
//!
//! This crate turns caller requests into [`biblio_query::SearchPlan`]s and
//! hit pages into response DTOs. It owns every ranking decision: query
//! analysis, language-aware boost selection, access and facet filtering,
//! personalization from stored preferences, popularity boosts, and the
//! minimum-score floor. The index itself stays behind the
//! [`biblio_query::SearchExecutor`] seam.
//!
//! Three entry points:
//!
//! - [`SearchService::search`] — filtered, ranked, highlighted pages
//! - [`SuggestionEngine::suggest`] — typeahead fragments, capped at ten
//! - [`RecommendationEngine::recommend`] — seeded or preference-only
//!
//! All boost constants live in [`ScoringPolicy`]; the engines read them,
//! never hard-code them.

pub mod access;
pub mod context;
pub mod facets;
pub mod favorites;
pub mod language;
pub mod policy;
pub mod recommend;
pub mod relevance;
pub mod request;
pub mod results;
pub mod search;
pub mod suggest;

pub use access::with_access_filter;
pub use context::{analyze_query, QueryType, SearchContext};
pub use facets::{with_facet_filters, FacetSelection};
pub use favorites::{FavoriteFilter, FavoriteStore, MemoryFavoriteStore};
pub use language::{LanguageDetector, WhatlangDetector};
pub use policy::ScoringPolicy;
pub use recommend::RecommendationEngine;
pub use relevance::RelevanceScorer;
pub use request::{DocumentResponse, RecommendationParams, SearchRequest, SuggestionRequest};
pub use search::SearchService;
pub use suggest::SuggestionEngine;
