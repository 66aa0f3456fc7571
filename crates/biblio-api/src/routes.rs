//! Route table and handlers.
//!
//! Handlers are thin: pull the [`Principal`] the auth middleware injected,
//! hand the request to the matching engine, map the error class to a
//! status. All ranking behavior lives in `biblio-discovery`.

use axum::extract::{Query, State};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use biblio_core::Page;
use biblio_discovery::{DocumentResponse, RecommendationParams, SearchRequest, SuggestionRequest};

use crate::auth::Principal;
use crate::error::ApiError;
use crate::state::AppState;

/// Build the route table over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/search", post(search))
        .route("/search/suggestions", post(suggestions))
        .route("/recommendations", get(recommendations))
        .with_state(state)
}

async fn search(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<Page<DocumentResponse>>, ApiError> {
    let page = state.search.search(&principal.username, &request).await?;
    Ok(Json(page))
}

async fn suggestions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(request): Json<SuggestionRequest>,
) -> Result<Json<Vec<String>>, ApiError> {
    let fragments = state
        .suggestions
        .suggest(&principal.username, &request)
        .await?;
    Ok(Json(fragments))
}

async fn recommendations(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<RecommendationParams>,
) -> Result<Json<Page<DocumentResponse>>, ApiError> {
    let page = state
        .recommendations
        .recommend(&principal.username, &params)
        .await?;
    Ok(Json(page))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthLayer, StaticTokenValidator};
    use axum::body::Body;
    use biblio_core::config::AuthConfig;
    use biblio_core::{
        AppRole, DocumentType, EffectQueue, IndexedDocument, MemoryIdentityProvider,
        MemoryPreferenceStore, SharingType, UserAccount,
    };
    use biblio_discovery::{MemoryFavoriteStore, ScoringPolicy};
    use biblio_query::MemoryIndex;
    use chrono::Utc;
    use http::{Request, StatusCode};
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tower::ServiceExt;
    use uuid::Uuid;

    async fn test_app() -> (Router, Arc<MemoryIndex>, Uuid) {
        let index = Arc::new(MemoryIndex::new());
        let identity = Arc::new(MemoryIdentityProvider::new());
        let alice = UserAccount {
            user_id: Uuid::new_v4(),
            username: "alice".to_string(),
            role: AppRole::User,
        };
        identity.register(alice.clone()).await;

        let state = AppState::new(
            index.clone(),
            identity,
            Arc::new(MemoryPreferenceStore::new()),
            Arc::new(MemoryFavoriteStore::new()),
            ScoringPolicy::default(),
            EffectQueue::disabled(),
        );
        let app = router(state).layer(AuthLayer::new(
            Arc::new(StaticTokenValidator::new()),
            AuthConfig { enabled: false },
        ));
        (app, index, alice.user_id)
    }

    fn indexed(id: &str, owner: Uuid, content: &str) -> IndexedDocument {
        IndexedDocument {
            id: id.to_string(),
            filename: format!("{id}.pdf"),
            content: content.to_string(),
            document_type: DocumentType::Pdf,
            majors: HashSet::new(),
            course_codes: HashSet::new(),
            course_level: String::new(),
            categories: HashSet::new(),
            tags: HashSet::new(),
            extracted_metadata: HashMap::new(),
            language: "en".to_string(),
            user_id: owner,
            sharing_type: SharingType::Private,
            shared_with: HashSet::new(),
            recommendation_count: 0,
            favorite_count: 0,
            report_status: None,
            status: "completed".to_string(),
            deleted: false,
            file_size: 1024,
            mime_type: "application/pdf".to_string(),
            current_version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn json_post(uri: &str, username: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("x-username", username)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_search_returns_page() {
        let (app, index, alice) = test_app().await;
        index.insert(indexed("d1", alice, "database systems handbook"));

        let resp = app
            .oneshot(json_post("/search", "alice", r#"{"search":"database"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["id"], "d1");
        assert!(body["items"][0].get("content").is_none());
    }

    #[tokio::test]
    async fn test_unknown_user_is_403() {
        let (app, _, _) = test_app().await;
        let resp = app
            .oneshot(json_post("/search", "nobody", "{}"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body = body_json(resp).await;
        assert_eq!(body["error"]["category"], "access");
    }

    #[tokio::test]
    async fn test_suggestions_short_query_is_empty_list() {
        let (app, _, _) = test_app().await;
        let resp = app
            .oneshot(json_post("/search/suggestions", "alice", r#"{"query":"d"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_unknown_recommendation_seed_is_404() {
        let (app, _, _) = test_app().await;
        let req = Request::builder()
            .method("GET")
            .uri("/recommendations?documentId=missing")
            .header("x-username", "alice")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_recommendations_return_page() {
        let (app, index, alice) = test_app().await;
        index.insert(indexed("d1", alice, "lecture notes"));

        let req = Request::builder()
            .method("GET")
            .uri("/recommendations")
            .header("x-username", "alice")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["total"], 1);
    }
}
