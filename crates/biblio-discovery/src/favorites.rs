//! Favorites-only filtering.
//!
//! Resolves the requester's favorite document ids (bounded to the most
//! recent) into an identity filter. An empty favorite set filters
//! everything out; a lookup failure degrades to the empty set. This filter
//! never fails open.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use biblio_core::Result;
use biblio_query::{BoolQuery, QueryNode};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Seam to favorite-marking storage.
#[async_trait]
pub trait FavoriteStore: Send + Sync {
    /// The user's favorite document ids, most recent first, at most `limit`.
    async fn recent_favorite_ids(&self, user_id: Uuid, limit: usize) -> Result<Vec<String>>;
}

/// Builds the favorites-only filter clause.
pub struct FavoriteFilter {
    store: Arc<dyn FavoriteStore>,
    max_ids: usize,
    batch_size: usize,
}

impl FavoriteFilter {
    pub fn new(store: Arc<dyn FavoriteStore>, max_ids: usize, batch_size: usize) -> Self {
        Self {
            store,
            max_ids,
            batch_size,
        }
    }

    /// The filter clause restricting hits to the user's favorites.
    ///
    /// Id lists beyond the backend's safe identity-filter size are split
    /// into fixed batches OR-combined with `minimum_should_match = 1`.
    pub async fn filter_clause(&self, user_id: Uuid) -> QueryNode {
        let ids = match self.store.recent_favorite_ids(user_id, self.max_ids).await {
            Ok(ids) => ids,
            Err(e) => {
                log::error!("Error retrieving favorite document ids for user {user_id}: {e}");
                Vec::new()
            }
        };

        // No favorites (or degraded lookup): match nothing.
        if ids.is_empty() {
            return QueryNode::ids(Vec::<String>::new()).into();
        }

        if ids.len() <= self.batch_size {
            return QueryNode::ids(ids).into();
        }

        let mut batches = BoolQuery::new();
        for chunk in ids.chunks(self.batch_size) {
            batches = batches.should(QueryNode::ids(chunk.iter().cloned()));
        }
        batches.minimum_should_match(1).into_node()
    }
}

/// In-memory favorite store for tests and demos.
#[derive(Default)]
pub struct MemoryFavoriteStore {
    inner: Arc<RwLock<HashMap<Uuid, Vec<String>>>>,
}

impl MemoryFavoriteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a document as the user's most recent favorite.
    pub async fn add(&self, user_id: Uuid, document_id: impl Into<String>) {
        let mut inner = self.inner.write().await;
        inner.entry(user_id).or_default().insert(0, document_id.into());
    }
}

#[async_trait]
impl FavoriteStore for MemoryFavoriteStore {
    async fn recent_favorite_ids(&self, user_id: Uuid, limit: usize) -> Result<Vec<String>> {
        let inner = self.inner.read().await;
        Ok(inner
            .get(&user_id)
            .map(|ids| ids.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::Error;

    struct FailingStore;

    #[async_trait]
    impl FavoriteStore for FailingStore {
        async fn recent_favorite_ids(&self, _user_id: Uuid, _limit: usize) -> Result<Vec<String>> {
            Err(Error::storage("favorites table unavailable"))
        }
    }

    fn ids_of(node: &QueryNode) -> &[String] {
        let QueryNode::Ids(q) = node else {
            panic!("expected ids clause, got {node:?}");
        };
        &q.values
    }

    #[tokio::test]
    async fn test_no_favorites_matches_nothing() {
        let filter = FavoriteFilter::new(Arc::new(MemoryFavoriteStore::new()), 1000, 1000);
        let clause = filter.filter_clause(Uuid::new_v4()).await;
        assert!(ids_of(&clause).is_empty());
    }

    #[tokio::test]
    async fn test_small_list_is_single_ids_clause() {
        let store = Arc::new(MemoryFavoriteStore::new());
        let user = Uuid::new_v4();
        store.add(user, "d1").await;
        store.add(user, "d2").await;

        let filter = FavoriteFilter::new(store, 1000, 1000);
        let clause = filter.filter_clause(user).await;
        assert_eq!(ids_of(&clause).len(), 2);
    }

    #[tokio::test]
    async fn test_large_list_batches_with_msm_one() {
        let store = Arc::new(MemoryFavoriteStore::new());
        let user = Uuid::new_v4();
        for i in 0..25 {
            store.add(user, format!("d{i}")).await;
        }

        // Small batch size to exercise the splitting path.
        let filter = FavoriteFilter::new(store, 1000, 10);
        let clause = filter.filter_clause(user).await;
        let QueryNode::Bool(batches) = clause else {
            panic!("expected batched bool");
        };
        assert_eq!(batches.should.len(), 3);
        assert_eq!(batches.minimum_should_match, Some(1));
    }

    #[tokio::test]
    async fn test_lookup_limit_is_respected() {
        let store = Arc::new(MemoryFavoriteStore::new());
        let user = Uuid::new_v4();
        for i in 0..30 {
            store.add(user, format!("d{i}")).await;
        }

        let filter = FavoriteFilter::new(store, 20, 1000);
        let clause = filter.filter_clause(user).await;
        assert_eq!(ids_of(&clause).len(), 20);
    }

    #[tokio::test]
    async fn test_store_error_degrades_to_match_nothing() {
        let filter = FavoriteFilter::new(Arc::new(FailingStore), 1000, 1000);
        let clause = filter.filter_clause(Uuid::new_v4()).await;
        assert!(ids_of(&clause).is_empty());
    }
}
