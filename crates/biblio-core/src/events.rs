//! Fire-and-forget side-effect queue.
//!
//! Discovery operations record side effects (search history, view events)
//! that must never block or fail the response. Effects flow through an
//! unbounded channel to a consumer task; delivery is best-effort and
//! at-most-once, with no retry. A dropped effect is logged and forgotten.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

/// An outbound side effect emitted by the discovery core.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SideEffect {
    /// A search was served.
    SearchLogged {
        /// Requester.
        user_id: Uuid,
        /// Query text as submitted.
        query: String,
        /// Total hits returned by the backend.
        total_hits: u64,
        /// When the search completed.
        at: DateTime<Utc>,
    },
    /// Recommendations were served.
    RecommendationLogged {
        /// Requester.
        user_id: Uuid,
        /// Seed document, when in seeded mode.
        seed_document_id: Option<String>,
        /// When the recommendation completed.
        at: DateTime<Utc>,
    },
}

/// Publishing handle for side effects. Cheap to clone.
#[derive(Clone)]
pub struct EffectQueue {
    tx: Option<mpsc::UnboundedSender<SideEffect>>,
}

impl EffectQueue {
    /// Create a queue and its consumer end.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SideEffect>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// A queue that silently drops everything (tests, tools).
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Publish an effect. Never blocks, never errors.
    pub fn publish(&self, effect: SideEffect) {
        let Some(tx) = &self.tx else {
            return;
        };
        if let Err(e) = tx.send(effect) {
            // Consumer is gone; the effect is lost by contract.
            log::debug!("Side effect dropped: {e}");
        }
    }
}

/// Spawn a consumer that logs each effect.
///
/// Production deployments replace this with a broker publisher; the
/// contract (best-effort, failures logged only) stays the same.
pub fn spawn_effect_logger(mut rx: mpsc::UnboundedReceiver<SideEffect>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(effect) = rx.recv().await {
            match &effect {
                SideEffect::SearchLogged {
                    user_id,
                    query,
                    total_hits,
                    ..
                } => {
                    log::info!("search history: user={user_id} query={query:?} hits={total_hits}");
                }
                SideEffect::RecommendationLogged {
                    user_id,
                    seed_document_id,
                    ..
                } => {
                    log::info!(
                        "recommendation history: user={user_id} seed={seed_document_id:?}"
                    );
                }
            }
        }
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn search_effect() -> SideEffect {
        SideEffect::SearchLogged {
            user_id: Uuid::new_v4(),
            query: "database".to_string(),
            total_hits: 3,
            at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_and_receive() {
        let (queue, mut rx) = EffectQueue::new();
        queue.publish(search_effect());

        let received = rx.recv().await.unwrap();
        assert!(matches!(received, SideEffect::SearchLogged { total_hits: 3, .. }));
    }

    #[tokio::test]
    async fn test_publish_after_consumer_dropped_does_not_panic() {
        let (queue, rx) = EffectQueue::new();
        drop(rx);
        queue.publish(search_effect());
    }

    #[test]
    fn test_disabled_queue_drops_silently() {
        let queue = EffectQueue::disabled();
        queue.publish(search_effect());
    }

    #[test]
    fn test_effect_serialization_tagged() {
        let json = serde_json::to_string(&search_effect()).unwrap();
        assert!(json.contains("\"kind\":\"search_logged\""));
    }
}
