//! Per-user document preferences and the preference store seam.
//!
//! Preferences carry two kinds of personalization signal:
//!
//! - **Explicit**: sets of preferred majors, course codes, levels,
//!   categories, tags, and languages, plus per-content-type weights.
//! - **Implicit**: interaction counters aggregated per category / major /
//!   level / tag, and a bounded set of recently viewed documents.
//!
//! A preference document is created lazily on first personalization read.
//! Concurrent first access by the same user may create twice; deduplication
//! is a storage-layer concern, not ranking logic.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

/// Upper bound on the recently-viewed set.
pub const MAX_RECENT_VIEWS: usize = 50;

/// Per-user personalization state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPreferences {
    /// Owning user.
    pub user_id: Uuid,

    /// Explicitly preferred majors.
    #[serde(default)]
    pub preferred_majors: HashSet<String>,
    /// Explicitly preferred course codes.
    #[serde(default)]
    pub preferred_course_codes: HashSet<String>,
    /// Explicitly preferred course levels.
    #[serde(default)]
    pub preferred_levels: HashSet<String>,
    /// Explicitly preferred categories.
    #[serde(default)]
    pub preferred_categories: HashSet<String>,
    /// Explicitly preferred tags.
    #[serde(default)]
    pub preferred_tags: HashSet<String>,
    /// Preferred document languages.
    #[serde(default)]
    pub language_preferences: HashSet<String>,

    /// Weight per content type, each in [0, 1].
    #[serde(default)]
    pub content_type_weights: HashMap<String, f64>,

    /// Interaction counters, monotonically incremented, never reset.
    #[serde(default)]
    pub category_interaction_counts: HashMap<String, u32>,
    /// Per-major interaction counters.
    #[serde(default)]
    pub major_interaction_counts: HashMap<String, u32>,
    /// Per-level interaction counters.
    #[serde(default)]
    pub level_interaction_counts: HashMap<String, u32>,
    /// Per-tag interaction counters.
    #[serde(default)]
    pub tag_interaction_counts: HashMap<String, u32>,

    /// Recently viewed document ids, bounded to [`MAX_RECENT_VIEWS`].
    #[serde(default)]
    pub recent_viewed_documents: HashSet<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl DocumentPreferences {
    /// Create an empty preference document for a user.
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            preferred_majors: HashSet::new(),
            preferred_course_codes: HashSet::new(),
            preferred_levels: HashSet::new(),
            preferred_categories: HashSet::new(),
            preferred_tags: HashSet::new(),
            language_preferences: HashSet::new(),
            content_type_weights: HashMap::new(),
            category_interaction_counts: HashMap::new(),
            major_interaction_counts: HashMap::new(),
            level_interaction_counts: HashMap::new(),
            tag_interaction_counts: HashMap::new(),
            recent_viewed_documents: HashSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a document view in the bounded recent set.
    ///
    /// When the set is full an arbitrary entry is evicted; the set is a
    /// ranking signal, not a history log.
    pub fn record_view(&mut self, document_id: &str) {
        if self.recent_viewed_documents.len() >= MAX_RECENT_VIEWS
            && !self.recent_viewed_documents.contains(document_id)
        {
            if let Some(evict) = self.recent_viewed_documents.iter().next().cloned() {
                self.recent_viewed_documents.remove(&evict);
            }
        }
        self.recent_viewed_documents.insert(document_id.to_string());
        self.updated_at = Utc::now();
    }

    /// Returns `true` if no personalization signal is present at all.
    pub fn is_blank(&self) -> bool {
        self.preferred_majors.is_empty()
            && self.preferred_course_codes.is_empty()
            && self.preferred_levels.is_empty()
            && self.preferred_categories.is_empty()
            && self.preferred_tags.is_empty()
            && self.language_preferences.is_empty()
            && self.content_type_weights.is_empty()
            && self.category_interaction_counts.is_empty()
            && self.major_interaction_counts.is_empty()
            && self.level_interaction_counts.is_empty()
            && self.tag_interaction_counts.is_empty()
            && self.recent_viewed_documents.is_empty()
    }
}

/// Seam to the preference storage.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Look up preferences for a user.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DocumentPreferences>>;

    /// Persist preferences, replacing any existing document.
    async fn save(&self, prefs: DocumentPreferences) -> Result<DocumentPreferences>;

    /// Get the user's preferences, creating an empty document if absent.
    ///
    /// At-least-once creation: a concurrent first read may save twice.
    async fn get_or_create(&self, user_id: Uuid) -> Result<DocumentPreferences> {
        match self.find_by_user(user_id).await? {
            Some(prefs) => Ok(prefs),
            None => {
                log::debug!("Creating default preferences for user {user_id}");
                self.save(DocumentPreferences::new(user_id)).await
            }
        }
    }
}

/// In-memory preference store for tests and demos.
#[derive(Default)]
pub struct MemoryPreferenceStore {
    inner: Arc<RwLock<HashMap<Uuid, DocumentPreferences>>>,
}

impl MemoryPreferenceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PreferenceStore for MemoryPreferenceStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<DocumentPreferences>> {
        Ok(self.inner.read().await.get(&user_id).cloned())
    }

    async fn save(&self, prefs: DocumentPreferences) -> Result<DocumentPreferences> {
        self.inner
            .write()
            .await
            .insert(prefs.user_id, prefs.clone());
        Ok(prefs)
    }
}

// ============================================================================
// Tests
// ============================================================================
