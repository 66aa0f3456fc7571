//! The search executor seam.
//!
//! Everything above this trait is engine-agnostic. Production wires an
//! adapter for the external inverted-index engine; tests and small
//! deployments use [`crate::MemoryIndex`].

use std::collections::HashMap;

use async_trait::async_trait;
use biblio_core::{IndexedDocument, Result};

use crate::plan::SearchPlan;

/// One scored hit.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// Document id.
    pub id: String,
    /// Relevance score under the plan's query.
    pub score: f32,
    /// The stored document.
    pub document: IndexedDocument,
    /// Highlight fragments keyed by field path. Empty when the plan
    /// requested no highlighting.
    pub highlights: HashMap<String, Vec<String>>,
}

/// One page of hits plus the total match count.
#[derive(Debug, Clone)]
pub struct SearchHits {
    /// Hits on the requested page, in plan order.
    pub hits: Vec<SearchHit>,
    /// Total matches across all pages.
    pub total: u64,
}

impl SearchHits {
    /// An empty result set.
    pub fn empty() -> Self {
        Self {
            hits: Vec::new(),
            total: 0,
        }
    }
}

/// Executes search plans against some document index.
#[async_trait]
pub trait SearchExecutor: Send + Sync {
    /// Execute a plan and return the requested page of hits.
    async fn execute(&self, plan: &SearchPlan) -> Result<SearchHits>;

    /// Fetch a single document by id, bypassing scoring and access rules.
    async fn fetch(&self, id: &str) -> Result<Option<IndexedDocument>>;
}
