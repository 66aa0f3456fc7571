//! Request and response DTOs for the discovery operations.

use std::collections::HashSet;

use biblio_core::DocumentType;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::facets::FacetSelection;

/// Body of a search request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchRequest {
    /// Free-text query. Absent or blank means filter-only browsing.
    pub search: Option<String>,
    pub majors: Vec<String>,
    pub course_codes: Vec<String>,
    pub level: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    /// Restrict to the requester's favorites.
    pub favorite_only: bool,
    /// Explicit sort field; empty means relevance ordering.
    pub sort_field: Option<String>,
    /// `asc` or `desc` (default).
    pub sort_direction: Option<String>,
    /// Zero-based page number.
    pub page: i64,
    /// Page size; non-positive defaults to 10.
    pub size: i64,
}

impl SearchRequest {
    /// Facet values carried by this request.
    pub fn facets(&self) -> FacetSelection {
        FacetSelection {
            majors: self.majors.clone(),
            course_codes: self.course_codes.clone(),
            level: self.level.clone(),
            categories: self.categories.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Body of a typeahead suggestion request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SuggestionRequest {
    pub query: String,
    pub majors: Vec<String>,
    pub course_codes: Vec<String>,
    pub level: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl SuggestionRequest {
    /// Facet values carried by this request.
    pub fn facets(&self) -> FacetSelection {
        FacetSelection {
            majors: self.majors.clone(),
            course_codes: self.course_codes.clone(),
            level: self.level.clone(),
            categories: self.categories.clone(),
            tags: self.tags.clone(),
        }
    }
}

/// Query parameters of a recommendation request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecommendationParams {
    /// Seed document for content-based recommendations; absent means
    /// preference-only.
    pub document_id: Option<String>,
    /// Restrict to the requester's favorites (preference-only mode).
    pub favorite_only: bool,
    pub page: i64,
    pub size: i64,
}

/// A document as returned to callers. Never carries extracted content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub id: String,
    pub status: String,
    pub filename: String,
    pub document_type: DocumentType,
    pub majors: HashSet<String>,
    pub course_codes: HashSet<String>,
    pub course_level: String,
    pub categories: HashSet<String>,
    pub tags: HashSet<String>,
    pub file_size: u64,
    pub mime_type: String,
    pub language: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_version: u32,
    /// Tagged highlight fragments, filename fragments first.
    pub highlights: Vec<String>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_request_camel_case_round_trip() {
        let json = r#"{
            "search": "database",
            "courseCodes": ["CS101"],
            "favoriteOnly": true,
            "sortField": "createdAt",
            "page": 1,
            "size": 20
        }"#;
        let request: SearchRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.search.as_deref(), Some("database"));
        assert_eq!(request.course_codes, vec!["CS101"]);
        assert!(request.favorite_only);
        assert_eq!(request.size, 20);
    }

    #[test]
    fn test_search_request_defaults() {
        let request: SearchRequest = serde_json::from_str("{}").unwrap();
        assert!(request.search.is_none());
        assert!(!request.favorite_only);
        assert_eq!(request.page, 0);
        assert_eq!(request.size, 0);
    }

    #[test]
    fn test_facet_extraction() {
        let request = SearchRequest {
            majors: vec!["CS".into()],
            level: Some("graduate".into()),
            ..SearchRequest::default()
        };
        let facets = request.facets();
        assert_eq!(facets.majors, vec!["CS"]);
        assert_eq!(facets.level.as_deref(), Some("graduate"));
        assert!(facets.tags.is_empty());
    }
}
