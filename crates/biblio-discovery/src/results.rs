//! Hit-to-response mapping.
//!
//! Strips `content`, orders highlight fragments (filename first for search
//! pages, content first for suggestions), and deduplicates them.

use biblio_core::{Page, PageRequest};
use biblio_query::backend::{SearchHit, SearchHits};
use biblio_query::field;

use crate::request::DocumentResponse;

/// Map a page of hits into response DTOs.
pub fn to_document_page(hits: SearchHits, page: PageRequest) -> Page<DocumentResponse> {
    let items = hits.hits.into_iter().map(to_response).collect();
    Page::new(items, hits.total, page)
}

fn to_response(hit: SearchHit) -> DocumentResponse {
    let mut highlights = Vec::new();
    for highlight_field in [field::FILENAME, field::CONTENT] {
        if let Some(fragments) = hit.highlights.get(highlight_field) {
            for fragment in fragments {
                if !highlights.contains(fragment) {
                    highlights.push(fragment.clone());
                }
            }
        }
    }

    let doc = hit.document;
    DocumentResponse {
        id: hit.id,
        status: doc.status,
        filename: doc.filename,
        document_type: doc.document_type,
        majors: doc.majors,
        course_codes: doc.course_codes,
        course_level: doc.course_level,
        categories: doc.categories,
        tags: doc.tags,
        file_size: doc.file_size,
        mime_type: doc.mime_type,
        language: doc.language,
        user_id: doc.user_id.to_string(),
        created_at: doc.created_at,
        updated_at: doc.updated_at,
        current_version: doc.current_version,
        highlights,
    }
}

/// Collapse hits into suggestion strings: distinct content fragments first,
/// then distinct filename fragments for the remaining slots, capped at
/// `max_suggestions`.
pub fn to_suggestions(hits: &SearchHits, max_suggestions: usize) -> Vec<String> {
    let mut content_fragments: Vec<String> = Vec::new();
    let mut filename_fragments: Vec<String> = Vec::new();

    for hit in &hits.hits {
        if let Some(fragments) = hit.highlights.get(field::CONTENT) {
            for fragment in fragments {
                if !content_fragments.contains(fragment) {
                    content_fragments.push(fragment.clone());
                }
            }
        }
        if let Some(fragments) = hit.highlights.get(field::FILENAME) {
            for fragment in fragments {
                if !filename_fragments.contains(fragment) {
                    filename_fragments.push(fragment.clone());
                }
            }
        }
    }

    let mut suggestions = content_fragments;
    for fragment in filename_fragments {
        if suggestions.len() >= max_suggestions {
            break;
        }
        if !suggestions.contains(&fragment) {
            suggestions.push(fragment);
        }
    }
    suggestions.truncate(max_suggestions);
    suggestions
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::{DocumentType, IndexedDocument, SharingType};
    use chrono::Utc;
    use std::collections::{HashMap, HashSet};
    use uuid::Uuid;

    fn hit(id: &str, highlights: HashMap<String, Vec<String>>) -> SearchHit {
        SearchHit {
            id: id.into(),
            score: 1.0,
            highlights,
            document: IndexedDocument {
                id: id.into(),
                filename: format!("{id}.pdf"),
                content: "full extracted text".into(),
                document_type: DocumentType::Pdf,
                majors: HashSet::new(),
                course_codes: HashSet::new(),
                course_level: String::new(),
                categories: HashSet::new(),
                tags: HashSet::new(),
                extracted_metadata: HashMap::new(),
                language: "en".into(),
                user_id: Uuid::new_v4(),
                sharing_type: SharingType::Public,
                shared_with: HashSet::new(),
                recommendation_count: 0,
                favorite_count: 0,
                report_status: None,
                status: "completed".into(),
                deleted: false,
                file_size: 10,
                mime_type: "application/pdf".into(),
                current_version: 1,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
        }
    }

    #[test]
    fn test_response_never_carries_content() {
        let page = to_document_page(
            SearchHits {
                hits: vec![hit("d1", HashMap::new())],
                total: 1,
            },
            PageRequest::default(),
        );
        let json = serde_json::to_string(&page.items[0]).unwrap();
        assert!(!json.contains("full extracted text"));
        assert!(json.contains("\"filename\":\"d1.pdf\""));
    }

    #[test]
    fn test_highlights_filename_first_deduplicated() {
        let mut highlights = HashMap::new();
        highlights.insert(
            field::CONTENT.to_string(),
            vec!["<b>db</b> intro".to_string(), "<b>db</b> intro".to_string()],
        );
        highlights.insert(field::FILENAME.to_string(), vec!["<b>db</b>.pdf".to_string()]);

        let page = to_document_page(
            SearchHits {
                hits: vec![hit("d1", highlights)],
                total: 1,
            },
            PageRequest::default(),
        );
        assert_eq!(
            page.items[0].highlights,
            vec!["<b>db</b>.pdf".to_string(), "<b>db</b> intro".to_string()]
        );
    }

    #[test]
    fn test_suggestions_content_first_then_filename_capped() {
        let mut hits = Vec::new();
        for i in 0..8 {
            let mut highlights = HashMap::new();
            highlights.insert(field::CONTENT.to_string(), vec![format!("content {i}")]);
            highlights.insert(field::FILENAME.to_string(), vec![format!("file {i}")]);
            hits.push(hit(&format!("d{i}"), highlights));
        }
        let hits = SearchHits { total: 8, hits };

        let suggestions = to_suggestions(&hits, 10);
        assert_eq!(suggestions.len(), 10);
        assert!(suggestions[..8].iter().all(|s| s.starts_with("content")));
        assert!(suggestions[8..].iter().all(|s| s.starts_with("file")));
    }

    #[test]
    fn test_suggestions_deduplicate() {
        let mut highlights = HashMap::new();
        highlights.insert(field::CONTENT.to_string(), vec!["same".to_string()]);
        let hits = SearchHits {
            hits: vec![hit("d1", highlights.clone()), hit("d2", highlights)],
            total: 2,
        };
        assert_eq!(to_suggestions(&hits, 10), vec!["same".to_string()]);
    }
}
