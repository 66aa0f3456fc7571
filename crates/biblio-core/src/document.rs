//! Read-only projection of an indexed document.
//!
//! The document and processing services own this data; the discovery core
//! only reads it. The struct maps one-to-one onto the fields stored in the
//! search index.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Document visibility mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharingType {
    /// Visible to the owner only.
    #[default]
    Private,
    /// Visible to everyone.
    Public,
    /// Visible to the owner plus an explicit allow-list.
    Specific,
}

/// Moderation state of a reported document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    /// A report exists but has not been reviewed.
    Pending,
    /// The report was reviewed and dismissed; the document stays visible.
    Resolved,
    /// The violation was confirmed; the document is hidden from discovery.
    Removed,
}

/// Coarse content-type classification of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// PDF files.
    Pdf,
    /// Word-processor documents.
    Word,
    /// Spreadsheets.
    Spreadsheet,
    /// Slide decks.
    Presentation,
    /// Plain text and markdown.
    Text,
    /// Anything else.
    Other,
}

/// A document as stored in the search index.
///
/// `content` is indexed and searchable but is stripped from every response
/// the discovery core produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexedDocument {
    /// Unique document identifier (index id).
    pub id: String,
    /// Original filename.
    pub filename: String,
    /// Extracted full text. Never returned to callers.
    pub content: String,
    /// Coarse content type.
    pub document_type: DocumentType,

    // Facet fields
    /// Academic majors the document belongs to.
    #[serde(default)]
    pub majors: HashSet<String>,
    /// Course codes the document belongs to.
    #[serde(default)]
    pub course_codes: HashSet<String>,
    /// Course level (e.g. "undergraduate").
    #[serde(default)]
    pub course_level: String,
    /// Content categories.
    #[serde(default)]
    pub categories: HashSet<String>,
    /// Free-form tags.
    #[serde(default)]
    pub tags: HashSet<String>,
    /// Key/value metadata extracted by the content pipeline.
    #[serde(default)]
    pub extracted_metadata: HashMap<String, String>,

    /// Detected document language code.
    #[serde(default)]
    pub language: String,

    // Ownership and sharing
    /// Owner user id.
    pub user_id: Uuid,
    /// Visibility mode.
    #[serde(default)]
    pub sharing_type: SharingType,
    /// Allow-list for [`SharingType::Specific`].
    #[serde(default)]
    pub shared_with: HashSet<Uuid>,

    // Popularity signals
    /// Number of recommendations. Only ever raises relevance.
    #[serde(default)]
    pub recommendation_count: u64,
    /// Number of favorites. Only ever raises relevance.
    #[serde(default)]
    pub favorite_count: u64,

    // Lifecycle
    /// Moderation state, if the document was ever reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_status: Option<ReportStatus>,
    /// Processing status string (e.g. "completed").
    #[serde(default)]
    pub status: String,
    /// Soft-delete flag. Deleted documents are never returned.
    #[serde(default)]
    pub deleted: bool,
    /// Storage metadata.
    #[serde(default)]
    pub file_size: u64,
    /// MIME type.
    #[serde(default)]
    pub mime_type: String,
    /// Current version number.
    #[serde(default)]
    pub current_version: u32,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last-update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl IndexedDocument {
    /// Returns `true` if `user_id` may see this document under its sharing
    /// rules (ownership, public, or allow-list). Deletion and report status
    /// are separate concerns handled by the access filter.
    pub fn visible_to(&self, user_id: &Uuid) -> bool {
        if &self.user_id == user_id {
            return true;
        }
        match self.sharing_type {
            SharingType::Public => true,
            SharingType::Private => false,
            SharingType::Specific => self.shared_with.contains(user_id),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(sharing: SharingType, owner: Uuid) -> IndexedDocument {
        IndexedDocument {
            id: "d1".into(),
            filename: "notes.pdf".into(),
            content: String::new(),
            document_type: DocumentType::Pdf,
            majors: HashSet::new(),
            course_codes: HashSet::new(),
            course_level: String::new(),
            categories: HashSet::new(),
            tags: HashSet::new(),
            extracted_metadata: HashMap::new(),
            language: "en".into(),
            user_id: owner,
            sharing_type: sharing,
            shared_with: HashSet::new(),
            recommendation_count: 0,
            favorite_count: 0,
            report_status: None,
            status: "completed".into(),
            deleted: false,
            file_size: 0,
            mime_type: "application/pdf".into(),
            current_version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_owner_always_visible() {
        let owner = Uuid::new_v4();
        let d = doc(SharingType::Private, owner);
        assert!(d.visible_to(&owner));
        assert!(!d.visible_to(&Uuid::new_v4()));
    }

    #[test]
    fn test_public_visible_to_all() {
        let d = doc(SharingType::Public, Uuid::new_v4());
        assert!(d.visible_to(&Uuid::new_v4()));
    }

    #[test]
    fn test_specific_respects_allow_list() {
        let reader = Uuid::new_v4();
        let mut d = doc(SharingType::Specific, Uuid::new_v4());
        assert!(!d.visible_to(&reader));
        d.shared_with.insert(reader);
        assert!(d.visible_to(&reader));
    }

    #[test]
    fn test_sharing_type_serialization() {
        let json = serde_json::to_string(&SharingType::Specific).unwrap();
        assert_eq!(json, "\"specific\"");
        let st: SharingType = serde_json::from_str("\"public\"").unwrap();
        assert_eq!(st, SharingType::Public);
    }
}
