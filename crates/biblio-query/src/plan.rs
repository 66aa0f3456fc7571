//! Executable search plans.
//!
//! A [`SearchPlan`] bundles everything an executor needs for one request:
//! the query tree, a minimum-score floor, sort and highlight specs, and
//! pagination. Executors must honor the plan exactly; ranking policy lives
//! entirely in the plan builder, never in the executor.

use biblio_core::PageRequest;
use serde::{Deserialize, Serialize};

use crate::ast::QueryNode;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// One sort criterion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SortSpec {
    /// Field path to sort on. `_score` sorts on relevance.
    pub field: String,
    /// Direction.
    pub order: SortOrder,
}

impl SortSpec {
    /// Sort on `field` in the given direction.
    pub fn new(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: field.into(),
            order,
        }
    }

    /// Relevance, highest first.
    pub fn score_desc() -> Self {
        Self::new("_score", SortOrder::Desc)
    }
}

/// One field to extract highlight fragments from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightField {
    /// Field path.
    pub field: String,
    /// Approximate fragment length in characters.
    pub fragment_size: usize,
    /// Maximum fragments to return for this field.
    pub number_of_fragments: usize,
}

impl HighlightField {
    /// Highlight `field` with the given fragment shape.
    pub fn new(field: impl Into<String>, fragment_size: usize, number_of_fragments: usize) -> Self {
        Self {
            field: field.into(),
            fragment_size,
            number_of_fragments,
        }
    }
}

/// Highlighting instructions for a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighlightSpec {
    /// Opening tag wrapped around matched terms.
    pub pre_tag: String,
    /// Closing tag wrapped around matched terms.
    pub post_tag: String,
    /// Fields to highlight.
    pub fields: Vec<HighlightField>,
}

impl HighlightSpec {
    /// Highlight spec with the given tag pair.
    pub fn new(pre_tag: impl Into<String>, post_tag: impl Into<String>) -> Self {
        Self {
            pre_tag: pre_tag.into(),
            post_tag: post_tag.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to highlight.
    pub fn field(mut self, field: HighlightField) -> Self {
        self.fields.push(field);
        self
    }
}

/// A complete, executor-ready search request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPlan {
    /// The query tree.
    pub query: QueryNode,
    /// Hits scoring below this floor are discarded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f32>,
    /// Sort criteria, applied in order. Empty means relevance then recency.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort: Vec<SortSpec>,
    /// Highlighting instructions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<HighlightSpec>,
    /// Page to return.
    #[serde(default)]
    pub page: PageRequest,
}

impl SearchPlan {
    /// Plan for `query` with default paging and no floor.
    pub fn new(query: impl Into<QueryNode>) -> Self {
        Self {
            query: query.into(),
            min_score: None,
            sort: Vec::new(),
            highlight: None,
            page: PageRequest::default(),
        }
    }

    /// Set the minimum-score floor.
    pub fn min_score(mut self, floor: f32) -> Self {
        self.min_score = Some(floor);
        self
    }

    /// Append a sort criterion.
    pub fn sort(mut self, spec: SortSpec) -> Self {
        self.sort.push(spec);
        self
    }

    /// Set the highlight spec.
    pub fn highlight(mut self, spec: HighlightSpec) -> Self {
        self.highlight = Some(spec);
        self
    }

    /// Set the page.
    pub fn page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{field, QueryNode};

    #[test]
    fn test_plan_builder() {
        let plan = SearchPlan::new(QueryNode::match_(field::CONTENT, "graph"))
            .min_score(3.6)
            .sort(SortSpec::new(field::FILENAME_LOWERCASE, SortOrder::Asc))
            .sort(SortSpec::score_desc())
            .page(PageRequest::of(1, 20));

        assert_eq!(plan.min_score, Some(3.6));
        assert_eq!(plan.sort.len(), 2);
        assert_eq!(plan.sort[0].field, field::FILENAME_LOWERCASE);
        assert_eq!(plan.page.offset(), 20);
    }

    #[test]
    fn test_highlight_spec_builder() {
        let spec = HighlightSpec::new("<em><b>", "</b></em>")
            .field(HighlightField::new(field::CONTENT, 200, 1))
            .field(HighlightField::new(field::FILENAME, 60, 1));

        assert_eq!(spec.fields.len(), 2);
        assert_eq!(spec.fields[0].fragment_size, 200);
        assert_eq!(spec.post_tag, "</b></em>");
    }
}
