//! Facet filtering and boosting.
//!
//! Each non-empty facet set is a hard filter AND a set of independent
//! per-term boosts at 1.0, so within the filtered results documents
//! matching more of the requested terms rank higher.

use biblio_query::{field, BoolQuery, QueryNode};

/// Facet values selected by a request. Empty sets contribute nothing.
#[derive(Debug, Clone, Default)]
pub struct FacetSelection {
    pub majors: Vec<String>,
    pub course_codes: Vec<String>,
    pub level: Option<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

impl FacetSelection {
    /// Returns `true` if no facet is selected.
    pub fn is_empty(&self) -> bool {
        self.majors.is_empty()
            && self.course_codes.is_empty()
            && self.level.as_deref().is_none_or(str::is_empty)
            && self.categories.is_empty()
            && self.tags.is_empty()
    }
}

/// Add facet filters and per-term boosts to `query`.
pub fn with_facet_filters(mut query: BoolQuery, facets: &FacetSelection) -> BoolQuery {
    query = add_facet(query, field::MAJORS, &facets.majors);
    query = add_facet(query, field::COURSE_CODES, &facets.course_codes);
    if let Some(level) = facets.level.as_deref().filter(|l| !l.is_empty()) {
        query = query
            .filter(QueryNode::term(field::COURSE_LEVEL, level))
            .should(QueryNode::term(field::COURSE_LEVEL, level).boost(1.0));
    }
    query = add_facet(query, field::CATEGORIES, &facets.categories);
    add_facet(query, field::TAGS, &facets.tags)
}

fn add_facet(mut query: BoolQuery, facet_field: &str, values: &[String]) -> BoolQuery {
    if values.is_empty() {
        return query;
    }
    query = query.filter(QueryNode::terms(facet_field, values.iter().cloned()));
    for value in values {
        query = query.should(QueryNode::term(facet_field, value.clone()).boost(1.0));
    }
    query
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_adds_nothing() {
        let query = with_facet_filters(BoolQuery::new(), &FacetSelection::default());
        assert!(query.filter.is_empty());
        assert!(query.should.is_empty());
    }

    #[test]
    fn test_each_facet_filters_and_boosts_per_term() {
        let facets = FacetSelection {
            majors: vec!["CS".into(), "Math".into()],
            level: Some("undergraduate".into()),
            tags: vec!["sql".into()],
            ..FacetSelection::default()
        };
        let query = with_facet_filters(BoolQuery::new(), &facets);
        // majors terms + level term + tags terms
        assert_eq!(query.filter.len(), 3);
        // one should per individual value
        assert_eq!(query.should.len(), 4);
    }

    #[test]
    fn test_blank_level_is_ignored() {
        let facets = FacetSelection {
            level: Some(String::new()),
            ..FacetSelection::default()
        };
        assert!(facets.is_empty());
        let query = with_facet_filters(BoolQuery::new(), &facets);
        assert!(query.filter.is_empty());
    }
}
