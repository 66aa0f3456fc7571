//! Mandatory access filtering.
//!
//! Every discovery query carries this filter; there is no identity-less
//! path. Deleted documents are always excluded, documents with a confirmed
//! violation (`report_status == removed`) are hidden, and non-admin
//! requesters are narrowed to documents they own, public documents, or
//! documents explicitly shared with them. A dismissed report (`resolved`)
//! leaves the document visible.

use biblio_core::UserAccount;
use biblio_query::{field, BoolQuery, QueryNode};

/// Add the sharing access filter to `query`.
pub fn with_access_filter(query: BoolQuery, user: &UserAccount) -> BoolQuery {
    let mut sharing = BoolQuery::new().must_not(QueryNode::term(field::REPORT_STATUS, "removed"));

    if !user.role.is_admin() {
        let user_id = user.user_id.to_string();
        sharing = sharing
            .should(QueryNode::term(field::USER_ID, user_id.clone()))
            .should(QueryNode::term(field::SHARING_TYPE, "public"))
            .should(
                BoolQuery::new()
                    .must(QueryNode::term(field::SHARING_TYPE, "specific"))
                    .must(QueryNode::terms(field::SHARED_WITH, [user_id])),
            )
            .minimum_should_match(1);
    }

    query
        .filter(QueryNode::term(field::DELETED, "false"))
        .filter(sharing.into_node())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::AppRole;
    use uuid::Uuid;

    fn user(role: AppRole) -> UserAccount {
        UserAccount {
            user_id: Uuid::new_v4(),
            username: "reader".into(),
            role,
        }
    }

    #[test]
    fn test_non_admin_gets_sharing_narrowing() {
        let query = with_access_filter(BoolQuery::new(), &user(AppRole::User));
        assert_eq!(query.filter.len(), 2);
        let QueryNode::Bool(sharing) = &query.filter[1] else {
            panic!("expected sharing bool");
        };
        assert_eq!(sharing.should.len(), 3);
        assert_eq!(sharing.minimum_should_match, Some(1));
        assert_eq!(sharing.must_not.len(), 1);
    }

    #[test]
    fn test_admin_skips_narrowing_but_keeps_exclusions() {
        let query = with_access_filter(BoolQuery::new(), &user(AppRole::Admin));
        let QueryNode::Bool(sharing) = &query.filter[1] else {
            panic!("expected sharing bool");
        };
        assert!(sharing.should.is_empty());
        assert!(sharing.minimum_should_match.is_none());
        assert_eq!(sharing.must_not.len(), 1);
    }
}
