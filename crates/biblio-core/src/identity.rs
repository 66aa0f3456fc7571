//! Requester identity and the identity-lookup seam.
//!
//! Every discovery operation runs on behalf of an authenticated principal.
//! The [`IdentityProvider`] trait abstracts the upstream user service that
//! resolves a username to `{user_id, role}`. A missing identity is a fatal
//! precondition for search: no filter can be built without one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::Result;

/// Application role of a requester.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppRole {
    /// Administrators see every non-deleted document.
    Admin,
    /// Moderators handle reports; for discovery they rank as regular users.
    Moderator,
    /// Regular users see owned, public, and explicitly shared documents.
    User,
}

impl AppRole {
    /// Returns `true` if this role bypasses ownership/sharing narrowing.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// A resolved requester identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    /// Stable user identifier.
    pub user_id: Uuid,
    /// Login name the identity was resolved from.
    pub username: String,
    /// Application role.
    pub role: AppRole,
}

/// Seam to the upstream identity service.
///
/// Implementations typically wrap an HTTP client to the user service.
/// The in-memory implementation below backs tests and demos.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a username to an account, or `None` if unknown.
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>>;
}

/// In-memory identity provider.
#[derive(Default)]
pub struct MemoryIdentityProvider {
    accounts: Arc<RwLock<HashMap<String, UserAccount>>>,
}

impl MemoryIdentityProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account, replacing any existing one for the username.
    pub async fn register(&self, account: UserAccount) {
        self.accounts
            .write()
            .await
            .insert(account.username.clone(), account);
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentityProvider {
    async fn find_by_username(&self, username: &str) -> Result<Option<UserAccount>> {
        Ok(self.accounts.read().await.get(username).cloned())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn account(username: &str, role: AppRole) -> UserAccount {
        UserAccount {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            role,
        }
    }

    #[test]
    fn test_role_admin_check() {
        assert!(AppRole::Admin.is_admin());
        assert!(!AppRole::Moderator.is_admin());
        assert!(!AppRole::User.is_admin());
    }

    #[test]
    fn test_role_serialization() {
        let json = serde_json::to_string(&AppRole::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
        let role: AppRole = serde_json::from_str("\"user\"").unwrap();
        assert_eq!(role, AppRole::User);
    }

    #[tokio::test]
    async fn test_memory_provider_lookup() {
        let provider = MemoryIdentityProvider::new();
        provider.register(account("alice", AppRole::User)).await;

        let found = provider.find_by_username("alice").await.unwrap();
        assert_eq!(found.unwrap().username, "alice");

        let missing = provider.find_by_username("bob").await.unwrap();
        assert!(missing.is_none());
    }
}
