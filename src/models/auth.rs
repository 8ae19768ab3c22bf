//! Request actor model
//!
//! The [`AuthContext`] is what every mutation entry point and policy decision
//! receives to answer account-level permission checks.

use std::collections::HashSet;

use crate::models::AccountRole;
use crate::utils::errors::{SocialPlatformError, Result};

/// Account-level permissions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Send, accept and reject follow requests
    Follow,
    /// Create, join and manage groups
    JoinGroups,
    /// Start conversations and send messages
    SendMessages,
    /// Create posts and comments
    Publish,
    /// Remove other users' posts and comments
    ModerateContent,
    /// Delete other users' accounts, act as owner of any group
    ManageAccounts,
}

/// Authentication context for the user performing a request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: i64,
    pub role: AccountRole,
    pub is_admin: bool,
    pub profile_completed: bool,
    pub permissions: HashSet<Permission>,
}

impl AuthContext {
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions.contains(&permission)
    }

    /// Require a permission or return `PermissionDenied`
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.has_permission(permission) {
            return Ok(());
        }

        let reason = if !self.is_admin && !self.profile_completed {
            format!("User {} must complete their profile first", self.user_id)
        } else {
            format!("User {} lacks required permission: {:?}", self.user_id, permission)
        };
        Err(SocialPlatformError::PermissionDenied(reason))
    }

    /// Actor is the given user or an administrator
    pub fn is_self_or_admin(&self, user_id: i64) -> bool {
        self.is_admin || self.user_id == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(is_admin: bool, profile_completed: bool, permissions: &[Permission]) -> AuthContext {
        AuthContext {
            user_id: 3,
            role: if is_admin { AccountRole::Administrator } else { AccountRole::RegisteredUser },
            is_admin,
            profile_completed,
            permissions: permissions.iter().copied().collect(),
        }
    }

    #[test]
    fn test_require_explains_profile_gate() {
        let gated = context(false, false, &[]);
        let err = gated.require(Permission::SendMessages).unwrap_err();
        assert!(err.to_string().contains("must complete their profile first"));

        let admin = context(true, false, &[Permission::Publish]);
        let err = admin.require(Permission::Follow).unwrap_err();
        assert!(err.to_string().contains("lacks required permission"));
        assert!(admin.require(Permission::Publish).is_ok());
    }

    #[test]
    fn test_is_self_or_admin() {
        assert!(context(false, true, &[]).is_self_or_admin(3));
        assert!(!context(false, true, &[]).is_self_or_admin(4));
        assert!(context(true, true, &[]).is_self_or_admin(4));
    }
}
