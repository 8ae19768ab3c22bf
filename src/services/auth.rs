//! Authentication service implementation
//!
//! Builds the per-request [`AuthContext`] from a user row and the configured
//! administrator ids.

use std::collections::HashSet;
use tracing::{debug, warn};
use crate::config::settings::Settings;
use crate::models::{AccountRole, User};

pub use crate::models::auth::{AuthContext, Permission};

/// Authentication service for building request contexts
#[derive(Clone)]
pub struct AuthService {
    settings: Settings,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    /// User row carries the administrator role or its id is configured as admin
    pub fn is_admin(&self, user: &User) -> bool {
        user.role == AccountRole::Administrator || self.settings.auth.admin_ids.contains(&user.id)
    }

    /// Build the authentication context for a user
    pub fn context_for(&self, user: &User) -> AuthContext {
        let is_admin = self.is_admin(user);
        let gated = self.settings.features.require_complete_profile && !user.profile_completed;

        let mut permissions = HashSet::new();
        if is_admin {
            // Administrators never take part in follow relationships
            permissions.extend([
                Permission::JoinGroups,
                Permission::SendMessages,
                Permission::Publish,
                Permission::ModerateContent,
                Permission::ManageAccounts,
            ]);
        } else if !gated {
            permissions.extend([
                Permission::Follow,
                Permission::JoinGroups,
                Permission::SendMessages,
                Permission::Publish,
            ]);
        } else {
            warn!(user_id = user.id, "Profile incomplete, mutations disabled");
        }

        let context = AuthContext {
            user_id: user.id,
            role: if is_admin { AccountRole::Administrator } else { user.role },
            is_admin,
            profile_completed: user.profile_completed,
            permissions,
        };

        debug!(user_id = user.id, permissions = ?context.permissions, "Authentication context created");
        context
    }
}
