//! Follow state machine

use crate::models::{AuthContext, FollowDecision, FollowStatus, Permission};
use crate::utils::errors::{SocialPlatformError, Result};

/// Store mutation produced by a follow toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowAction {
    /// No edge existed; insert one with this status
    Create(FollowStatus),
    /// Overwrite the status of the existing edge
    SetStatus(FollowStatus),
    /// Delete the existing edge (unfollow or cancel)
    Remove,
}

impl FollowAction {
    /// Status of the edge after the action is applied, `None` when no edge remains
    pub fn resulting_status(&self) -> Option<FollowStatus> {
        match self {
            FollowAction::Create(status) | FollowAction::SetStatus(status) => Some(*status),
            FollowAction::Remove => None,
        }
    }
}

/// Decide what a follow toggle does given the target's privacy and the current edge
pub fn toggle_transition(target_is_public: bool, existing: Option<FollowStatus>) -> FollowAction {
    use FollowStatus::*;

    match (target_is_public, existing) {
        (true, None) => FollowAction::Create(Accepted),
        (true, Some(Accepted)) => FollowAction::Remove,
        (true, Some(Pending)) | (true, Some(Rejected)) => FollowAction::SetStatus(Accepted),
        (false, None) => FollowAction::Create(Pending),
        (false, Some(Pending)) => FollowAction::Remove,
        (false, Some(Accepted)) => FollowAction::Remove,
        (false, Some(Rejected)) => FollowAction::SetStatus(Pending),
    }
}

/// Status a pending request moves to after the receiver decides
pub fn respond_transition(current: FollowStatus, decision: FollowDecision) -> Result<FollowStatus> {
    let next = match decision {
        FollowDecision::Accept => FollowStatus::Accepted,
        FollowDecision::Reject => FollowStatus::Rejected,
    };

    if current != FollowStatus::Pending {
        return Err(SocialPlatformError::InvalidStateTransition {
            from: current.to_string(),
            to: next.to_string(),
        });
    }

    Ok(next)
}

/// Checks shared by every follow mutation: no self-follow, no administrators on either side
pub fn check_participants(actor: &AuthContext, target_id: i64, target_is_admin: bool) -> Result<()> {
    if actor.user_id == target_id {
        return Err(SocialPlatformError::PermissionDenied(
            "Users cannot follow themselves".to_string(),
        ));
    }

    if actor.is_admin || target_is_admin {
        return Err(SocialPlatformError::PermissionDenied(
            "Administrators cannot take part in follow relationships".to_string(),
        ));
    }

    actor.require(Permission::Follow)
}
