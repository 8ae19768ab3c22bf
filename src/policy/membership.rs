//! Group membership gate

use serde::{Deserialize, Serialize};

use crate::models::{AuthContext, JoinDecision, MembershipRole};
use crate::utils::errors::{SocialPlatformError, Result};

/// Actions a user may take in a group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupPermissions {
    pub role: Option<MembershipRole>,
    pub can_join: bool,
    pub can_leave: bool,
    pub can_read_conversation: bool,
    pub can_manage_members: bool,
}

/// What happens to the group when a member departs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveOutcome {
    /// The sole Owner is leaving: the whole group goes
    DeleteGroup,
    /// Only the membership and conversation access are removed
    RemoveMember,
}

/// Role assigned to a user joining a group they hold no role in
pub fn join_role(is_admin: bool) -> MembershipRole {
    if is_admin {
        MembershipRole::Owner
    } else {
        MembershipRole::Pending
    }
}

pub fn grants_conversation_access(role: MembershipRole) -> bool {
    matches!(role, MembershipRole::Owner | MembershipRole::Member)
}

pub fn leave_outcome(role: MembershipRole, owner_count: usize) -> LeaveOutcome {
    if role == MembershipRole::Owner && owner_count <= 1 {
        LeaveOutcome::DeleteGroup
    } else {
        LeaveOutcome::RemoveMember
    }
}

/// Owner of the group or an administrator
pub fn can_manage_members(actor: &AuthContext, actor_role: Option<MembershipRole>) -> bool {
    actor.is_admin || actor_role == Some(MembershipRole::Owner)
}

/// Role a pending membership moves to, `None` when the row is deleted
pub fn pending_response(current: MembershipRole, decision: JoinDecision) -> Result<Option<MembershipRole>> {
    if current != MembershipRole::Pending {
        return Err(SocialPlatformError::InvalidStateTransition {
            from: current.to_string(),
            to: match decision {
                JoinDecision::Accept => MembershipRole::Member.to_string(),
                JoinDecision::Decline => "none".to_string(),
            },
        });
    }

    Ok(match decision {
        JoinDecision::Accept => Some(MembershipRole::Member),
        JoinDecision::Decline => None,
    })
}

pub fn permissions(role: Option<MembershipRole>, is_admin: bool) -> GroupPermissions {
    GroupPermissions {
        role,
        can_join: role.is_none(),
        can_leave: role.is_some(),
        can_read_conversation: role.map_or(false, grants_conversation_access),
        can_manage_members: is_admin || role == Some(MembershipRole::Owner),
    }
}
