//! Profile visibility resolution

use serde::{Deserialize, Serialize};

use crate::models::{AuthContext, FollowRequest, FollowStatus, User};

/// What a viewer may see of a target profile, and how they are related
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileVisibility {
    pub can_view_full_profile: bool,
    pub i_follow: bool,
    pub follows_me: bool,
    pub request_pending: bool,
}

/// Resolve what `viewer` may see of `target`.
///
/// `edges` are follow requests touching the target; edges between other users
/// are ignored. An anonymous viewer only sees public profiles. When either
/// party is an administrator the follow flags are all false.
pub fn resolve_visibility(
    viewer: Option<&AuthContext>,
    target: &User,
    target_is_admin: bool,
    edges: &[FollowRequest],
) -> ProfileVisibility {
    let viewer = match viewer {
        Some(viewer) => viewer,
        None => {
            return ProfileVisibility {
                can_view_full_profile: target.is_public,
                ..ProfileVisibility::default()
            }
        }
    };

    let outgoing = edges.iter().find(|e| e.connects(viewer.user_id, target.id));
    let incoming = edges.iter().find(|e| e.connects(target.id, viewer.user_id));

    let accepted_follow = outgoing.map_or(false, FollowRequest::is_accepted);
    let can_view_full_profile =
        target.is_public || viewer.user_id == target.id || viewer.is_admin || accepted_follow;

    if viewer.is_admin || target_is_admin || viewer.user_id == target.id {
        return ProfileVisibility {
            can_view_full_profile,
            ..ProfileVisibility::default()
        };
    }

    ProfileVisibility {
        can_view_full_profile,
        i_follow: accepted_follow,
        follows_me: incoming.map_or(false, FollowRequest::is_accepted),
        request_pending: outgoing.map_or(false, |e| e.status == FollowStatus::Pending),
    }
}
