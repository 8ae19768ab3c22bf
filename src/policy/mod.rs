//! Pure decision functions
//!
//! Nothing in this module touches a store. Services gather the rows a decision
//! needs, ask the policy, then apply the resulting mutation.

pub mod visibility;
pub mod follow;
pub mod membership;
pub mod conversation;
pub mod reaction;

pub use visibility::{ProfileVisibility, resolve_visibility};
pub use follow::{FollowAction, toggle_transition, respond_transition};
pub use membership::{GroupPermissions, LeaveOutcome, join_role, grants_conversation_access, leave_outcome};
pub use reaction::{ReactionAction, react_transition, tally};
