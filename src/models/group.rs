//! Group model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::errors::SocialPlatformError;

/// Role a user holds inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipRole {
    Owner,
    Member,
    Pending,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MembershipRole::Owner => "Owner",
            MembershipRole::Member => "Member",
            MembershipRole::Pending => "Pending",
        }
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipRole {
    type Err = SocialPlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Owner" => Ok(MembershipRole::Owner),
            "Member" => Ok(MembershipRole::Member),
            "Pending" => Ok(MembershipRole::Pending),
            other => Err(SocialPlatformError::InvalidInput(format!("Unknown membership role: {}", other))),
        }
    }
}

impl TryFrom<String> for MembershipRole {
    type Error = SocialPlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Owner's answer to a pending join request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinDecision {
    Accept,
    Decline,
}

impl FromStr for JoinDecision {
    type Err = SocialPlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(JoinDecision::Accept),
            "decline" | "reject" => Ok(JoinDecision::Decline),
            other => Err(SocialPlatformError::InvalidDecision(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Group {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct GroupMembership {
    pub id: i64,
    pub group_id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub role: MembershipRole,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_text_is_pascal_case() {
        assert_eq!(MembershipRole::Owner.as_str(), "Owner");
        assert_eq!("Pending".parse::<MembershipRole>().unwrap(), MembershipRole::Pending);
        assert!("owner".parse::<MembershipRole>().is_err());
    }

    #[test]
    fn test_join_decision_parsing() {
        assert_eq!("ACCEPT".parse::<JoinDecision>().unwrap(), JoinDecision::Accept);
        assert_eq!("decline".parse::<JoinDecision>().unwrap(), JoinDecision::Decline);
        assert!("later".parse::<JoinDecision>().is_err());
    }
}
