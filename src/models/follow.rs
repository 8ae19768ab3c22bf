//! Follow request model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::errors::SocialPlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowStatus {
    Pending,
    Accepted,
    Rejected,
}

impl FollowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FollowStatus::Pending => "pending",
            FollowStatus::Accepted => "accepted",
            FollowStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for FollowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FollowStatus {
    type Err = SocialPlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FollowStatus::Pending),
            "accepted" => Ok(FollowStatus::Accepted),
            "rejected" => Ok(FollowStatus::Rejected),
            other => Err(SocialPlatformError::InvalidInput(format!("Unknown follow status: {}", other))),
        }
    }
}

impl TryFrom<String> for FollowStatus {
    type Error = SocialPlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Answer given by the receiving user to a pending follow request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FollowDecision {
    Accept,
    Reject,
}

impl FromStr for FollowDecision {
    type Err = SocialPlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(FollowDecision::Accept),
            "reject" => Ok(FollowDecision::Reject),
            other => Err(SocialPlatformError::InvalidDecision(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FollowRequest {
    pub id: i64,
    pub follower_id: i64,
    pub following_id: i64,
    #[sqlx(try_from = "String")]
    pub status: FollowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FollowRequest {
    pub fn is_accepted(&self) -> bool {
        self.status == FollowStatus::Accepted
    }

    /// Edge goes from `follower_id` to `following_id`
    pub fn connects(&self, follower_id: i64, following_id: i64) -> bool {
        self.follower_id == follower_id && self.following_id == following_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_parsing() {
        assert_eq!(" Accept ".parse::<FollowDecision>().unwrap(), FollowDecision::Accept);
        assert_eq!("reject".parse::<FollowDecision>().unwrap(), FollowDecision::Reject);
        assert!(matches!(
            "maybe".parse::<FollowDecision>(),
            Err(SocialPlatformError::InvalidDecision(_))
        ));
    }

    #[test]
    fn test_status_text() {
        assert_eq!(FollowStatus::Rejected.to_string(), "rejected");
        assert_eq!("pending".parse::<FollowStatus>().unwrap(), FollowStatus::Pending);
        assert!("PENDING".parse::<FollowStatus>().is_err());
    }
}
