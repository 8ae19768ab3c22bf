//! Reaction and saved post models

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::errors::SocialPlatformError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ReactionType {
    Like,
    Love,
    Laugh,
    Angry,
}

impl ReactionType {
    /// Every reaction type, in display order
    pub const ALL: [ReactionType; 4] = [
        ReactionType::Like,
        ReactionType::Love,
        ReactionType::Laugh,
        ReactionType::Angry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReactionType::Like => "Like",
            ReactionType::Love => "Love",
            ReactionType::Laugh => "Laugh",
            ReactionType::Angry => "Angry",
        }
    }
}

impl fmt::Display for ReactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReactionType {
    type Err = SocialPlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        ReactionType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| SocialPlatformError::InvalidInput(format!("Unknown reaction type: {}", wanted)))
    }
}

impl TryFrom<String> for ReactionType {
    type Error = SocialPlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Reaction {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
    #[sqlx(try_from = "String")]
    pub reaction_type: ReactionType,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionCount {
    pub reaction_type: ReactionType,
    pub count: i64,
}

/// State of a post's reactions after the actor reacted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionSummary {
    pub post_id: i64,
    /// The actor's reaction after the call, `None` when it was removed
    pub user_reaction: Option<ReactionType>,
    /// One entry per reaction type, zero counts included
    pub counts: Vec<ReactionCount>,
}

impl ReactionSummary {
    pub fn has_reaction(&self) -> bool {
        self.user_reaction.is_some()
    }

    pub fn count(&self, reaction_type: ReactionType) -> i64 {
        self.counts
            .iter()
            .find(|c| c.reaction_type == reaction_type)
            .map_or(0, |c| c.count)
    }
}

/// A post bookmarked by a user
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedPost {
    pub id: i64,
    pub user_id: i64,
    pub post_id: i64,
    pub saved_at: DateTime<Utc>,
}
