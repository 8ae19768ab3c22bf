//! User model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::utils::errors::SocialPlatformError;

/// Account-level role stored on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountRole {
    RegisteredUser,
    Administrator,
}

impl AccountRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountRole::RegisteredUser => "registered_user",
            AccountRole::Administrator => "administrator",
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountRole {
    type Err = SocialPlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered_user" => Ok(AccountRole::RegisteredUser),
            "administrator" => Ok(AccountRole::Administrator),
            other => Err(SocialPlatformError::InvalidInput(format!("Unknown account role: {}", other))),
        }
    }
}

impl TryFrom<String> for AccountRole {
    type Error = SocialPlatformError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_public: bool,
    pub profile_completed: bool,
    #[sqlx(try_from = "String")]
    pub role: AccountRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_public: Option<bool>,
    pub role: Option<AccountRole>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_public: Option<bool>,
    pub profile_completed: Option<bool>,
}
