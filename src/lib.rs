//! SocialPlatform relationship core
//!
//! Follow requests between users, group membership roles, and the
//! conversations, messages, posts, comments and reactions hanging off them. Decisions
//! live in [`policy`]; [`services`] apply them through a [`database::SocialStore`]
//! backed by PostgreSQL or kept in memory.

#![allow(non_snake_case)]

pub mod config;
pub mod database;
pub mod models;
pub mod policy;
pub mod services;
pub mod utils;

// Re-export commonly used types
pub use config::Settings;
pub use utils::errors::{SocialPlatformError, Result};

// Re-export main components for easy access
pub use database::{DatabaseService, MemoryStore, SocialStore};
pub use services::{AuthContext, ServiceFactory};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Get library information
pub fn info() -> String {
    format!("{} v{}", NAME, VERSION)
}
