//! Test helpers module
//!
//! This module provides utilities and helpers for testing SocialPlatform.
//! It includes the moderation mock server, an optional PostgreSQL helper and
//! a test context wiring services over the in-memory store.

#![allow(dead_code)]

pub mod moderation_mock;
pub mod database_helper;
pub mod test_context;

pub use moderation_mock::*;
pub use database_helper::*;
pub use test_context::*;
