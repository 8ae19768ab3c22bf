//! Configuration validation module
//!
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{SocialPlatformError, Result};
use super::Settings;

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_database_config(&settings.database)?;
    validate_auth_config(&settings.auth)?;
    validate_moderation_config(&settings.moderation)?;
    validate_logging_config(&settings.logging)?;

    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(SocialPlatformError::Config(
            "Database URL is required".to_string()
        ));
    }

    if config.max_connections == 0 {
        return Err(SocialPlatformError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }

    if config.min_connections > config.max_connections {
        return Err(SocialPlatformError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }

    Ok(())
}

fn validate_auth_config(config: &super::AuthConfig) -> Result<()> {
    if config.admin_ids.iter().any(|id| *id <= 0) {
        return Err(SocialPlatformError::Config(
            "Admin IDs must be positive user IDs".to_string()
        ));
    }

    Ok(())
}

/// Validate moderation service configuration
fn validate_moderation_config(config: &super::ModerationConfig) -> Result<()> {
    if config.api_url.is_empty() {
        return Err(SocialPlatformError::Config(
            "Moderation API URL is required".to_string()
        ));
    }

    url::Url::parse(&config.api_url).map_err(|e| {
        SocialPlatformError::Config(format!("Invalid moderation API URL: {}", e))
    })?;

    if config.timeout_seconds == 0 {
        return Err(SocialPlatformError::Config(
            "Moderation timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(SocialPlatformError::Config(
            "Log level is required".to_string()
        ));
    }

    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(SocialPlatformError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }

    Ok(())
}
