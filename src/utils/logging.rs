//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the SocialPlatform services.

use tracing::{info, warn, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::{SocialPlatformError, Result};

/// Initialize logging based on configuration
///
/// When a log directory is configured a daily rolling file layer is added next
/// to stdout. The returned guard must be kept alive for the file writer to flush.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.level)
        .map_err(|e| SocialPlatformError::Config(format!("Invalid log filter: {}", e)))?;

    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stdout);

    let (file_layer, guard) = match &config.file_path {
        Some(path) => {
            let file_appender = tracing_appender::rolling::daily(path, "socialplatform.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SocialPlatformError::Config(format!("Logging already initialized: {}", e)))?;

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log a follow request state change
pub fn log_follow_transition(follower_id: i64, following_id: i64, from: Option<&str>, to: Option<&str>) {
    info!(
        follower_id = follower_id,
        following_id = following_id,
        from = from.unwrap_or("none"),
        to = to.unwrap_or("none"),
        "Follow relationship changed"
    );
}

/// Log group events
pub fn log_group_event(group_id: i64, event: &str, user_id: Option<i64>, details: Option<&str>) {
    info!(
        group_id = group_id,
        event = event,
        user_id = user_id,
        details = details,
        "Group event occurred"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log moderation verdicts
pub fn log_moderation_result(user_id: i64, is_appropriate: bool, reason: Option<&str>, success: bool) {
    if !success {
        warn!(user_id = user_id, "Moderation unavailable, content allowed");
    } else if is_appropriate {
        debug!(user_id = user_id, "Moderation: content is appropriate");
    } else {
        warn!(
            user_id = user_id,
            reason = reason,
            "Moderation: content rejected"
        );
    }
}
