//! SocialPlatform maintenance binary
//!
//! Loads configuration, connects to PostgreSQL, applies the bundled
//! migrations and reports the state of the store and the moderation service.

use anyhow::Context;
use tracing::{info, warn};

use SocialPlatform::{
    config::Settings,
    database::{connection, DatabaseService},
    services::ServiceFactory,
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", SocialPlatform::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_pool = connection::create_pool(&settings.database)
        .await
        .context("failed to connect to database")?;

    // Run database migrations
    connection::run_migrations(&db_pool).await?;
    connection::health_check(&db_pool).await?;

    // Initialize services
    let database_service = DatabaseService::new(db_pool);
    let services = ServiceFactory::new(database_service, settings.clone())?;

    if services.moderation_service.is_enabled() {
        info!(
            api_url = %settings.moderation.api_url,
            content_moderation = settings.features.content_moderation,
            sentiment_analysis = settings.features.sentiment_analysis,
            "Moderation service configured"
        );
    } else {
        warn!("Content moderation and sentiment analysis are disabled");
    }

    info!(
        admins = settings.auth.admin_ids.len(),
        require_complete_profile = settings.features.require_complete_profile,
        "Store ready"
    );
    Ok(())
}
