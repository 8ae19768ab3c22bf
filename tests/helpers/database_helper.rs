//! Test database helper utilities
//!
//! PostgreSQL tests only run when `TEST_DATABASE_URL` points at a database
//! they may wipe. Without it [`TestDatabase::connect`] returns `None` and the
//! test returns early.

use std::sync::Once;

use sqlx::PgPool;
use SocialPlatform::database::{run_migrations, DatabaseService};

static INIT: Once = Once::new();

/// Test database helper that manages PostgreSQL test database setup
pub struct TestDatabase {
    pub pool: PgPool,
    pub database_url: String,
}

impl TestDatabase {
    /// Connect, migrate and empty every table
    pub async fn connect() -> Option<Self> {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt::try_init();
        });

        let database_url = match std::env::var("TEST_DATABASE_URL") {
            Ok(url) => url,
            Err(_) => {
                eprintln!("TEST_DATABASE_URL not set, skipping PostgreSQL test");
                return None;
            }
        };

        let pool = PgPool::connect(&database_url).await.expect("failed to connect to test database");
        run_migrations(&pool).await.expect("failed to run migrations");

        let db = Self { pool, database_url };
        db.cleanup().await;
        Some(db)
    }

    /// Remove all rows, children first
    pub async fn cleanup(&self) {
        sqlx::query(
            "TRUNCATE reactions, saved_posts, comments, posts, messages, conversation_participants, conversations, \
             group_memberships, groups, follow_requests, users RESTART IDENTITY CASCADE",
        )
        .execute(&self.pool)
        .await
        .expect("failed to truncate tables");
    }

    pub fn store(&self) -> DatabaseService {
        DatabaseService::new(self.pool.clone())
    }

    /// Count rows in a table
    pub async fn count(&self, table: &str) -> i64 {
        let row: (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool)
            .await
            .expect("count query failed");
        row.0
    }
}
