//! Test context wiring every service over the in-memory store

use std::sync::atomic::{AtomicUsize, Ordering};

use fake::faker::internet::en::Username;
use fake::Fake;
use SocialPlatform::config::Settings;
use SocialPlatform::database::{MemoryStore, UserStore};
use SocialPlatform::models::{AccountRole, CreateUserRequest, UpdateUserRequest, User};
use SocialPlatform::services::{AuthContext, ServiceFactory};

static USER_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Settings pointing at an unreachable moderation service with both calls disabled
pub fn test_settings() -> Settings {
    let mut settings = Settings::default();
    settings.moderation.api_url = "http://127.0.0.1:9".to_string();
    settings.moderation.timeout_seconds = 1;
    settings.features.content_moderation = false;
    settings.features.sentiment_analysis = false;
    settings
}

pub struct TestContext {
    pub store: MemoryStore,
    pub services: ServiceFactory<MemoryStore>,
    pub settings: Settings,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    /// Context whose moderation client talks to `base_url`
    pub fn with_moderation(base_url: &str) -> Self {
        let mut settings = test_settings();
        settings.moderation.api_url = base_url.to_string();
        settings.features.content_moderation = true;
        settings.features.sentiment_analysis = true;
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Self {
        let store = MemoryStore::new();
        let services = ServiceFactory::new(store.clone(), settings.clone()).expect("services should build");
        Self { store, services, settings }
    }

    fn unique_username() -> String {
        let base: String = Username().fake();
        let n = USER_COUNTER.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", base, n)
    }

    async fn register(&self, is_public: bool, role: AccountRole, complete: bool) -> (User, AuthContext) {
        let user = self
            .services
            .user_service
            .register(CreateUserRequest {
                username: Self::unique_username(),
                first_name: None,
                last_name: None,
                is_public: Some(is_public),
                role: Some(role),
            })
            .await
            .expect("registration should succeed");

        let user = if complete {
            let ctx = self.services.auth_service.context_for(&user);
            self.services
                .user_service
                .complete_profile(&ctx, user.id, "Test", "User")
                .await
                .expect("profile completion should succeed")
        } else {
            user
        };

        let ctx = self.services.auth_service.context_for(&user);
        (user, ctx)
    }

    /// Registered user with a completed profile
    pub async fn user(&self, is_public: bool) -> (User, AuthContext) {
        self.register(is_public, AccountRole::RegisteredUser, true).await
    }

    /// Registered user who has not completed their profile
    pub async fn incomplete_user(&self) -> (User, AuthContext) {
        self.register(true, AccountRole::RegisteredUser, false).await
    }

    pub async fn admin(&self) -> (User, AuthContext) {
        self.register(true, AccountRole::Administrator, true).await
    }

    /// Mark an existing user's profile incomplete again and rebuild their context
    pub async fn revoke_profile(&self, user_id: i64) -> AuthContext {
        self.store
            .update_user(user_id, UpdateUserRequest { profile_completed: Some(false), ..Default::default() })
            .await
            .expect("profile update should succeed");
        self.services
            .user_service
            .context_for(user_id)
            .await
            .expect("context should build")
    }
}
