//! Moderation service tests against a mock HTTP server

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use SocialPlatform::services::ModerationService;
use SocialPlatform::SocialPlatformError;

#[tokio::test]
async fn test_fenced_sentiment_is_parsed() {
    let mock = ModerationMockServer::new().await;
    mock.mock_fenced_sentiment("Positive", 0.87).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let result = ctx.services.moderation_service.analyze_sentiment("what a lovely day").await;

    assert!(result.success);
    assert_eq!(result.label, "positive");
    assert!((result.confidence - 0.87).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_unknown_label_becomes_neutral_and_confidence_is_clamped() {
    let mock = ModerationMockServer::new().await;
    mock.mock_sentiment("ecstatic", 3.5).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let result = ctx.services.moderation_service.analyze_sentiment("wow").await;

    assert!(result.success);
    assert_eq!(result.label, "neutral");
    assert_eq!(result.confidence, 1.0);
}

#[tokio::test]
async fn test_sentiment_failure_falls_back_to_neutral() {
    let mock = ModerationMockServer::new().await;
    mock.mock_failure(500).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let result = ctx.services.moderation_service.analyze_sentiment("anything").await;

    assert!(!result.success);
    assert_eq!(result.label, "neutral");
    assert_eq!(result.confidence, 0.0);
}

#[tokio::test]
async fn test_moderation_failure_allows_content() {
    let mock = ModerationMockServer::new().await;
    mock.mock_failure(503).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let verdict = ctx.services.moderation_service.moderate_content("hello there").await;

    assert!(verdict.is_appropriate);
    assert!(!verdict.success);
}

#[tokio::test]
async fn test_unparseable_response_allows_content() {
    let mock = ModerationMockServer::new().await;
    mock.mock_garbage().await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let verdict = ctx.services.moderation_service.moderate_content("hello there").await;

    assert!(verdict.is_appropriate);
    assert!(!verdict.success);
}

#[tokio::test]
async fn test_unreachable_service_allows_content() {
    let mut settings = test_settings();
    settings.features.content_moderation = true;
    let moderation = ModerationService::new(&settings).unwrap();

    let verdict = moderation.moderate_content("hello there").await;
    assert!(verdict.is_appropriate);
    assert!(!verdict.success);
}

#[tokio::test]
async fn test_blank_text_skips_the_service() {
    let mock = ModerationMockServer::new().await;
    mock.mock_moderation(false, Some("never called")).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let verdict = ctx.services.moderation_service.moderate_content("   ").await;

    assert!(verdict.is_appropriate);
    assert!(verdict.success);
    assert_eq!(mock.request_count().await, 0);
}

#[tokio::test]
async fn test_disabled_moderation_makes_no_requests() {
    let mock = ModerationMockServer::new().await;
    mock.mock_moderation(false, Some("never called")).await;

    let mut settings = test_settings();
    settings.moderation.api_url = mock.base_url.clone();
    let moderation = ModerationService::new(&settings).unwrap();

    assert!(!moderation.is_enabled());
    let verdict = moderation.moderate_content("rude words").await;
    assert!(verdict.is_appropriate);
    assert_eq!(mock.request_count().await, 0);
}

#[tokio::test]
async fn test_api_key_is_sent_as_bearer_token() {
    let mock = ModerationMockServer::new().await;
    mock.mock_authenticated_moderation("secret-key").await;

    let mut settings = test_settings();
    settings.moderation.api_url = mock.base_url.clone();
    settings.moderation.api_key = Some("secret-key".to_string());
    settings.features.content_moderation = true;
    let moderation = ModerationService::new(&settings).unwrap();

    let verdict = moderation.moderate_content("polite words").await;
    assert!(verdict.success);
    assert!(verdict.is_appropriate);
}

#[tokio::test]
async fn test_rejected_post_is_not_stored() {
    let mock = ModerationMockServer::new().await;
    mock.mock_moderation(false, Some("harassment")).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let (_alice, alice_ctx) = ctx.user(true).await;

    let result = ctx.services.post_service.create_post(&alice_ctx, "something nasty").await;
    assert_matches!(result, Err(SocialPlatformError::ContentRejected { reason }) if reason == "harassment");
    assert!(ctx.services.post_service.feed(&alice_ctx).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_comment_stores_sentiment() {
    let mock = ModerationMockServer::new().await;
    mock.mock_moderation(true, None).await;
    mock.mock_fenced_sentiment("negative", 0.65).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let (_alice, alice_ctx) = ctx.user(true).await;
    let post = ctx.services.post_service.create_post(&alice_ctx, "monday again").await.unwrap();

    let comment = ctx.services.post_service.add_comment(&alice_ctx, post.id, "ugh, mondays").await.unwrap();
    assert_eq!(comment.sentiment_label.as_deref(), Some("negative"));
    assert_eq!(comment.sentiment_confidence, Some(0.65));
    assert!(comment.sentiment_analyzed_at.is_some());
}

#[tokio::test]
async fn test_comment_survives_sentiment_outage() {
    let mock = ModerationMockServer::new().await;
    mock.mock_moderation(true, None).await;

    let ctx = TestContext::with_moderation(&mock.base_url);
    let (_alice, alice_ctx) = ctx.user(true).await;
    let post = ctx.services.post_service.create_post(&alice_ctx, "hello").await.unwrap();

    let comment = ctx.services.post_service.add_comment(&alice_ctx, post.id, "hi").await.unwrap();
    assert!(comment.sentiment_label.is_none());
    assert!(comment.sentiment_confidence.is_none());
}

#[tokio::test]
async fn test_rejected_comment_edit_keeps_original_body() {
    let ctx = TestContext::new();
    let (_alice, alice_ctx) = ctx.user(true).await;
    let post = ctx.services.post_service.create_post(&alice_ctx, "hello").await.unwrap();
    let comment = ctx.services.post_service.add_comment(&alice_ctx, post.id, "kind words").await.unwrap();

    let mock = ModerationMockServer::new().await;
    mock.mock_moderation(false, Some("insult")).await;
    let moderated = TestContext::with_moderation(&mock.base_url);

    // Same rows, a service stack that talks to the rejecting mock
    let services = SocialPlatform::ServiceFactory::new(ctx.store.clone(), moderated.settings.clone()).unwrap();
    let result = services.post_service.edit_comment(&alice_ctx, comment.id, "rude words").await;
    assert_matches!(result, Err(SocialPlatformError::ContentRejected { .. }));

    let details = ctx.services.post_service.post_details(None, post.id).await.unwrap();
    assert_eq!(details.comments[0].body, "kind words");
    assert!(details.comments[0].edited_at.is_none());
}
