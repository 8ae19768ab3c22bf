//! Sentiment and content moderation client
//!
//! Talks to the external moderation service over HTTP JSON. Every call is
//! best-effort: transport errors, bad status codes and unparseable bodies are
//! logged and turned into a result with `success = false` that lets the
//! content through.

use std::time::Duration;
use chrono::Utc;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::settings::Settings;
use crate::models::CommentSentiment;
use crate::utils::errors::{SocialPlatformError, Result};
use crate::utils::helpers::{strip_code_fence, truncate_text};

/// Sentiment of a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentResult {
    pub label: String,
    pub confidence: f64,
    pub success: bool,
}

impl SentimentResult {
    fn fallback() -> Self {
        Self {
            label: "neutral".to_string(),
            confidence: 0.0,
            success: false,
        }
    }

    /// Sentiment fields to store on a comment, only for successful analyses
    pub fn into_comment_sentiment(self) -> Option<CommentSentiment> {
        self.success.then(|| CommentSentiment {
            label: self.label,
            confidence: self.confidence,
            analyzed_at: Utc::now(),
        })
    }
}

/// Moderation verdict for a piece of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationResult {
    pub is_appropriate: bool,
    pub reason: Option<String>,
    pub confidence: f64,
    pub success: bool,
}

impl ModerationResult {
    fn allow(success: bool) -> Self {
        Self {
            is_appropriate: true,
            reason: None,
            confidence: if success { 1.0 } else { 0.0 },
            success,
        }
    }
}

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct SentimentResponse {
    label: Option<String>,
    #[serde(default)]
    confidence: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModerationResponse {
    is_appropriate: bool,
    #[serde(default)]
    confidence: f64,
    reason: Option<String>,
}

/// Map any label onto positive, negative or neutral
pub fn normalize_label(label: Option<&str>) -> String {
    match label.map(|l| l.trim().to_ascii_lowercase()).as_deref() {
        Some("positive") => "positive".to_string(),
        Some("negative") => "negative".to_string(),
        _ => "neutral".to_string(),
    }
}

fn clamp_confidence(confidence: f64) -> f64 {
    if confidence.is_nan() {
        0.0
    } else {
        confidence.clamp(0.0, 1.0)
    }
}

/// Client for the external moderation service
#[derive(Clone, Debug)]
pub struct ModerationService {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
    content_moderation: bool,
    sentiment_analysis: bool,
}

impl ModerationService {
    /// Create a new ModerationService instance
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.moderation.timeout_seconds))
            .user_agent(concat!("SocialPlatform/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(SocialPlatformError::Http)?;

        // A trailing slash keeps the last path segment when joining endpoints
        let mut base = settings.moderation.api_url.trim_end_matches('/').to_string();
        base.push('/');
        let base_url = Url::parse(&base)?;

        Ok(Self {
            client,
            base_url,
            api_key: settings.moderation.api_key.clone(),
            content_moderation: settings.features.content_moderation,
            sentiment_analysis: settings.features.sentiment_analysis,
        })
    }

    pub fn is_enabled(&self) -> bool {
        self.content_moderation || self.sentiment_analysis
    }

    /// Classify the sentiment of `text`
    pub async fn analyze_sentiment(&self, text: &str) -> SentimentResult {
        if !self.sentiment_analysis || text.trim().is_empty() {
            return SentimentResult::fallback();
        }

        match self.post_json::<SentimentResponse>("sentiment", text).await {
            Ok(response) => {
                let result = SentimentResult {
                    label: normalize_label(response.label.as_deref()),
                    confidence: clamp_confidence(response.confidence),
                    success: true,
                };
                debug!(label = %result.label, confidence = result.confidence, "Sentiment analyzed");
                result
            }
            Err(e) => {
                warn!(error = %e, text = %truncate_text(text, 40), "Sentiment analysis failed, using neutral");
                SentimentResult::fallback()
            }
        }
    }

    /// Decide whether `text` is appropriate to publish
    pub async fn moderate_content(&self, text: &str) -> ModerationResult {
        if text.trim().is_empty() {
            return ModerationResult::allow(true);
        }
        if !self.content_moderation {
            return ModerationResult::allow(false);
        }

        match self.post_json::<ModerationResponse>("moderate", text).await {
            Ok(response) => ModerationResult {
                is_appropriate: response.is_appropriate,
                reason: if response.is_appropriate { None } else { response.reason },
                confidence: clamp_confidence(response.confidence),
                success: true,
            },
            Err(e) => {
                warn!(error = %e, "Content moderation failed, allowing content");
                ModerationResult::allow(false)
            }
        }
    }

    async fn post_json<T: serde::de::DeserializeOwned>(&self, endpoint: &str, text: &str) -> Result<T> {
        let url = self.base_url.join(endpoint)?;

        let mut request = self.client.post(url).json(&TextRequest { text });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SocialPlatformError::ServiceUnavailable(format!(
                "Moderation service returned {} for /{}",
                status, endpoint
            )));
        }

        let body = response.text().await?;
        let parsed = serde_json::from_str(&strip_code_fence(&body))?;
        Ok(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label(Some("POSITIVE ")), "positive");
        assert_eq!(normalize_label(Some("negative")), "negative");
        assert_eq!(normalize_label(Some("mixed")), "neutral");
        assert_eq!(normalize_label(None), "neutral");
    }

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
        assert_eq!(clamp_confidence(0.42), 0.42);
    }

    #[test]
    fn test_failed_sentiment_is_not_stored() {
        assert!(SentimentResult::fallback().into_comment_sentiment().is_none());
    }

    #[tokio::test]
    async fn test_blank_text_skips_the_service() {
        let mut settings = Settings::default();
        settings.moderation.api_url = "http://127.0.0.1:9".to_string();
        let service = ModerationService::new(&settings).unwrap();

        let verdict = service.moderate_content("   ").await;
        assert!(verdict.is_appropriate);
        assert!(verdict.success);
    }
}
