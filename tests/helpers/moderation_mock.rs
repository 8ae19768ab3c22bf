//! Moderation service mock server
//!
//! Wiremock server answering `/moderate` and `/sentiment` the way the
//! external moderation service does.

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct ModerationMockServer {
    pub server: MockServer,
    pub base_url: String,
}

impl ModerationMockServer {
    pub async fn new() -> Self {
        let server = MockServer::start().await;
        let base_url = server.uri();
        Self { server, base_url }
    }

    /// Answer `/moderate` with a verdict
    pub async fn mock_moderation(&self, is_appropriate: bool, reason: Option<&str>) {
        let body = json!({
            "isAppropriate": is_appropriate,
            "confidence": 0.9,
            "reason": reason,
        });

        Mock::given(method("POST"))
            .and(path("/moderate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `/sentiment` with a label wrapped in a markdown code fence
    pub async fn mock_fenced_sentiment(&self, label: &str, confidence: f64) {
        let body = format!(
            "```json\n{{\"label\": \"{}\", \"confidence\": {}}}\n```",
            label, confidence
        );

        Mock::given(method("POST"))
            .and(path("/sentiment"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `/sentiment` with a plain JSON body
    pub async fn mock_sentiment(&self, label: &str, confidence: f64) {
        Mock::given(method("POST"))
            .and(path("/sentiment"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "label": label, "confidence": confidence })),
            )
            .mount(&self.server)
            .await;
    }

    /// Require a bearer token on every endpoint
    pub async fn mock_authenticated_moderation(&self, api_key: &str) {
        Mock::given(method("POST"))
            .and(path("/moderate"))
            .and(header("authorization", format!("Bearer {}", api_key).as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "isAppropriate": true, "confidence": 1.0 })))
            .mount(&self.server)
            .await;
    }

    /// Fail every request with the given status
    pub async fn mock_failure(&self, status: u16) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Respond with a body that is not JSON
    pub async fn mock_garbage(&self) {
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("I think this is fine!"))
            .mount(&self.server)
            .await;
    }

    /// Number of requests the server received
    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}
