// # Webhook Notification Sink
//
// Posts each new listing to a chat webhook (Discord-compatible) as a JSON
// document of the form `{"content": "<message>"}`.
//
// ## Contract
//
// - One POST per listing, no retries
// - Any 2xx response is a delivery; anything else is a `Delivery` error
// - Bounded request timeout
//
// ## Security
//
// The webhook URL embeds its own credential. It never appears in logs, error
// messages or `Debug` output.

use async_trait::async_trait;
use halkarz_core::model::ListingRecord;
use halkarz_core::notify::format_message;
use halkarz_core::traits::Notifier;
use halkarz_core::{Error, Result};
use serde::Serialize;
use std::time::Duration;

/// Sink name used in logs and delivery errors
const SINK_NAME: &str = "webhook";

/// Default HTTP timeout for one delivery (10 seconds)
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Request body accepted by Discord-style webhooks
#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
}

/// Chat webhook notifier
pub struct WebhookNotifier {
    /// Webhook endpoint
    /// ⚠️ NEVER log this value
    url: String,

    /// HTTP client for deliveries
    client: reqwest::Client,
}

// Custom Debug implementation that hides the webhook URL
impl std::fmt::Debug for WebhookNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookNotifier")
            .field("url", &"<REDACTED>")
            .finish()
    }
}

impl WebhookNotifier {
    /// Create a webhook notifier with the default timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, DEFAULT_WEBHOOK_TIMEOUT)
    }

    /// Create a webhook notifier with a custom timeout
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(Error::config("Webhook URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { url, client })
    }

    async fn post(&self, content: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&WebhookPayload { content })
            .send()
            .await
            // reqwest errors carry the URL; strip it before reporting
            .map_err(|e| {
                Error::delivery(SINK_NAME, format!("request failed: {}", e.without_url()))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!("Webhook rejected delivery: {} {}", status, body);
            return Err(Error::delivery(
                SINK_NAME,
                format!("HTTP {}", status.as_u16()),
            ));
        }

        Ok(())
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, record: &ListingRecord) -> Result<()> {
        self.post(&format_message(record)).await?;
        tracing::info!("Webhook notification sent: {}", record.company_name);
        Ok(())
    }

    fn name(&self) -> &'static str {
        SINK_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn alfa() -> ListingRecord {
        ListingRecord::new(
            "Alfa Holding",
            "1-2 Ekim 2025",
            "https://halkarz.com/alfa-holding/",
        )
    }

    #[tokio::test]
    async fn test_posts_content_json() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api/webhooks/1/secret")
                    .header("content-type", "application/json")
                    .json_body(json!({ "content": format_message(&alfa()) }));
                then.status(204);
            })
            .await;

        let notifier = WebhookNotifier::new(server.url("/api/webhooks/1/secret")).unwrap();
        notifier.notify(&alfa()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_2xx_is_delivery_error() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(500).body("internal");
            })
            .await;

        let notifier = WebhookNotifier::new(server.url("/hook")).unwrap();
        let err = notifier.notify(&alfa()).await.unwrap_err();

        match err {
            Error::Delivery { sink, message } => {
                assert_eq!(sink, "webhook");
                assert_eq!(message, "HTTP 500");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        // Single attempt, no retries
        mock.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn test_transport_error_hides_url() {
        let notifier = WebhookNotifier::with_timeout(
            "http://127.0.0.1:9/api/webhooks/1/very-secret-token",
            Duration::from_millis(500),
        )
        .unwrap();

        let err = notifier.notify(&alfa()).await.unwrap_err();
        assert!(matches!(err, Error::Delivery { .. }));
        assert!(!err.to_string().contains("very-secret-token"));
    }

    #[test]
    fn test_debug_redacts_url() {
        let notifier =
            WebhookNotifier::new("https://discord.com/api/webhooks/1/very-secret-token").unwrap();
        let debug = format!("{:?}", notifier);

        assert!(debug.contains("<REDACTED>"));
        assert!(!debug.contains("very-secret-token"));
    }

    #[test]
    fn test_empty_url_rejected() {
        assert!(matches!(WebhookNotifier::new(""), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_report_is_a_no_op() {
        let notifier = WebhookNotifier::new("https://discord.com/api/webhooks/1/x").unwrap();
        assert!(notifier.report("Mevcut Halka Arzlar", &[]).await.is_ok());
        assert_eq!(notifier.name(), "webhook");
    }
}
