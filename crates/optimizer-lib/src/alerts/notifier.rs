//! Notification channel implementations

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{async_trait, Notifier};
use crate::error::{OptimizerError, Result};

/// JSON body posted to a webhook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertPayload {
    pub subject: String,
    pub message: String,
    pub source: String,
}

/// Posts alerts as JSON to an HTTP endpoint
pub struct WebhookNotifier {
    client: Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if url.trim().is_empty() {
            return Err(OptimizerError::configuration("webhook notifier requires a URL"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| OptimizerError::configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client, url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn send_alert(&self, subject: &str, body: &str) -> Result<()> {
        let payload = AlertPayload {
            subject: subject.to_string(),
            message: body.to_string(),
            source: "cloud-cost-optimizer".to_string(),
        };

        let response = self
            .client
            .post(&self.url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OptimizerError::notification(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, url = %self.url, "Webhook rejected alert");
            return Err(OptimizerError::notification(format!(
                "webhook returned {}",
                status
            )));
        }

        info!(subject = %subject, "Alert sent successfully");
        Ok(())
    }

    fn channel(&self) -> &str {
        "webhook"
    }
}

/// Writes alerts to the log instead of delivering them
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_alert(&self, subject: &str, body: &str) -> Result<()> {
        warn!(event = "budget_alert", subject = %subject, body = %body, "Budget alert");
        Ok(())
    }

    fn channel(&self) -> &str {
        "log"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_webhook_requires_url() {
        assert!(matches!(
            WebhookNotifier::new("  "),
            Err(OptimizerError::Configuration(_))
        ));
        assert!(WebhookNotifier::new("http://localhost:9093/alerts").is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_webhook_is_notification_error() {
        // Port 9 (discard) is closed on test hosts
        let notifier = WebhookNotifier::new("http://127.0.0.1:9/alerts").unwrap();
        let err = notifier.send_alert("subject", "body").await.unwrap_err();
        assert!(matches!(err, OptimizerError::Notification(_)));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier.send_alert("subject", "body").await.is_ok());
        assert_eq!(LogNotifier.channel(), "log");
    }
}
