//! Outbound notification of new pastes.

use std::time::Duration;

use axum::http::header::CONTENT_TYPE;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Errors from building or calling the webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("Failed to build webhook client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Webhook request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Posts each new paste URL to a configured endpoint.
#[derive(Clone, Debug)]
pub struct Webhook {
    client: reqwest::Client,
    url: String,
}

impl Webhook {
    /// Build a webhook client for `url` with a per-request timeout.
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(WebhookError::Client)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send `paste_url` as the request body.
    pub async fn send(&self, paste_url: String) -> Result<reqwest::StatusCode, WebhookError> {
        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE.as_str(), "application/x-www-form-urlencoded")
            .body(paste_url)
            .send()
            .await
            .map_err(|source| WebhookError::Request {
                url: self.url.clone(),
                source,
            })?;
        Ok(response.status())
    }

    /// Fire-and-forget delivery of `paste_url`. Failures are logged only.
    pub fn notify(&self, paste_url: String) -> JoinHandle<()> {
        let webhook = self.clone();
        tokio::spawn(async move {
            match webhook.send(paste_url).await {
                Ok(status) if status.is_success() => debug!(%status, "webhook delivered"),
                Ok(status) => warn!(%status, url = %webhook.url, "webhook rejected"),
                Err(e) => warn!(error = %e, "webhook failed"),
            }
        })
    }
}
