//! Relays revalidation events to the storefront webhook.
//!
//! The shared secret stays on this side of the wire: untrusted callers hand
//! an event to the forwarder, and only the forwarder attaches the bearer
//! token.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode, Url};
use serde::{Deserialize, Serialize};
use storefront_core::{AppConfig, RevalidationEvent};

use crate::error::RevalidateError;

/// Fixed webhook path appended to the configured base URL.
pub const WEBHOOK_PATH: &str = "api/revalidate";

/// Success body returned by the webhook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevalidationReceipt {
    pub revalidated: bool,
    pub timestamp: DateTime<Utc>,
    pub paths: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// HTTP client for the revalidation webhook.
pub struct RevalidateClient {
    client: Client,
    secret: String,
    endpoint: Url,
}

impl RevalidateClient {
    /// Builds a client from application config.
    ///
    /// # Errors
    ///
    /// Returns [`RevalidateError::MissingSecret`] when no secret is
    /// configured, or the errors of [`RevalidateClient::new`].
    pub fn from_config(config: &AppConfig) -> Result<Self, RevalidateError> {
        let secret = config
            .revalidate_secret
            .as_deref()
            .ok_or(RevalidateError::MissingSecret)?;
        Self::new(&config.site_url, secret, config.revalidate_timeout_secs)
    }

    /// Creates a client posting to `{base_url}/api/revalidate`.
    ///
    /// # Errors
    ///
    /// Returns [`RevalidateError::MissingSecret`] for an empty secret,
    /// [`RevalidateError::InvalidBaseUrl`] if `base_url` does not parse, or
    /// [`RevalidateError::Http`] if the `reqwest::Client` cannot be built.
    pub fn new(base_url: &str, secret: &str, timeout_secs: u64) -> Result<Self, RevalidateError> {
        if secret.trim().is_empty() {
            return Err(RevalidateError::MissingSecret);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("storefront/0.1 (revalidation-forwarder)")
            .build()?;

        // Exactly one trailing slash so `join` appends instead of replacing
        // the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&normalised)
            .and_then(|base| base.join(WEBHOOK_PATH))
            .map_err(|e| RevalidateError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            client,
            secret: secret.to_owned(),
            endpoint,
        })
    }

    /// The full webhook URL this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Posts `event` to the webhook with the bearer secret attached.
    ///
    /// Not retried; callers own any retry policy.
    ///
    /// # Errors
    ///
    /// - [`RevalidateError::Unauthorized`] on a 401 response.
    /// - [`RevalidateError::UnexpectedStatus`] on any other non-2xx status.
    /// - [`RevalidateError::Http`] on network failure or timeout.
    /// - [`RevalidateError::Deserialize`] if the success body is malformed.
    pub async fn forward(
        &self,
        event: &RevalidationEvent,
    ) -> Result<RevalidationReceipt, RevalidateError> {
        tracing::debug!(
            event_type = %event.event_type,
            slug = event.record.slug().unwrap_or_default(),
            endpoint = %self.endpoint,
            "forwarding revalidation event"
        );

        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(&self.secret)
            .json(event)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("revalidation webhook returned 401");
            return Err(RevalidateError::Unauthorized);
        }

        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "revalidation webhook failed");
            return Err(RevalidateError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let receipt: RevalidationReceipt =
            serde_json::from_str(&body).map_err(RevalidateError::Deserialize)?;
        tracing::info!(paths = ?receipt.paths, "revalidation forwarded");
        Ok(receipt)
    }
}
