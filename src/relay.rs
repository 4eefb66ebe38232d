//! Outbound client for the email-relay API (Web3Forms).
//!
//! One POST per submission, JSON body `{access_key, name, email, message}`.
//! There is no retry; the request is bounded by the configured timeout.

use serde::Serialize;
use std::time::Duration;

/// Public Web3Forms submission endpoint.
pub const DEFAULT_RELAY_ENDPOINT: &str = "https://api.web3forms.com/submit";

/// Default bound on one relay call.
pub const DEFAULT_RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Current version of this binary, used in the User-Agent.
const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The relay answered with a non-success status.
    #[error("relay rejected the submission with status {status}: {body}")]
    Upstream { status: u16, body: String },
    /// The relay could not be reached, or the call timed out.
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct RelayPayload<'a> {
    access_key: &'a str,
    name: &'a str,
    email: &'a str,
    message: &'a str,
}

/// Connection settings for the relay.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub endpoint: String,
    pub access_key: String,
    pub timeout: Duration,
}

impl RelayConfig {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_RELAY_ENDPOINT.to_string(),
            access_key: access_key.into(),
            timeout: DEFAULT_RELAY_TIMEOUT,
        }
    }
}

/// Client for the relay endpoint. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MailRelay {
    client: reqwest::Client,
    endpoint: String,
    access_key: String,
}

impl MailRelay {
    pub fn new(config: RelayConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(format!("folio/{}", CURRENT_VERSION))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint,
            access_key: config.access_key,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Delivers one message. A single attempt is made.
    pub async fn send(&self, name: &str, email: &str, message: &str) -> Result<(), RelayError> {
        let payload = RelayPayload {
            access_key: &self.access_key,
            name,
            email,
            message,
        };

        let response = self.client.post(&self.endpoint).json(&payload).send().await?;

        let status = response.status();
        if !status.is_success() {
            // The body is only used for the log line; a failure to read it
            // does not change the outcome.
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}
