//! Outbound transport for onboarding submissions.

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use crate::config::OnboardingConfig;
use crate::error::{Result, TransportError};

/// Status and body of a response from the onboarding endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Delivers a serialized form to the onboarding endpoint.
///
/// `Err` means no response was received at all. Non-2xx responses are `Ok`.
#[async_trait]
pub trait OnboardingTransport: Send + Sync {
    async fn post_json(
        &self,
        body: &serde_json::Value,
    ) -> std::result::Result<TransportResponse, TransportError>;
}

/// HTTP transport: one `POST` with a JSON body per call, no retries.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(config: &OnboardingConfig) -> std::result::Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Client(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Resolve config from the environment and build the client.
    pub fn from_env() -> Result<Self> {
        let config = OnboardingConfig::from_env()?;
        Ok(Self::new(&config)?)
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl OnboardingTransport for HttpTransport {
    async fn post_json(
        &self,
        body: &serde_json::Value,
    ) -> std::result::Result<TransportResponse, TransportError> {
        // `.json()` sets `Content-Type: application/json`.
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        debug!(endpoint = %self.endpoint, status = status.as_u16(), "Onboarding endpoint responded");

        Ok(TransportResponse {
            status: status.as_u16(),
            body,
        })
    }
}
