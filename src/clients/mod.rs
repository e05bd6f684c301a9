//! Outbound attribute lookups (age, gender, nationality by first name).
//!
//! Every client issues a single `GET {base_url}/?name=<name>` and decodes the
//! JSON body into its service-specific response. Clients are immutable after
//! construction and safe to share across concurrent enrichment calls.

pub mod agify;
pub mod genderize;
pub mod nationalize;

pub use agify::{AgifyClient, AgifyResponse};
pub use genderize::{GenderizeClient, GenderizeResponse};
pub use nationalize::{CountryProbability, NationalizeClient, NationalizeResponse};

use crate::errors::LookupError;
use crate::models::LookupRequest;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// One outbound lookup service.
#[async_trait]
pub trait AttributeLookup: Send + Sync {
    /// Typed response of the service.
    type Output: Send + 'static;

    /// Short service name used in logs.
    fn service(&self) -> &'static str;

    /// Performs one lookup. Errors are reported, never retried.
    async fn get(&self, request: &LookupRequest) -> Result<Self::Output, LookupError>;
}

/// HTTP plumbing shared by the three lookup clients.
#[derive(Debug, Clone)]
pub struct LookupHttp {
    client: reqwest::Client,
    base_url: String,
    service: &'static str,
}

impl LookupHttp {
    /// Builds the long-lived HTTP client for one service.
    ///
    /// Only the connect phase is bounded here; the overall deadline belongs
    /// to the enrichment call.
    pub fn new(
        service: &'static str,
        base_url: impl Into<String>,
        connect_timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| {
                LookupError::Transport(format!("failed to create {} client: {}", service, e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            service,
        })
    }

    pub fn service(&self) -> &'static str {
        self.service
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds `{base_url}/?name=<name>` with the name URL-encoded.
    pub fn lookup_url(&self, request: &LookupRequest) -> Result<Url, LookupError> {
        Url::parse_with_params(&format!("{}/", self.base_url), &[("name", request.name())])
            .map_err(|e| LookupError::Request(format!("failed to build {} URL: {}", self.service, e)))
    }

    /// Sends the lookup and decodes the JSON body into `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        request: &LookupRequest,
    ) -> Result<T, LookupError> {
        let url = self.lookup_url(request)?;
        tracing::debug!("{} lookup: {}", self.service, url);

        let response = self.client.get(url).send().await.map_err(|e| {
            LookupError::Transport(format!("{} request failed: {}", self.service, e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LookupError::UnexpectedStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(|e| {
            LookupError::Transport(format!("{} response body: {}", self.service, e))
        })?;

        serde_json::from_slice(&body).map_err(|e| {
            LookupError::Decode(format!("failed to parse {} response: {}", self.service, e))
        })
    }
}
