use super::{AttributeLookup, LookupHttp};
use crate::errors::LookupError;
use crate::models::LookupRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Gender guess returned by genderize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenderizeResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub name: String,
    /// Raw value from the service; `null` for unknown names.
    pub gender: Option<String>,
    #[serde(default)]
    pub probability: f64,
}

/// Client for the gender-by-name service.
#[derive(Debug, Clone)]
pub struct GenderizeClient {
    http: LookupHttp,
}

impl GenderizeClient {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            http: LookupHttp::new("genderize", base_url, connect_timeout)?,
        })
    }
}

#[async_trait]
impl AttributeLookup for GenderizeClient {
    type Output = GenderizeResponse;

    fn service(&self) -> &'static str {
        self.http.service()
    }

    async fn get(&self, request: &LookupRequest) -> Result<GenderizeResponse, LookupError> {
        self.http.get_json(request).await
    }
}
