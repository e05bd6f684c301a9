use super::{AttributeLookup, LookupHttp};
use crate::errors::LookupError;
use crate::models::LookupRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Age estimate returned by agify.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgifyResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub name: String,
    /// `null` when the service has no estimate for the name.
    pub age: Option<u32>,
}

/// Client for the age-by-name service.
#[derive(Debug, Clone)]
pub struct AgifyClient {
    http: LookupHttp,
}

impl AgifyClient {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            http: LookupHttp::new("agify", base_url, connect_timeout)?,
        })
    }
}

#[async_trait]
impl AttributeLookup for AgifyClient {
    type Output = AgifyResponse;

    fn service(&self) -> &'static str {
        self.http.service()
    }

    async fn get(&self, request: &LookupRequest) -> Result<AgifyResponse, LookupError> {
        self.http.get_json(request).await
    }
}
