use super::{AttributeLookup, LookupHttp};
use crate::errors::LookupError;
use crate::models::LookupRequest;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountryProbability {
    pub country_id: String,
    #[serde(default)]
    pub probability: f64,
}

/// Ranked nationality guesses returned by nationalize, most likely first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NationalizeResponse {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub country: Vec<CountryProbability>,
}

impl NationalizeResponse {
    /// Highest-ranked country as given by the service. No re-sorting.
    pub fn top_country(&self) -> Option<&str> {
        self.country.first().map(|c| c.country_id.as_str())
    }
}

/// Client for the nationality-by-name service.
#[derive(Debug, Clone)]
pub struct NationalizeClient {
    http: LookupHttp,
}

impl NationalizeClient {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Result<Self, LookupError> {
        Ok(Self {
            http: LookupHttp::new("nationalize", base_url, connect_timeout)?,
        })
    }
}

#[async_trait]
impl AttributeLookup for NationalizeClient {
    type Output = NationalizeResponse;

    fn service(&self) -> &'static str {
        self.http.service()
    }

    async fn get(&self, request: &LookupRequest) -> Result<NationalizeResponse, LookupError> {
        self.http.get_json(request).await
    }
}
