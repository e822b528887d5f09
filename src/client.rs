//! ComCat fdsnws event service client.
//!
//! Provides blocking HTTP access to the USGS earthquake catalog.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::errors::QuakeFindError;
use crate::models::{CandidateEvent, Feature, FeatureCollection};
use crate::query::Query;

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakefind/", env!("CARGO_PKG_VERSION"));

/// Base URL for the fdsnws event service.
const COMCAT_BASE_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1";

/// Response body of the `/count` endpoint with `format=geojson`.
#[derive(Debug, Clone, Deserialize)]
struct CountResponse {
    count: u64,
    #[serde(rename = "maxAllowed")]
    #[allow(dead_code)]
    max_allowed: Option<u64>,
}

/// Client for the ComCat event catalog.
pub struct ComcatClient {
    client: Client,
    base_url: String,
}

impl ComcatClient {
    /// Create a new catalog client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, QuakeFindError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: COMCAT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Search the catalog for events matching the query.
    ///
    /// One request per call; widening the search is the caller's decision.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, query))]
    pub fn search(&self, query: &Query) -> Result<FeatureCollection, QuakeFindError> {
        let url = format!("{}/query", self.base_url);
        debug!("searching catalog at {}", url);

        let response = self.client.get(&url).query(&query.to_params()).send()?;
        let response = check_status(response)?;

        let collection: FeatureCollection = response.json()?;
        collection.validate()?;

        debug!("search returned {} events", collection.features.len());
        Ok(collection)
    }

    /// Count the events matching the query without fetching them.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    #[instrument(skip(self, query))]
    pub fn count(&self, query: &Query) -> Result<u64, QuakeFindError> {
        let url = format!("{}/count", self.base_url);
        debug!("counting catalog matches at {}", url);

        let response = self.client.get(&url).query(&query.to_params()).send()?;
        let response = check_status(response)?;

        let counted: CountResponse = response.json()?;
        Ok(counted.count)
    }

    /// Fetch a single event by its catalog ID.
    ///
    /// The service returns a bare GeoJSON Feature when `eventid` is given.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the response cannot be parsed,
    /// or the returned record is malformed.
    #[instrument(skip(self))]
    pub fn get_event_by_id(&self, event_id: &str) -> Result<CandidateEvent, QuakeFindError> {
        let url = format!("{}/query", self.base_url);
        debug!("fetching event {} from {}", event_id, url);

        let response = self
            .client
            .get(&url)
            .query(&[("format", "geojson"), ("eventid", event_id)])
            .send()?;
        let response = check_status(response)?;

        let feature: Feature = response.json()?;
        CandidateEvent::try_from(&feature)
    }
}

/// Turn a non-2xx response into an API error.
fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, QuakeFindError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(QuakeFindError::Api {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_override() {
        let client = ComcatClient::new()
            .unwrap()
            .with_base_url("http://localhost:8080/fdsnws/event/1");
        assert_eq!(client.base_url, "http://localhost:8080/fdsnws/event/1");
    }

    #[test]
    fn test_count_response_parses() {
        let counted: CountResponse =
            serde_json::from_str(r#"{"count": 7, "maxAllowed": 20000}"#).unwrap();
        assert_eq!(counted.count, 7);
    }
}
