//! Data models for ComCat fdsnws event responses.
//!
//! These structures match the GeoJSON format returned by
//! `earthquake.usgs.gov/fdsnws/event/1/query?format=geojson`.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::errors::QuakeFindError;

/// Top-level GeoJSON response from an event search.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Response metadata
    pub metadata: Option<Metadata>,

    /// Matching events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    pub fn validate(&self) -> Result<(), QuakeFindError> {
        if self.type_ != "FeatureCollection" {
            return Err(QuakeFindError::InvalidResponse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }
}

/// Metadata about the search response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// When this response was generated (ms since epoch)
    pub generated: i64,

    /// Request URL
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// API version string
    pub api: String,

    /// Number of events in response
    pub count: usize,
}

/// A single earthquake event as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Unique event ID
    pub id: String,

    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

/// Geographic geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Always "Point"
    #[serde(rename = "type")]
    pub type_: String,

    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties from the fdsnws service.
#[derive(Debug, Clone, Deserialize)]
pub struct Properties {
    /// Magnitude value
    pub mag: Option<f64>,

    /// Magnitude type (mb, Ml, Mw, etc.)
    #[serde(rename = "magType")]
    pub mag_type: Option<String>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,

    /// Last update time (ms since epoch)
    pub updated: Option<i64>,

    /// Event page URL
    pub url: Option<String>,

    /// Event type (earthquake, quarry blast, etc.)
    #[serde(rename = "type")]
    pub event_type: Option<String>,
}

/// One uniform row per catalog record.
///
/// This is the tabular shape the ranker and the presenter consume; it is
/// read-only once mapped from the raw GeoJSON.
#[derive(Debug, Clone)]
pub struct CandidateEvent {
    pub id: String,
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub depth_km: f64,
    pub magnitude: Option<f64>,
    pub url: Option<String>,
}

impl TryFrom<&Feature> for CandidateEvent {
    type Error = QuakeFindError;

    fn try_from(f: &Feature) -> Result<Self, Self::Error> {
        if f.id.is_empty() {
            return Err(QuakeFindError::Validation("empty event ID".into()));
        }
        if f.geometry.coordinates.len() != 3 {
            return Err(QuakeFindError::Validation(format!(
                "event {}: expected 3 coordinates, got {}",
                f.id,
                f.geometry.coordinates.len()
            )));
        }
        let time = Utc
            .timestamp_millis_opt(f.properties.time)
            .single()
            .ok_or_else(|| {
                QuakeFindError::Validation(format!(
                    "event {}: invalid time {}",
                    f.id, f.properties.time
                ))
            })?;

        Ok(Self {
            id: f.id.clone(),
            time,
            longitude: f.geometry.coordinates[0],
            latitude: f.geometry.coordinates[1],
            depth_km: f.geometry.coordinates[2],
            magnitude: f.properties.mag,
            url: f.properties.url.clone(),
        })
    }
}

/// Map raw features into candidate rows, dropping malformed records.
///
/// Each dropped record is logged as a warning; a bad record never fails the
/// whole batch. An empty input yields an empty output.
#[must_use]
pub fn map_records(features: &[Feature]) -> Vec<CandidateEvent> {
    let mut candidates = Vec::with_capacity(features.len());
    for feature in features {
        match CandidateEvent::try_from(feature) {
            Ok(candidate) => candidates.push(candidate),
            Err(e) => warn!("skipping malformed record: {e}"),
        }
    }
    candidates
}
