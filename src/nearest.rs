//! Nearest-event ranking.
//!
//! Given a target time and location, every candidate gets a time delta, a
//! great-circle distance, and an azimuth from the target. Candidates inside
//! the radius/window thresholds are kept and sorted by temporal proximity
//! first, spatial proximity second, which matches seismic-network
//! deduplication conventions: two networks locating the same event agree on
//! origin time far more closely than on epicenter.

use std::f64::consts::PI;

use crate::client::ComcatClient;
use crate::errors::QuakeFindError;
use crate::models::{map_records, CandidateEvent};
use crate::query::Query;

/// Earth radius in kilometers for haversine calculations.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A candidate event annotated with its deltas from the search target.
#[derive(Debug, Clone)]
pub struct RankedEvent {
    pub event: CandidateEvent,
    pub distance_km: f64,
    pub time_delta_s: f64,
    pub azimuth_deg: f64,
}

/// Calculate the great-circle distance between two points using the
/// haversine formula.
///
/// Returns distance in kilometers.
#[must_use]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let delta_lat = (lat2 - lat1) * PI / 180.0;
    let delta_lon = (lon2 - lon1) * PI / 180.0;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Calculate the initial compass bearing from point 1 to point 2.
///
/// Returns degrees clockwise from north, normalized to [0, 360).
#[must_use]
pub fn initial_bearing(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1 * PI / 180.0;
    let lat2_rad = lat2 * PI / 180.0;
    let delta_lon = (lon2 - lon1) * PI / 180.0;

    let y = delta_lon.sin() * lat2_rad.cos();
    let x = lat1_rad.cos() * lat2_rad.sin()
        - lat1_rad.sin() * lat2_rad.cos() * delta_lon.cos();
    let bearing = y.atan2(x) * 180.0 / PI;

    (bearing + 360.0) % 360.0
}

/// Rank candidates by proximity to the query's target.
///
/// Candidates outside the radius or time window are discarded; both bounds
/// are inclusive. The sort is ascending by `(time_delta_s, distance_km)` and
/// stable, so ties keep their encounter order.
#[must_use]
pub fn rank_events(query: &Query, candidates: &[CandidateEvent]) -> Vec<RankedEvent> {
    let mut ranked: Vec<RankedEvent> = candidates
        .iter()
        .map(|candidate| {
            let distance_km = haversine_distance(
                query.latitude,
                query.longitude,
                candidate.latitude,
                candidate.longitude,
            );
            let azimuth_deg = initial_bearing(
                query.latitude,
                query.longitude,
                candidate.latitude,
                candidate.longitude,
            );
            let delta_ms = (candidate.time - query.time).num_milliseconds();
            let time_delta_s = delta_ms.abs() as f64 / 1000.0;
            RankedEvent {
                event: candidate.clone(),
                distance_km,
                time_delta_s,
                azimuth_deg,
            }
        })
        .filter(|r| r.distance_km <= query.radius_km && r.time_delta_s <= query.window_secs)
        .collect();

    ranked.sort_by(|a, b| {
        a.time_delta_s
            .total_cmp(&b.time_delta_s)
            .then(a.distance_km.total_cmp(&b.distance_km))
    });
    ranked
}

/// Search the catalog and rank the results against the query's target.
///
/// An empty result means no event matched the thresholds; the caller may
/// reissue the query with a wider radius or window. Nothing is retried here.
///
/// # Errors
///
/// Returns an error if the catalog request fails.
pub fn find_nearby_events(
    client: &ComcatClient,
    query: &Query,
) -> Result<Vec<RankedEvent>, QuakeFindError> {
    let collection = client.search(query)?;
    let candidates = map_records(&collection.features);
    Ok(rank_events(query, &candidates))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};

    use crate::query::parse_time;

    fn target() -> DateTime<Utc> {
        parse_time("2019-07-15T10:39:32").unwrap()
    }

    fn candidate(id: &str, offset_secs: i64, lat: f64, lon: f64) -> CandidateEvent {
        CandidateEvent {
            id: id.to_string(),
            time: target() + Duration::seconds(offset_secs),
            latitude: lat,
            longitude: lon,
            depth_km: 5.0,
            magnitude: Some(3.1),
            url: Some(format!(
                "https://earthquake.usgs.gov/earthquakes/eventpage/{id}"
            )),
        }
    }

    fn base_query() -> Query {
        Query::new(target(), 35.932, -117.715).unwrap()
    }

    #[test]
    fn test_haversine() {
        // SF to LA is roughly 560 km
        let distance = haversine_distance(37.77, -122.41, 34.05, -118.24);
        assert!(distance > 500.0 && distance < 620.0);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let north = initial_bearing(35.0, -117.0, 36.0, -117.0);
        assert!(north.abs() < 0.01);

        let south = initial_bearing(35.0, -117.0, 34.0, -117.0);
        assert!((south - 180.0).abs() < 0.01);

        // Due east drifts slightly off 90 at mid latitudes; stay loose.
        let east = initial_bearing(35.0, -117.0, 35.0, -116.0);
        assert!((east - 90.0).abs() < 1.0);
    }

    #[test]
    fn test_excludes_outside_window() {
        let query = base_query();
        let inside = candidate("near", 10, 35.94, -117.72);
        let late = candidate("late", 17, 35.94, -117.72);
        let far = candidate("far", 5, 37.77, -122.41);

        let ranked = rank_events(&query, &[inside, late, far]);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].event.id, "near");
    }

    #[test]
    fn test_window_boundary_inclusive() {
        let query = base_query();
        let boundary = candidate("edge", 16, 35.932, -117.715);

        let ranked = rank_events(&query, &[boundary]);
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].time_delta_s - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_radius_boundary_inclusive() {
        // Thresholds set from the computed distance so the candidate sits
        // exactly on the boundary.
        let co_located = candidate("exact", 0, 36.2, -117.715);
        let distance =
            haversine_distance(35.932, -117.715, co_located.latitude, co_located.longitude);
        let query = base_query().with_radius_km(distance).unwrap();

        let ranked = rank_events(&query, &[co_located]);
        assert_eq!(ranked.len(), 1);
    }

    #[test]
    fn test_exact_match_ranks_first() {
        let query = base_query();
        let exact = candidate("exact", 0, 35.932, -117.715);
        let close = candidate("close", 2, 35.94, -117.72);
        let closer_in_space = candidate("space", 8, 35.932, -117.715);

        let ranked = rank_events(&query, &[close, closer_in_space, exact]);
        assert_eq!(ranked[0].event.id, "exact");
        assert!(ranked[0].distance_km < 1e-9);
        assert!(ranked[0].time_delta_s < 1e-9);
    }

    #[test]
    fn test_time_beats_distance() {
        let query = base_query();
        // Nearer in time but farther in space must still rank first.
        let near_time = candidate("near_time", 2, 36.3, -117.715);
        let near_space = candidate("near_space", 9, 35.932, -117.715);

        let ranked = rank_events(&query, &[near_space, near_time]);
        assert_eq!(ranked[0].event.id, "near_time");
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let query = base_query();
        let first = candidate("first", 4, 35.99, -117.715);
        let second = candidate("second", 4, 35.99, -117.715);

        let ranked = rank_events(&query, &[first, second]);
        assert_eq!(ranked[0].event.id, "first");
        assert_eq!(ranked[1].event.id, "second");
    }

    #[test]
    fn test_empty_candidates_is_no_match() {
        let ranked = rank_events(&base_query(), &[]);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_azimuth_attached_to_ranked_event() {
        let query = base_query();
        let due_north = candidate("north", 0, 36.5, -117.715);

        let ranked = rank_events(&query, &[due_north]);
        assert_eq!(ranked.len(), 1);
        assert!(ranked[0].azimuth_deg.abs() < 0.01);
    }
}
