//! Search query construction for the ComCat fdsnws event service.
//!
//! A [`Query`] captures the target time/location plus the search thresholds,
//! and knows how to render itself as fdsnws query-string parameters. All
//! validation happens here, before any network call.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::errors::QuakeFindError;

/// Default search radius in kilometers.
pub const DEFAULT_RADIUS_KM: f64 = 100.0;

/// Default time window in seconds.
pub const DEFAULT_WINDOW_SECS: f64 = 16.0;

/// Time format accepted on the command line and sent to the service.
const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date-only format accepted on the command line.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// An immutable catalog search centered on a target time and location.
#[derive(Debug, Clone)]
pub struct Query {
    pub time: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub window_secs: f64,
    pub min_magnitude: Option<f64>,
    pub max_magnitude: Option<f64>,
}

impl Query {
    /// Build a query with default radius and window.
    ///
    /// # Errors
    ///
    /// Returns a validation error if latitude is outside [-90, 90] or
    /// longitude is outside [-180, 180].
    pub fn new(time: DateTime<Utc>, latitude: f64, longitude: f64) -> Result<Self, QuakeFindError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(QuakeFindError::Validation(format!(
                "latitude {latitude} out of range [-90, 90]"
            )));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(QuakeFindError::Validation(format!(
                "longitude {longitude} out of range [-180, 180]"
            )));
        }

        Ok(Self {
            time,
            latitude,
            longitude,
            radius_km: DEFAULT_RADIUS_KM,
            window_secs: DEFAULT_WINDOW_SECS,
            min_magnitude: None,
            max_magnitude: None,
        })
    }

    /// Set the search radius in kilometers.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the radius is a finite, positive
    /// number.
    pub fn with_radius_km(mut self, radius_km: f64) -> Result<Self, QuakeFindError> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            return Err(QuakeFindError::Validation(format!(
                "radius {radius_km} must be a positive number of kilometers"
            )));
        }
        self.radius_km = radius_km;
        Ok(self)
    }

    /// Set the time window in seconds.
    ///
    /// # Errors
    ///
    /// Returns a validation error unless the window is a finite, non-negative
    /// number.
    pub fn with_window_secs(mut self, window_secs: f64) -> Result<Self, QuakeFindError> {
        if !window_secs.is_finite() || window_secs < 0.0 {
            return Err(QuakeFindError::Validation(format!(
                "window {window_secs} must be a non-negative number of seconds"
            )));
        }
        self.window_secs = window_secs;
        Ok(self)
    }

    /// Restrict results to magnitudes at or above the given value.
    #[must_use]
    pub fn with_min_magnitude(mut self, magnitude: f64) -> Self {
        self.min_magnitude = Some(magnitude);
        self
    }

    /// Restrict results to magnitudes at or below the given value.
    #[must_use]
    pub fn with_max_magnitude(mut self, magnitude: f64) -> Self {
        self.max_magnitude = Some(magnitude);
        self
    }

    /// Start of the search window (target time minus the window).
    #[must_use]
    pub fn start_time(&self) -> DateTime<Utc> {
        self.time - window_duration(self.window_secs)
    }

    /// End of the search window (target time plus the window).
    #[must_use]
    pub fn end_time(&self) -> DateTime<Utc> {
        self.time + window_duration(self.window_secs)
    }

    /// Render the fdsnws query-string parameters for this search.
    #[must_use]
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "geojson".to_string()),
            ("starttime", self.start_time().format(TIME_FORMAT).to_string()),
            ("endtime", self.end_time().format(TIME_FORMAT).to_string()),
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("maxradiuskm", self.radius_km.to_string()),
            ("orderby", "time".to_string()),
        ];
        if let Some(min) = self.min_magnitude {
            params.push(("minmagnitude", min.to_string()));
        }
        if let Some(max) = self.max_magnitude {
            params.push(("maxmagnitude", max.to_string()));
        }
        params
    }
}

/// Parse a target time formatted as `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
///
/// Date-only input is interpreted as midnight UTC.
///
/// # Errors
///
/// Returns a validation error for any other format.
pub fn parse_time(s: &str) -> Result<DateTime<Utc>, QuakeFindError> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, TIME_FORMAT) {
        return Ok(dt.and_utc());
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, DATE_FORMAT) {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }
    Err(QuakeFindError::Validation(format!(
        "time '{s}' not formatted as YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
    )))
}

/// Convert a fractional-second window to a chrono duration.
fn window_duration(window_secs: f64) -> Duration {
    Duration::milliseconds((window_secs * 1000.0) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target_time() -> DateTime<Utc> {
        parse_time("2019-07-15T10:39:32").unwrap()
    }

    #[test]
    fn test_parse_time_full() {
        let t = parse_time("2019-07-15T10:39:32").unwrap();
        assert_eq!(t.format("%Y-%m-%dT%H:%M:%S").to_string(), "2019-07-15T10:39:32");
    }

    #[test]
    fn test_parse_time_date_only() {
        let t = parse_time("2019-07-15").unwrap();
        assert_eq!(t.format("%Y-%m-%dT%H:%M:%S").to_string(), "2019-07-15T00:00:00");
    }

    #[test]
    fn test_parse_time_rejects_garbage() {
        assert!(parse_time("last tuesday").is_err());
        assert!(parse_time("2019/07/15").is_err());
    }

    #[test]
    fn test_defaults() {
        let q = Query::new(target_time(), 35.932, -117.715).unwrap();
        assert!((q.radius_km - 100.0).abs() < f64::EPSILON);
        assert!((q.window_secs - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_latitude_out_of_range() {
        assert!(Query::new(target_time(), 90.5, 0.0).is_err());
        assert!(Query::new(target_time(), -91.0, 0.0).is_err());
    }

    #[test]
    fn test_longitude_out_of_range() {
        assert!(Query::new(target_time(), 0.0, 180.5).is_err());
        assert!(Query::new(target_time(), 0.0, -181.0).is_err());
    }

    #[test]
    fn test_window_brackets_target_time() {
        let q = Query::new(target_time(), 35.932, -117.715)
            .unwrap()
            .with_window_secs(16.0)
            .unwrap();
        assert_eq!(
            q.start_time().format("%H:%M:%S").to_string(),
            "10:39:16"
        );
        assert_eq!(q.end_time().format("%H:%M:%S").to_string(), "10:39:48");
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let q = || Query::new(target_time(), 35.932, -117.715).unwrap();
        assert!(q().with_radius_km(0.0).is_err());
        assert!(q().with_radius_km(-50.0).is_err());
        assert!(q().with_radius_km(f64::NAN).is_err());
        assert!(q().with_window_secs(-1.0).is_err());
        assert!(q().with_window_secs(f64::INFINITY).is_err());
        assert!(q().with_window_secs(f64::NAN).is_err());
        assert!(q().with_window_secs(0.0).is_ok());
    }

    #[test]
    fn test_to_params() {
        let q = Query::new(target_time(), 35.932, -117.715)
            .unwrap()
            .with_radius_km(200.0)
            .unwrap()
            .with_min_magnitude(2.5);
        let params = q.to_params();

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("format"), Some("geojson"));
        assert_eq!(get("starttime"), Some("2019-07-15T10:39:16"));
        assert_eq!(get("endtime"), Some("2019-07-15T10:39:48"));
        assert_eq!(get("maxradiuskm"), Some("200"));
        assert_eq!(get("minmagnitude"), Some("2.5"));
        assert_eq!(get("maxmagnitude"), None);
    }
}
