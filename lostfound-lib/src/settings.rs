use std::time::Duration;

use lostfound_proto::{GeoPoint, DEFAULT_BASE_URL, DEFAULT_CENTER_LATITUDE, DEFAULT_CENTER_LONGITUDE};

pub const NOMINATIM_URL: &'static str = "https://nominatim.openstreetmap.org";
pub const OSRM_URL: &'static str = "https://router.project-osrm.org";
pub const IP_LOCATION_URL: &'static str = "http://ip-api.com/json";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub request_timeout: Duration,
    pub geocoder_url: String,
    pub osrm_url: String,
    pub ip_location_url: String,
    pub google_api_key: Option<String>,
    /// Geocoding queries shorter than this are not sent.
    pub min_query_length: usize,
    pub max_candidates: usize,
    pub default_center: GeoPoint,
    pub track_interval: Duration,
    pub track_cap: usize,
    /// Maximum random step per tick, in degrees on each axis.
    pub track_jitter: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            geocoder_url: NOMINATIM_URL.to_string(),
            osrm_url: OSRM_URL.to_string(),
            ip_location_url: IP_LOCATION_URL.to_string(),
            google_api_key: None,
            min_query_length: 3,
            max_candidates: 5,
            default_center: GeoPoint::new(DEFAULT_CENTER_LATITUDE, DEFAULT_CENTER_LONGITUDE),
            track_interval: Duration::from_secs(2),
            track_cap: 20,
            track_jitter: 0.001,
        }
    }
}
