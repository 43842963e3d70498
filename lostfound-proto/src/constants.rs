pub const DEFAULT_BASE_URL: &'static str = "http://localhost:5000";

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// Fallback map center (London) when no device carries coordinates.
pub const DEFAULT_CENTER_LATITUDE: f64 = 51.505;
pub const DEFAULT_CENTER_LONGITUDE: f64 = -0.09;
pub const DEFAULT_ZOOM: u8 = 13;
