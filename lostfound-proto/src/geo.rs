use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_valid(&self) -> bool {
        is_valid_latitude(self.latitude) && is_valid_longitude(self.longitude)
    }

    /// Moves the point by the given deltas, clamped to the valid coordinate range.
    pub fn offset(&self, d_lat: f64, d_lon: f64) -> Self {
        Self {
            latitude: (self.latitude + d_lat).clamp(MIN_LATITUDE, MAX_LATITUDE),
            longitude: (self.longitude + d_lon).clamp(MIN_LONGITUDE, MAX_LONGITUDE),
        }
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

pub fn is_valid_latitude(latitude: f64) -> bool {
    latitude.is_finite() && (MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude)
}

pub fn is_valid_longitude(longitude: f64) -> bool {
    longitude.is_finite() && (MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude)
}
