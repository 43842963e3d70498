use async_trait::async_trait;
use lostfound_proto::GeoPoint;
use thiserror::Error;

use crate::Result;

mod nominatim;
mod position;

pub use nominatim::*;
pub use position::*;

#[derive(Error, Debug)]
pub enum GeoError {
    #[error("Current position is unavailable: {0}")]
    Unavailable(String),
    #[error("Access to the current position was denied")]
    Denied,
    #[error("Geocoding service failed: {0}")]
    Service(String),
}

/// A place the user can pick to fill in a draft's location.
#[derive(Clone, Debug, PartialEq)]
pub struct LocationCandidate {
    pub label: String,
    pub position: GeoPoint,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>>;

    async fn reverse(&self, position: GeoPoint) -> Result<String>;
}

#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn current_position(&self) -> Result<GeoPoint>;
}

/// Searches only once the trimmed query reaches `min_length` characters.
pub async fn search_locations(
    geocoder: &dyn Geocoder,
    query: &str,
    min_length: usize,
) -> Result<Vec<LocationCandidate>> {
    let query = query.trim();
    if query.chars().count() < min_length {
        return Ok(vec![]);
    }
    geocoder.search(query).await
}

/// Current position with a readable label, or the formatted coordinates when reverse
/// geocoding fails.
pub async fn resolve_current_location(
    source: &dyn PositionSource,
    geocoder: &dyn Geocoder,
) -> Result<LocationCandidate> {
    let position = source.current_position().await?;
    let label = match geocoder.reverse(position).await {
        Ok(label) if !label.trim().is_empty() => label,
        Ok(_) => position.to_string(),
        Err(e) => {
            log::warn!("reverse geocoding {} failed: {}", position, e);
            position.to_string()
        }
    };
    Ok(LocationCandidate { label, position })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use lostfound_proto::GeoPoint;

    use crate::{Error, Result};

    use super::{
        resolve_current_location, search_locations, FixedPosition, GeoError, Geocoder,
        LocationCandidate,
    };

    #[derive(Default)]
    struct CountingGeocoder {
        searches: AtomicUsize,
        reverse_fails: bool,
    }

    #[async_trait]
    impl Geocoder for CountingGeocoder {
        async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(vec![LocationCandidate {
                label: query.to_owned(),
                position: GeoPoint::new(1.0, 2.0),
            }])
        }

        async fn reverse(&self, _position: GeoPoint) -> Result<String> {
            if self.reverse_fails {
                Err(GeoError::Service("rate limited".to_owned()).into())
            } else {
                Ok("Plaza Mayor, Madrid".to_owned())
            }
        }
    }

    #[tokio::test]
    async fn test_short_queries_are_not_sent() {
        let geocoder = CountingGeocoder::default();
        assert!(search_locations(&geocoder, " ab ", 3).await.unwrap().is_empty());
        assert_eq!(0, geocoder.searches.load(Ordering::SeqCst));

        let candidates = search_locations(&geocoder, "abc", 3).await.unwrap();
        assert_eq!(1, candidates.len());
        assert_eq!(1, geocoder.searches.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_current_location_with_label() {
        let geocoder = CountingGeocoder::default();
        let source = FixedPosition::At(GeoPoint::new(40.4155, -3.7074));
        let candidate = resolve_current_location(&source, &geocoder).await.unwrap();
        assert_eq!("Plaza Mayor, Madrid", candidate.label);
    }

    #[tokio::test]
    async fn test_reverse_failure_falls_back_to_coordinates() {
        let geocoder = CountingGeocoder {
            reverse_fails: true,
            ..Default::default()
        };
        let source = FixedPosition::At(GeoPoint::new(40.4155, -3.7074));
        let candidate = resolve_current_location(&source, &geocoder).await.unwrap();
        assert_eq!("40.415500, -3.707400", candidate.label);
        assert_eq!(GeoPoint::new(40.4155, -3.7074), candidate.position);
    }

    #[tokio::test]
    async fn test_denied_position() {
        let geocoder = CountingGeocoder::default();
        let result = resolve_current_location(&FixedPosition::Denied, &geocoder).await;
        assert!(matches!(result, Err(Error::Geo(GeoError::Denied))));
    }
}
