use async_trait::async_trait;
use lostfound_proto::GeoPoint;
use reqwest::Client;
use serde::Deserialize;

use crate::{api::client_for, Result, Settings};

use super::{GeoError, Geocoder, LocationCandidate};

#[derive(Debug, Deserialize)]
struct PlaceDto {
    display_name: String,
    lat: String,
    lon: String,
}

#[derive(Debug, Deserialize)]
struct ReverseDto {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// OpenStreetMap Nominatim search and reverse lookups.
#[derive(Clone, Debug)]
pub struct NominatimGeocoder {
    base_url: String,
    limit: usize,
    client: Client,
}

impl NominatimGeocoder {
    pub fn new(settings: &Settings) -> Self {
        Self::with_client(&settings.geocoder_url, settings.max_candidates, client_for(settings))
    }

    pub fn with_client(base_url: impl ToString, limit: usize, client: Client) -> Self {
        Self {
            base_url: base_url.to_string().trim_end_matches('/').to_owned(),
            limit,
            client,
        }
    }
}

fn to_candidate(place: PlaceDto) -> Option<LocationCandidate> {
    let position = GeoPoint::new(place.lat.parse().ok()?, place.lon.parse().ok()?);
    if !position.is_valid() {
        return None;
    }
    Some(LocationCandidate {
        label: place.display_name,
        position,
    })
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<LocationCandidate>> {
        let limit = self.limit.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[("format", "json"), ("q", query), ("limit", limit.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeoError::Service(response.status().to_string()).into());
        }
        let places = response.json::<Vec<PlaceDto>>().await?;
        let candidates: Vec<_> = places.into_iter().filter_map(to_candidate).collect();
        log::debug!("{} candidates for {:?}", candidates.len(), query);
        Ok(candidates)
    }

    async fn reverse(&self, position: GeoPoint) -> Result<String> {
        let lat = position.latitude.to_string();
        let lon = position.longitude.to_string();
        let response = self
            .client
            .get(format!("{}/reverse", self.base_url))
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(GeoError::Service(response.status().to_string()).into());
        }
        let dto = response.json::<ReverseDto>().await?;
        match (dto.display_name, dto.error) {
            (Some(name), _) => Ok(name),
            (None, error) => {
                Err(GeoError::Service(error.unwrap_or_else(|| "no address".to_owned())).into())
            }
        }
    }
}
