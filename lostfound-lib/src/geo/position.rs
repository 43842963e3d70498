use async_trait::async_trait;
use lostfound_proto::GeoPoint;
use reqwest::Client;
use serde::Deserialize;

use crate::{api::client_for, Result, Settings};

use super::{GeoError, PositionSource};

/// Position given up front, e.g. from the command line.
#[derive(Clone, Debug, PartialEq)]
pub enum FixedPosition {
    At(GeoPoint),
    Denied,
    Unavailable,
}

#[async_trait]
impl PositionSource for FixedPosition {
    async fn current_position(&self) -> Result<GeoPoint> {
        match self {
            FixedPosition::At(position) if position.is_valid() => Ok(*position),
            FixedPosition::At(position) => {
                Err(GeoError::Unavailable(format!("invalid coordinates {}", position)).into())
            }
            FixedPosition::Denied => Err(GeoError::Denied.into()),
            FixedPosition::Unavailable => {
                Err(GeoError::Unavailable("no position configured".to_owned()).into())
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpLocationDto {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Approximate position from the public IP address.
#[derive(Clone, Debug)]
pub struct IpPosition {
    url: String,
    client: Client,
}

impl IpPosition {
    pub fn new(settings: &Settings) -> Self {
        Self {
            url: settings.ip_location_url.clone(),
            client: client_for(settings),
        }
    }
}

#[async_trait]
impl PositionSource for IpPosition {
    async fn current_position(&self) -> Result<GeoPoint> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| GeoError::Unavailable(e.to_string()))?;
        let dto = response
            .json::<IpLocationDto>()
            .await
            .map_err(|e| GeoError::Unavailable(e.to_string()))?;

        match (dto.status.as_str(), dto.lat, dto.lon) {
            ("success", Some(lat), Some(lon)) => Ok(GeoPoint::new(lat, lon)),
            _ => Err(GeoError::Unavailable(
                dto.message.unwrap_or_else(|| "lookup failed".to_owned()),
            )
            .into()),
        }
    }
}
