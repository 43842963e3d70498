use async_trait::async_trait;
use lostfound_proto::{DeviceStatus, GeoPoint};
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{api::client_for, Result, Settings};

use super::{status_color, CenterPolicy, MapError, MapProvider, MapView, Route, RouteKind};

const DIRECTIONS_URL: &'static str = "https://maps.googleapis.com/maps/api/directions/json";
const STATIC_MAP_URL: &'static str = "https://maps.googleapis.com/maps/api/staticmap";

#[derive(Debug, Deserialize)]
struct ValueDto {
    value: f64,
}

#[derive(Debug, Deserialize)]
struct LegDto {
    distance: Option<ValueDto>,
    duration: Option<ValueDto>,
}

#[derive(Debug, Deserialize)]
struct PolylineDto {
    points: String,
}

#[derive(Debug, Deserialize)]
struct DirectionsRouteDto {
    overview_polyline: PolylineDto,
    #[serde(default)]
    legs: Vec<LegDto>,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponseDto {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<DirectionsRouteDto>,
}

/// Google Maps with Directions API routes. Needs an API key.
#[derive(Clone, Debug)]
pub struct GoogleProvider {
    api_key: String,
    center_policy: CenterPolicy,
    client: Client,
}

impl GoogleProvider {
    pub fn new(settings: &Settings) -> std::result::Result<Self, MapError> {
        let api_key = settings
            .google_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(MapError::MissingApiKey)?;
        Ok(Self {
            api_key,
            center_policy: CenterPolicy::FirstDevice,
            client: client_for(settings),
        })
    }

    pub fn with_center_policy(mut self, center_policy: CenterPolicy) -> Self {
        self.center_policy = center_policy;
        self
    }
}

fn coordinate(point: &GeoPoint) -> String {
    format!("{:.6},{:.6}", point.latitude, point.longitude)
}

fn parse_directions(dto: DirectionsResponseDto) -> Result<Route> {
    match dto.status.as_str() {
        "OK" => {}
        "ZERO_RESULTS" | "NOT_FOUND" => {
            return Err(MapError::NoRoute(dto.status).into());
        }
        _ => {
            return Err(MapError::Service(dto.error_message.unwrap_or(dto.status)).into());
        }
    }
    let route = dto
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| MapError::NoRoute("empty response".to_owned()))?;

    let sum = |f: fn(&LegDto) -> Option<f64>| -> Option<f64> {
        route.legs.iter().map(f).sum::<Option<f64>>()
    };
    let distance = sum(|leg| leg.distance.as_ref().map(|d| d.value));
    let duration = sum(|leg| leg.duration.as_ref().map(|d| d.value));

    Ok(Route {
        kind: RouteKind::Driving,
        points: decode_polyline(&route.overview_polyline.points)?,
        distance,
        duration,
    })
}

/// Decodes Google's encoded polyline format (precision 1e5).
pub fn decode_polyline(encoded: &str) -> std::result::Result<Vec<GeoPoint>, MapError> {
    fn next_value(bytes: &[u8], index: &mut usize) -> std::result::Result<i64, MapError> {
        let mut result: i64 = 0;
        let mut shift = 0;
        loop {
            let byte = *bytes.get(*index).ok_or(MapError::InvalidPolyline)? as i64 - 63;
            *index += 1;
            if byte < 0 || shift > 60 {
                return Err(MapError::InvalidPolyline);
            }
            result |= (byte & 0x1f) << shift;
            shift += 5;
            if byte < 0x20 {
                break;
            }
        }
        Ok(if result & 1 != 0 {
            !(result >> 1)
        } else {
            result >> 1
        })
    }

    let bytes = encoded.as_bytes();
    let mut index = 0;
    let (mut lat, mut lon) = (0i64, 0i64);
    let mut points = vec![];
    while index < bytes.len() {
        lat = lat
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(MapError::InvalidPolyline)?;
        lon = lon
            .checked_add(next_value(bytes, &mut index)?)
            .ok_or(MapError::InvalidPolyline)?;
        points.push(GeoPoint::new(lat as f64 / 1e5, lon as f64 / 1e5));
    }
    Ok(points)
}

#[async_trait]
impl MapProvider for GoogleProvider {
    fn name(&self) -> &'static str {
        "Google Maps"
    }

    fn center_policy(&self) -> CenterPolicy {
        self.center_policy
    }

    fn marker_icon(&self, status: DeviceStatus) -> String {
        format!(
            "https://maps.google.com/mapfiles/ms/icons/{}-dot.png",
            status_color(status)
        )
    }

    fn view_url(&self, view: &MapView) -> String {
        let mut params = vec![
            ("center".to_owned(), coordinate(&view.center)),
            ("zoom".to_owned(), view.zoom.to_string()),
            ("size".to_owned(), "640x480".to_owned()),
        ];
        for marker in &view.markers {
            params.push((
                "markers".to_owned(),
                format!(
                    "color:{}|{}",
                    status_color(marker.status),
                    coordinate(&marker.position)
                ),
            ));
        }
        if let Some(route) = &view.route {
            let path: Vec<String> = route.points.iter().map(coordinate).collect();
            params.push((
                "path".to_owned(),
                format!("color:0x0000ffcc|weight:4|{}", path.join("|")),
            ));
        }
        params.push(("key".to_owned(), self.api_key.clone()));

        match Url::parse_with_params(STATIC_MAP_URL, &params) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::error!("invalid static map url: {}", e);
                STATIC_MAP_URL.to_owned()
            }
        }
    }

    async fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route> {
        let origin = coordinate(&from);
        let destination = coordinate(&to);
        let response = self
            .client
            .get(DIRECTIONS_URL)
            .query(&[
                ("origin", origin.as_str()),
                ("destination", destination.as_str()),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(MapError::Service(response.status().to_string()).into());
        }
        parse_directions(response.json().await?)
    }
}
