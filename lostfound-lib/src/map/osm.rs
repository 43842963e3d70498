use async_trait::async_trait;
use lostfound_proto::{DeviceStatus, GeoPoint};
use reqwest::Client;
use serde::Deserialize;

use crate::{api::client_for, Result, Settings};

use super::{CenterPolicy, MapError, MapProvider, MapView, Route, RouteKind};

const MARKER_ICON_BASE: &'static str =
    "https://raw.githubusercontent.com/pointhi/leaflet-color-markers/master/img";

#[derive(Debug, Deserialize)]
struct OsrmGeometryDto {
    coordinates: Vec<[f64; 2]>,
}

#[derive(Debug, Deserialize)]
struct OsrmRouteDto {
    geometry: OsrmGeometryDto,
    distance: f64,
    duration: f64,
}

#[derive(Debug, Deserialize)]
struct OsrmResponseDto {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRouteDto>,
}

/// OpenStreetMap tiles with OSRM driving routes.
#[derive(Clone, Debug)]
pub struct OsmProvider {
    osrm_url: String,
    center_policy: CenterPolicy,
    client: Client,
}

impl OsmProvider {
    pub fn new(settings: &Settings) -> Self {
        Self {
            osrm_url: settings.osrm_url.trim_end_matches('/').to_owned(),
            center_policy: CenterPolicy::Average,
            client: client_for(settings),
        }
    }

    pub fn with_center_policy(mut self, center_policy: CenterPolicy) -> Self {
        self.center_policy = center_policy;
        self
    }
}

fn parse_osrm(dto: OsrmResponseDto) -> Result<Route> {
    if dto.code != "Ok" {
        return Err(MapError::NoRoute(dto.message.unwrap_or(dto.code)).into());
    }
    let route = dto
        .routes
        .into_iter()
        .next()
        .ok_or_else(|| MapError::NoRoute("empty response".to_owned()))?;
    Ok(Route {
        kind: RouteKind::Driving,
        points: route
            .geometry
            .coordinates
            .into_iter()
            .map(|[lon, lat]| GeoPoint::new(lat, lon))
            .collect(),
        distance: Some(route.distance),
        duration: Some(route.duration),
    })
}

#[async_trait]
impl MapProvider for OsmProvider {
    fn name(&self) -> &'static str {
        "OpenStreetMap"
    }

    fn center_policy(&self) -> CenterPolicy {
        self.center_policy
    }

    fn marker_icon(&self, status: DeviceStatus) -> String {
        format!(
            "{}/marker-icon-2x-{}.png",
            MARKER_ICON_BASE,
            super::status_color(status)
        )
    }

    fn view_url(&self, view: &MapView) -> String {
        match &view.route {
            Some(route) if route.points.len() >= 2 => {
                let from = route.points[0];
                let to = route.points[route.points.len() - 1];
                format!(
                    "https://www.openstreetmap.org/directions?engine=fossgis_osrm_car&route={:.5}%2C{:.5}%3B{:.5}%2C{:.5}",
                    from.latitude, from.longitude, to.latitude, to.longitude
                )
            }
            _ => format!(
                "https://www.openstreetmap.org/#map={}/{:.5}/{:.5}",
                view.zoom, view.center.latitude, view.center.longitude
            ),
        }
    }

    async fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route> {
        let url = format!(
            "{}/route/v1/driving/{},{};{},{}",
            self.osrm_url, from.longitude, from.latitude, to.longitude, to.latitude
        );
        let response = self
            .client
            .get(url)
            .query(&[("overview", "full"), ("geometries", "geojson")])
            .send()
            .await?;
        let status = response.status();
        // OSRM reports failures in the body, with 400 for unroutable input
        let dto = response
            .json::<OsrmResponseDto>()
            .await
            .map_err(|_| MapError::Service(status.to_string()))?;
        parse_osrm(dto)
    }
}

#[cfg(test)]
mod tests {
    use lostfound_proto::{DeviceStatus, GeoPoint};

    use crate::{
        map::{CenterPolicy, MapError, MapProvider, MapView, Route, RouteKind},
        Error, Settings,
    };

    use super::{parse_osrm, OsmProvider, OsrmResponseDto};

    #[test]
    fn test_parse_route() {
        let dto: OsrmResponseDto = serde_json::from_str(
            r#"{"code":"Ok","routes":[{"geometry":{"type":"LineString","coordinates":[[13.38,52.51],[13.39,52.52]]},"distance":1520.3,"duration":210.0}],"waypoints":[]}"#,
        )
        .unwrap();
        let route = parse_osrm(dto).unwrap();
        assert_eq!(RouteKind::Driving, route.kind);
        assert_eq!(GeoPoint::new(52.51, 13.38), route.points[0]);
        assert_eq!(Some(1520.3), route.distance);
    }

    #[test]
    fn test_parse_no_route() {
        let dto: OsrmResponseDto =
            serde_json::from_str(r#"{"code":"NoRoute","message":"Impossible route"}"#).unwrap();
        assert!(matches!(
            parse_osrm(dto),
            Err(Error::Map(MapError::NoRoute(message))) if message == "Impossible route"
        ));
    }

    #[test]
    fn test_urls_and_icons() {
        let provider = OsmProvider::new(&Settings::default())
            .with_center_policy(CenterPolicy::Fixed);
        assert!(provider
            .marker_icon(DeviceStatus::Lost)
            .ends_with("marker-icon-2x-red.png"));

        let view = MapView::build(&[], provider.center_policy(), GeoPoint::new(51.505, -0.09));
        assert_eq!(
            "https://www.openstreetmap.org/#map=13/51.50500/-0.09000",
            provider.view_url(&view)
        );

        let view = view.with_route(Route::simulated(vec![
            GeoPoint::new(1.0, 2.0),
            GeoPoint::new(3.0, 4.0),
        ]));
        assert!(provider
            .view_url(&view)
            .ends_with("route=1.00000%2C2.00000%3B3.00000%2C4.00000"));
    }
}
