use lostfound_proto::{Device, DeviceId, DeviceStatus, GeoPoint, DEFAULT_ZOOM};
use serde_json::{json, Value};

use super::{status_color, CenterPolicy};

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub device_id: DeviceId,
    pub position: GeoPoint,
    pub status: DeviceStatus,
    pub icon: Option<String>,
    pub popup: String,
}

impl Marker {
    fn from_device(device: &Device) -> Option<Self> {
        let position = device.position()?;
        let mut popup = vec![device.name.clone(), format!("Status: {}", device.status)];
        if let Some(category) = device.category.as_deref().filter(|c| !c.is_empty()) {
            popup.push(format!("Category: {}", category));
        }
        if let Some(location) = device.location.as_deref().filter(|l| !l.is_empty()) {
            popup.push(format!("Location: {}", location));
        }
        if let Some(description) = device.description.as_deref().filter(|d| !d.is_empty()) {
            popup.push(description.to_owned());
        }
        Some(Self {
            device_id: device.id,
            position,
            status: device.status,
            icon: None,
            popup: popup.join("\n"),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Simulated,
    Driving,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub kind: RouteKind,
    pub points: Vec<GeoPoint>,
    /// Meters.
    pub distance: Option<f64>,
    /// Seconds.
    pub duration: Option<f64>,
}

impl Route {
    pub fn simulated(points: Vec<GeoPoint>) -> Self {
        Self {
            kind: RouteKind::Simulated,
            points,
            distance: None,
            duration: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub markers: Vec<Marker>,
    pub route: Option<Route>,
}

impl MapView {
    /// Devices lacking either coordinate never become markers.
    pub fn build(devices: &[Device], policy: CenterPolicy, default_center: GeoPoint) -> Self {
        let markers: Vec<Marker> = devices.iter().filter_map(Marker::from_device).collect();
        let center = match policy {
            CenterPolicy::Fixed => default_center,
            CenterPolicy::Average if !markers.is_empty() => {
                let n = markers.len() as f64;
                let (lat, lon) = markers.iter().fold((0.0, 0.0), |(lat, lon), m| {
                    (lat + m.position.latitude, lon + m.position.longitude)
                });
                GeoPoint::new(lat / n, lon / n)
            }
            CenterPolicy::FirstDevice if !markers.is_empty() => markers[0].position,
            _ => default_center,
        };
        Self {
            center,
            zoom: DEFAULT_ZOOM,
            markers,
            route: None,
        }
    }

    pub fn with_icons(mut self, icon: impl Fn(DeviceStatus) -> String) -> Self {
        for marker in &mut self.markers {
            marker.icon = Some(icon(marker.status));
        }
        self
    }

    pub fn with_route(mut self, route: Route) -> Self {
        self.route = Some(route);
        self
    }

    pub fn marker(&self, device_id: DeviceId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.device_id == device_id)
    }

    /// GeoJSON `FeatureCollection`, coordinates in `[longitude, latitude]` order.
    pub fn to_geojson(&self) -> Value {
        let mut features: Vec<Value> = self
            .markers
            .iter()
            .map(|marker| {
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [marker.position.longitude, marker.position.latitude],
                    },
                    "properties": {
                        "id": marker.device_id,
                        "status": marker.status,
                        "marker-color": status_color(marker.status),
                        "icon": marker.icon,
                        "popup": marker.popup,
                    },
                })
            })
            .collect();
        if let Some(route) = &self.route {
            let coordinates: Vec<[f64; 2]> = route
                .points
                .iter()
                .map(|p| [p.longitude, p.latitude])
                .collect();
            features.push(json!({
                "type": "Feature",
                "geometry": { "type": "LineString", "coordinates": coordinates },
                "properties": {
                    "kind": format!("{:?}", route.kind).to_lowercase(),
                    "distance": route.distance,
                    "duration": route.duration,
                },
            }));
        }
        json!({ "type": "FeatureCollection", "features": features })
    }
}

#[cfg(test)]
mod tests {
    use lostfound_proto::{Device, DeviceStatus, GeoPoint};

    use super::{MapView, Route};
    use crate::map::CenterPolicy;

    fn device(id: i64, status: DeviceStatus, lat: Option<f64>, lon: Option<f64>) -> Device {
        Device {
            id,
            name: format!("device-{}", id),
            description: None,
            category: Some("phone".to_owned()),
            location: None,
            status,
            latitude: lat,
            longitude: lon,
            created_at: None,
            updated_at: None,
            user_id: None,
        }
    }

    fn devices() -> Vec<Device> {
        vec![
            device(1, DeviceStatus::Lost, Some(10.0), Some(20.0)),
            device(2, DeviceStatus::Found, None, Some(5.0)),
            device(3, DeviceStatus::Found, Some(20.0), Some(40.0)),
            device(4, DeviceStatus::Lost, Some(1.0), None),
        ]
    }

    #[test]
    fn test_incomplete_coordinates_are_excluded() {
        let view = MapView::build(&devices(), CenterPolicy::Fixed, GeoPoint::new(0.0, 0.0));
        let ids: Vec<_> = view.markers.iter().map(|m| m.device_id).collect();
        assert_eq!(vec![1, 3], ids);
        assert!(view.marker(2).is_none());
        assert!(view.marker(4).is_none());
    }

    #[test]
    fn test_center_policies() {
        let default = GeoPoint::new(51.0, 0.0);
        let devices = devices();
        assert_eq!(
            default,
            MapView::build(&devices, CenterPolicy::Fixed, default).center
        );
        assert_eq!(
            GeoPoint::new(15.0, 30.0),
            MapView::build(&devices, CenterPolicy::Average, default).center
        );
        assert_eq!(
            GeoPoint::new(10.0, 20.0),
            MapView::build(&devices, CenterPolicy::FirstDevice, default).center
        );
        assert_eq!(
            default,
            MapView::build(&devices[1..2], CenterPolicy::Average, default).center
        );
    }

    #[test]
    fn test_popup_and_icons() {
        let view = MapView::build(&devices(), CenterPolicy::Fixed, GeoPoint::new(0.0, 0.0))
            .with_icons(|status| format!("{}.png", status));
        let marker = view.marker(1).unwrap();
        assert_eq!("device-1\nStatus: lost\nCategory: phone", marker.popup);
        assert_eq!(Some("lost.png".to_owned()), marker.icon);
        assert_eq!(Some("found.png".to_owned()), view.marker(3).unwrap().icon);
    }

    #[test]
    fn test_geojson() {
        let view = MapView::build(&devices(), CenterPolicy::Fixed, GeoPoint::new(0.0, 0.0))
            .with_route(Route::simulated(vec![
                GeoPoint::new(10.0, 20.0),
                GeoPoint::new(10.001, 20.001),
            ]));
        let geojson = view.to_geojson();
        let features = geojson["features"].as_array().unwrap();
        assert_eq!(3, features.len());
        assert_eq!(20.0, features[0]["geometry"]["coordinates"][0]);
        assert_eq!("red", features[0]["properties"]["marker-color"]);
        assert_eq!("green", features[1]["properties"]["marker-color"]);
        assert_eq!("LineString", features[2]["geometry"]["type"]);
        assert_eq!("simulated", features[2]["properties"]["kind"]);
    }
}
