use async_trait::async_trait;
use lostfound_proto::{Device, DeviceStatus, GeoPoint};
use thiserror::Error;

use crate::{Result, Settings};

mod google;
mod map_view;
mod osm;

pub use google::*;
pub use map_view::*;
pub use osm::*;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("A Google Maps API key is required")]
    MissingApiKey,
    #[error("No route found: {0}")]
    NoRoute(String),
    #[error("Invalid encoded polyline")]
    InvalidPolyline,
    #[error("Routing service failed: {0}")]
    Service(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CenterPolicy {
    /// Always the configured default center.
    Fixed,
    /// Mean of all marker positions.
    Average,
    /// Position of the first geo-tagged device.
    FirstDevice,
}

/// A mapping backend. Exactly one is active per view.
#[async_trait]
pub trait MapProvider: Send + Sync {
    fn name(&self) -> &'static str;

    fn center_policy(&self) -> CenterPolicy;

    fn marker_icon(&self, status: DeviceStatus) -> String;

    /// Link that opens the view in the provider's own map.
    fn view_url(&self, view: &MapView) -> String;

    async fn route(&self, from: GeoPoint, to: GeoPoint) -> Result<Route>;

    fn build_view(&self, devices: &[Device], settings: &Settings) -> MapView {
        MapView::build(devices, self.center_policy(), settings.default_center)
            .with_icons(|status| self.marker_icon(status))
    }
}

pub fn status_color(status: DeviceStatus) -> &'static str {
    match status {
        DeviceStatus::Lost => "red",
        DeviceStatus::Found => "green",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Osm,
    Google,
}

/// Builds the provider selected on the command line.
pub fn provider(kind: ProviderKind, settings: &Settings) -> Result<Box<dyn MapProvider>> {
    Ok(match kind {
        ProviderKind::Osm => Box::new(OsmProvider::new(settings)),
        ProviderKind::Google => Box::new(GoogleProvider::new(settings)?),
    })
}
