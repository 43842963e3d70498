use std::sync::Arc;

use lostfound_proto::{
    dto::{DeviceDraft, DeviceStatsDto},
    Device, DeviceId, DeviceStatus, GeoPoint,
};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::{
    api::DeviceApi,
    geo::{resolve_current_location, search_locations, Geocoder, LocationCandidate, PositionSource},
    map::{MapProvider, MapView, Route},
    tracking::{Tracker, TrackingState},
    Result, Settings,
};

use super::{validate_draft, validate_edit};

#[derive(Error, Debug)]
pub enum ScreenError {
    #[error("The screen has been closed")]
    Closed,
    #[error("Response arrived after the screen moved on")]
    Stale,
    #[error("No device with id {0}")]
    NoSuchDevice(DeviceId),
}

#[derive(Debug, Default)]
struct ScreenState {
    devices: Vec<Device>,
    draft: DeviceDraft,
    /// Bumped by reloads and by closing; responses captured under an older epoch are dropped.
    epoch: u64,
    closed: bool,
}

impl ScreenState {
    fn ensure_open(&self) -> std::result::Result<(), ScreenError> {
        if self.closed {
            Err(ScreenError::Closed)
        } else {
            Ok(())
        }
    }

    fn find(&self, id: DeviceId) -> std::result::Result<Device, ScreenError> {
        self.devices
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(ScreenError::NoSuchDevice(id))
    }

    fn replace(&mut self, device: Device) {
        if let Some(slot) = self.devices.iter_mut().find(|d| d.id == device.id) {
            *slot = device;
        }
    }
}

/// The device list and form, with its map and tracking overlay.
///
/// Every operation reads what it needs from the state, releases the lock while the
/// request is in flight and applies the response only if the screen has not moved on.
/// Failed requests leave the state as it was.
pub struct DeviceScreen {
    api: Arc<dyn DeviceApi>,
    settings: Settings,
    state: Arc<Mutex<ScreenState>>,
    tracker: Tracker,
}

impl DeviceScreen {
    pub fn new(api: Arc<dyn DeviceApi>, settings: Settings) -> Self {
        let tracker = Tracker::new(&settings);
        Self {
            api,
            settings,
            state: Arc::new(Mutex::new(ScreenState::default())),
            tracker,
        }
    }

    async fn epoch(&self) -> Result<u64> {
        let state = self.state.lock().await;
        state.ensure_open()?;
        Ok(state.epoch)
    }

    async fn apply<T>(&self, epoch: u64, f: impl FnOnce(&mut ScreenState) -> T) -> Result<T> {
        let mut state = self.state.lock().await;
        if state.closed || state.epoch != epoch {
            log::debug!(
                "dropping response of epoch {} (now {}, closed: {})",
                epoch,
                state.epoch,
                state.closed
            );
            return Err(ScreenError::Stale.into());
        }
        Ok(f(&mut state))
    }

    /// Fetches the whole collection, replacing the local list.
    pub async fn load(&self) -> Result<usize> {
        let epoch = {
            let mut state = self.state.lock().await;
            state.ensure_open()?;
            state.epoch += 1;
            state.epoch
        };
        let devices = self.api.list_devices().await?;
        log::info!("loaded {} devices", devices.len());
        self.apply(epoch, |state| {
            state.devices = devices;
            state.devices.len()
        })
        .await
    }

    pub async fn devices(&self) -> Vec<Device> {
        self.state.lock().await.devices.clone()
    }

    pub async fn device(&self, id: DeviceId) -> Result<Device> {
        Ok(self.state.lock().await.find(id)?)
    }

    pub async fn draft(&self) -> DeviceDraft {
        self.state.lock().await.draft.clone()
    }

    pub async fn set_draft(&self, draft: DeviceDraft) {
        self.state.lock().await.draft = draft;
    }

    pub async fn update_draft(&self, f: impl FnOnce(&mut DeviceDraft)) {
        f(&mut self.state.lock().await.draft);
    }

    /// Sends the draft and puts the created device at the front of the list.
    pub async fn submit(&self) -> Result<Device> {
        let (epoch, draft) = {
            let state = self.state.lock().await;
            state.ensure_open()?;
            (state.epoch, validate_draft(&state.draft)?)
        };
        let device = self.api.create_device(&draft).await?;
        log::info!("created device {} ({})", device.id, device.name);
        self.apply(epoch, |state| {
            state.devices.retain(|d| d.id != device.id);
            state.devices.insert(0, device.clone());
            state.draft = DeviceDraft::default();
            device
        })
        .await
    }

    pub async fn edit(&self, id: DeviceId, draft: &DeviceDraft) -> Result<Device> {
        let epoch = {
            let state = self.state.lock().await;
            state.ensure_open()?;
            state.find(id)?;
            state.epoch
        };
        let draft = validate_edit(draft)?;
        let device = self.api.update_device(id, &draft).await?;
        // the registry has changed even if the screen moved on
        if !device.is_trackable() {
            self.tracker.stop_if_tracking(id).await;
        }
        self.apply(epoch, |state| {
            state.replace(device.clone());
            device
        })
        .await
    }

    /// Returns `false` without touching the registry when `confirm` declines.
    pub async fn delete(&self, id: DeviceId, confirm: impl FnOnce(&Device) -> bool) -> Result<bool> {
        let (epoch, device) = {
            let state = self.state.lock().await;
            state.ensure_open()?;
            (state.epoch, state.find(id)?)
        };
        if !confirm(&device) {
            log::debug!("deletion of device {} declined", id);
            return Ok(false);
        }
        self.api.delete_device(id).await?;
        log::info!("deleted device {}", id);
        self.tracker.stop_if_tracking(id).await;
        self.apply(epoch, |state| state.devices.retain(|d| d.id != id))
            .await?;
        Ok(true)
    }

    /// Flips lost and found. A device that becomes found stops being tracked.
    pub async fn toggle_status(&self, id: DeviceId) -> Result<Device> {
        let (epoch, device) = {
            let state = self.state.lock().await;
            state.ensure_open()?;
            (state.epoch, state.find(id)?)
        };
        let status = device.status.toggled();
        let updated = self.api.update_status(id, status).await?;
        log::info!("device {} is now {}", id, updated.status);
        if updated.status == DeviceStatus::Found {
            self.tracker.stop_if_tracking(id).await;
        }
        self.apply(epoch, |state| {
            state.replace(updated.clone());
            updated
        })
        .await
    }

    /// Searches the registry without touching the local list. A blank query returns the list.
    pub async fn search(&self, query: &str) -> Result<Vec<Device>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(self.devices().await);
        }
        self.epoch().await?;
        self.api.search_devices(query).await
    }

    pub async fn stats(&self) -> Result<DeviceStatsDto> {
        self.epoch().await?;
        self.api.device_stats().await
    }

    pub async fn search_location(
        &self,
        geocoder: &dyn Geocoder,
        query: &str,
    ) -> Result<Vec<LocationCandidate>> {
        search_locations(geocoder, query, self.settings.min_query_length).await
    }

    pub async fn apply_location(&self, candidate: &LocationCandidate) {
        self.update_draft(|draft| {
            draft.location = Some(candidate.label.clone());
            draft.set_position(Some(candidate.position));
        })
        .await;
    }

    pub async fn clear_location(&self) {
        self.update_draft(|draft| {
            draft.location = None;
            draft.set_position(None);
        })
        .await;
    }

    /// Fills the draft from the current position. Failures leave the draft unchanged.
    pub async fn use_current_position(
        &self,
        source: &dyn PositionSource,
        geocoder: &dyn Geocoder,
    ) -> Result<LocationCandidate> {
        let epoch = self.epoch().await?;
        let candidate = resolve_current_location(source, geocoder).await?;
        self.apply(epoch, |state| {
            state.draft.location = Some(candidate.label.clone());
            state.draft.set_position(Some(candidate.position));
        })
        .await?;
        Ok(candidate)
    }

    pub async fn start_tracking(&self, id: DeviceId) -> Result<()> {
        let device = {
            let state = self.state.lock().await;
            state.ensure_open()?;
            state.find(id)?
        };
        self.tracker.start(&device).await
    }

    pub async fn stop_tracking(&self) {
        self.tracker.stop().await;
    }

    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// Markers for every geo-tagged device, with the simulated route while tracking.
    pub async fn map_view(&self, provider: &dyn MapProvider) -> MapView {
        let view = provider.build_view(&self.devices().await, &self.settings);
        let snapshot = self.tracker.snapshot().await;
        if snapshot.state == TrackingState::Idle || snapshot.route.is_empty() {
            view
        } else {
            view.with_route(Route::simulated(snapshot.route))
        }
    }

    /// Map view with a provider route from `from` to the device.
    pub async fn route_to(
        &self,
        provider: &dyn MapProvider,
        from: GeoPoint,
        id: DeviceId,
    ) -> Result<MapView> {
        let device = self.device(id).await?;
        let to = device
            .position()
            .ok_or(crate::tracking::TrackingError::NoPosition)?;
        let route = provider.route(from, to).await?;
        log::info!(
            "{} route to device {}: {} points",
            provider.name(),
            id,
            route.points.len()
        );
        let view = provider.build_view(&self.devices().await, &self.settings);
        Ok(view.with_route(route))
    }

    /// Leaves the screen: in-flight responses are discarded and tracking stops.
    pub async fn close(&self) {
        {
            let mut state = self.state.lock().await;
            state.closed = true;
            state.epoch += 1;
        }
        self.tracker.stop().await;
    }

    pub async fn is_closed(&self) -> bool {
        self.state.lock().await.closed
    }
}
