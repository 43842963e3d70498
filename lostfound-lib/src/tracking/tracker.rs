use std::{sync::Arc, time::Duration};

use lostfound_proto::{Device, DeviceId, GeoPoint};
use rand::{rngs::StdRng, SeedableRng};
use tokio::{
    sync::Mutex,
    task::JoinHandle,
    time::{interval_at, Instant},
};
use uuid::Uuid;

use crate::{Result, Settings};

use super::{TrackingSession, TrackingState};

#[derive(Debug, Clone, PartialEq)]
pub struct TrackingSnapshot {
    pub session_id: Option<String>,
    pub state: TrackingState,
    pub device_id: Option<DeviceId>,
    pub route: Vec<GeoPoint>,
}

#[derive(Debug)]
struct TrackerState {
    session_id: Option<String>,
    session: TrackingSession,
    timer: Option<JoinHandle<()>>,
}

impl TrackerState {
    fn abort_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

/// Drives a [`TrackingSession`] from a repeating timer task.
///
/// The timer is the only background task of a screen. It is aborted on stop, when a new
/// session replaces the current one and when the tracker is dropped.
#[derive(Debug)]
pub struct Tracker {
    state: Arc<Mutex<TrackerState>>,
    interval: Duration,
}

impl Tracker {
    pub fn new(settings: &Settings) -> Self {
        Self::with_params(settings.track_interval, settings.track_cap, settings.track_jitter)
    }

    pub fn with_params(interval: Duration, cap: usize, jitter: f64) -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                session_id: None,
                session: TrackingSession::new(cap, jitter),
                timer: None,
            })),
            interval,
        }
    }

    pub async fn start(&self, device: &Device) -> Result<()> {
        let mut state = self.state.lock().await;
        state.session.start(device)?;
        state.abort_timer();

        let session_id = Uuid::new_v4().to_string();
        log::info!(
            "tracking session {} started for device {}",
            session_id,
            device.id
        );
        state.session_id = Some(session_id);
        if state.session.state() == TrackingState::Active {
            state.timer = Some(self.spawn_timer());
        }
        Ok(())
    }

    fn spawn_timer(&self) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.state);
        let period = self.interval;
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                let Some(state) = weak.upgrade() else {
                    break;
                };
                let mut state = state.lock().await;
                if !state.session.advance(&mut rng) {
                    log::debug!("tracking session {:?} stopped", state.session_id);
                    // the handle is ours, dropping it detaches without aborting
                    state.timer.take();
                    break;
                }
            }
        })
    }

    /// Ends the session, clears the route and cancels the timer.
    pub async fn stop(&self) {
        let mut state = self.state.lock().await;
        state.abort_timer();
        if let Some(session_id) = state.session_id.take() {
            log::info!("tracking session {} stopped", session_id);
        }
        state.session.stop();
    }

    /// Stops only when `device_id` is the tracked device.
    pub async fn stop_if_tracking(&self, device_id: DeviceId) -> bool {
        if self.tracked_device().await == Some(device_id) {
            self.stop().await;
            true
        } else {
            false
        }
    }

    pub async fn tracked_device(&self) -> Option<DeviceId> {
        self.state.lock().await.session.device_id()
    }

    pub async fn is_running(&self) -> bool {
        self.state
            .lock()
            .await
            .timer
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    pub async fn snapshot(&self) -> TrackingSnapshot {
        let state = self.state.lock().await;
        TrackingSnapshot {
            session_id: state.session_id.clone(),
            state: state.session.state(),
            device_id: state.session.device_id(),
            route: state.session.route().to_vec(),
        }
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_lock() {
            state.abort_timer();
        }
    }
}
