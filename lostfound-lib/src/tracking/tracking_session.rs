use lostfound_proto::{Device, DeviceId, DeviceStatus, GeoPoint};
use rand::Rng;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum TrackingError {
    #[error("Only lost devices can be tracked")]
    NotLost,
    #[error("Device has no coordinates to track from")]
    NoPosition,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrackingState {
    Idle,
    Active,
    Stopped,
}

/// Simulated walk of a lost device.
///
/// Each [`advance`](Self::advance) appends a point jittered from the previous one until
/// the route holds `cap` points. The route starts with the device's own position.
#[derive(Debug, Clone)]
pub struct TrackingSession {
    state: TrackingState,
    device_id: Option<DeviceId>,
    route: Vec<GeoPoint>,
    cap: usize,
    jitter: f64,
}

impl TrackingSession {
    pub fn new(cap: usize, jitter: f64) -> Self {
        Self {
            state: TrackingState::Idle,
            device_id: None,
            route: Vec::new(),
            cap: cap.max(1),
            jitter: jitter.abs(),
        }
    }

    /// Rejections leave the current session untouched.
    pub fn start(&mut self, device: &Device) -> Result<(), TrackingError> {
        if device.status != DeviceStatus::Lost {
            return Err(TrackingError::NotLost);
        }
        let position = device.position().ok_or(TrackingError::NoPosition)?;

        self.device_id = Some(device.id);
        self.route.clear();
        self.route.push(position);
        self.state = if self.route.len() >= self.cap {
            TrackingState::Stopped
        } else {
            TrackingState::Active
        };
        Ok(())
    }

    /// Returns whether the session is still active afterwards.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.state != TrackingState::Active {
            return false;
        }
        let last = match self.route.last() {
            Some(last) => *last,
            None => {
                self.state = TrackingState::Stopped;
                return false;
            }
        };

        let next = last.offset(
            rng.gen_range(-self.jitter..=self.jitter),
            rng.gen_range(-self.jitter..=self.jitter),
        );
        self.route.push(next);

        if self.route.len() >= self.cap {
            log::debug!("route of device {:?} reached {} points", self.device_id, self.cap);
            self.state = TrackingState::Stopped;
            return false;
        }
        true
    }

    pub fn stop(&mut self) {
        self.state = TrackingState::Idle;
        self.device_id = None;
        self.route.clear();
    }

    pub fn state(&self) -> TrackingState {
        self.state
    }

    pub fn device_id(&self) -> Option<DeviceId> {
        self.device_id
    }

    pub fn route(&self) -> &[GeoPoint] {
        &self.route
    }

    pub fn cap(&self) -> usize {
        self.cap
    }
}

#[cfg(test)]
mod tests {
    use lostfound_proto::{Device, DeviceStatus};
    use rand::{rngs::StdRng, SeedableRng};

    use super::{TrackingError, TrackingSession, TrackingState};

    fn device(status: DeviceStatus, position: Option<(f64, f64)>) -> Device {
        Device {
            id: 9,
            name: "Bike".to_owned(),
            description: None,
            category: None,
            location: None,
            status,
            latitude: position.map(|p| p.0),
            longitude: position.map(|p| p.1),
            created_at: None,
            updated_at: None,
            user_id: None,
        }
    }

    #[test]
    fn test_found_device_is_rejected_without_state_change() {
        let mut session = TrackingSession::new(5, 0.001);
        session
            .start(&device(DeviceStatus::Lost, Some((1.0, 2.0))))
            .unwrap();
        let before = session.route().to_vec();

        let result = session.start(&device(DeviceStatus::Found, Some((3.0, 4.0))));
        assert_eq!(Err(TrackingError::NotLost), result);
        assert_eq!(TrackingState::Active, session.state());
        assert_eq!(before, session.route());
    }

    #[test]
    fn test_device_without_position_is_rejected() {
        let mut session = TrackingSession::new(5, 0.001);
        let result = session.start(&device(DeviceStatus::Lost, None));
        assert_eq!(Err(TrackingError::NoPosition), result);
        assert_eq!(TrackingState::Idle, session.state());
        assert!(session.route().is_empty());
    }

    #[test]
    fn test_route_stops_at_cap() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut session = TrackingSession::new(4, 0.001);
        session
            .start(&device(DeviceStatus::Lost, Some((10.0, 20.0))))
            .unwrap();

        assert!(session.advance(&mut rng));
        assert!(session.advance(&mut rng));
        assert!(!session.advance(&mut rng));
        assert_eq!(TrackingState::Stopped, session.state());
        assert_eq!(4, session.route().len());

        for _ in 0..10 {
            assert!(!session.advance(&mut rng));
        }
        assert_eq!(4, session.route().len());
    }

    #[test]
    fn test_steps_stay_within_jitter() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut session = TrackingSession::new(50, 0.001);
        session
            .start(&device(DeviceStatus::Lost, Some((10.0, 20.0))))
            .unwrap();
        while session.advance(&mut rng) {}

        for pair in session.route().windows(2) {
            assert!((pair[1].latitude - pair[0].latitude).abs() <= 0.001 + 1e-9);
            assert!((pair[1].longitude - pair[0].longitude).abs() <= 0.001 + 1e-9);
        }
    }

    #[test]
    fn test_stop_clears_route() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut session = TrackingSession::new(10, 0.001);
        session
            .start(&device(DeviceStatus::Lost, Some((0.0, 0.0))))
            .unwrap();
        session.advance(&mut rng);
        session.stop();

        assert_eq!(TrackingState::Idle, session.state());
        assert_eq!(None, session.device_id());
        assert!(session.route().is_empty());
        assert!(!session.advance(&mut rng));
    }

    #[test]
    fn test_cap_of_one_stops_immediately() {
        let mut session = TrackingSession::new(0, 0.001);
        session
            .start(&device(DeviceStatus::Lost, Some((0.0, 0.0))))
            .unwrap();
        assert_eq!(TrackingState::Stopped, session.state());
        assert_eq!(1, session.route().len());
    }
}
