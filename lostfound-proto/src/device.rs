use std::fmt;

use serde::{Deserialize, Serialize};

use crate::GeoPoint;

pub type DeviceId = i64;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceStatus {
    Lost,
    Found,
}

impl Default for DeviceStatus {
    fn default() -> Self {
        Self::Lost
    }
}

impl DeviceStatus {
    pub fn toggled(self) -> Self {
        match self {
            DeviceStatus::Lost => DeviceStatus::Found,
            DeviceStatus::Found => DeviceStatus::Lost,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Lost => "lost",
            DeviceStatus::Found => "found",
        }
    }
}

impl fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted record as returned by the registry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub status: DeviceStatus,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

impl Device {
    /// Only devices carrying both coordinates have a position.
    pub fn position(&self) -> Option<GeoPoint> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(latitude, longitude)),
            _ => None,
        }
    }

    pub fn is_trackable(&self) -> bool {
        self.status == DeviceStatus::Lost && self.position().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::{Device, DeviceStatus};

    #[test]
    fn test_toggle_stays_within_enum() {
        assert_eq!(DeviceStatus::Found, DeviceStatus::Lost.toggled());
        assert_eq!(DeviceStatus::Lost, DeviceStatus::Found.toggled());
        assert_eq!(DeviceStatus::Lost, DeviceStatus::Lost.toggled().toggled());
    }

    #[test]
    pub fn test_deserialize_server_record() {
        let json = r#"{"id":7,"name":"Phone","description":"","category":"phone","location":"Main St","status":"found","latitude":null,"longitude":2.35,"created_at":"2024-05-01T10:00:00","updated_at":null,"user_id":3}"#;
        let device: Device = serde_json::from_str(json).unwrap();
        assert_eq!(7, device.id);
        assert_eq!(DeviceStatus::Found, device.status);
        assert_eq!(None, device.position());
        assert!(!device.is_trackable());
    }

    #[test]
    pub fn test_missing_status_defaults_to_lost() {
        let device: Device =
            serde_json::from_str(r#"{"id":1,"name":"Keys","latitude":1.0,"longitude":2.0}"#)
                .unwrap();
        assert_eq!(DeviceStatus::Lost, device.status);
        assert!(device.is_trackable());
    }

    #[test]
    pub fn test_unknown_status_is_rejected() {
        let result = serde_json::from_str::<Device>(r#"{"id":1,"name":"Keys","status":"stolen"}"#);
        assert!(result.is_err());
    }
}
