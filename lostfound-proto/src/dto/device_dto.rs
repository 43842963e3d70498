use serde::{Deserialize, Serialize};

use crate::{Device, DeviceStatus, GeoPoint};

/// Body of create and edit requests. Carries no `id` or timestamps.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceDraft {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub status: DeviceStatus,
    // always sent so an edit can clear coordinates
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl DeviceDraft {
    pub fn new(name: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn set_position(&mut self, position: Option<GeoPoint>) {
        self.latitude = position.map(|p| p.latitude);
        self.longitude = position.map(|p| p.longitude);
    }
}

impl From<&Device> for DeviceDraft {
    fn from(device: &Device) -> Self {
        Self {
            name: device.name.clone(),
            description: device.description.clone(),
            category: device.category.clone(),
            location: device.location.clone(),
            status: device.status,
            latitude: device.latitude,
            longitude: device.longitude,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdateDto {
    pub status: DeviceStatus,
}

/// The registry answers a status change either with `{message, device}` or with the bare record.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum StatusUpdateResponseDto {
    Wrapped {
        #[serde(default)]
        message: Option<String>,
        device: Device,
    },
    Bare(Device),
}

impl StatusUpdateResponseDto {
    pub fn into_device(self) -> Device {
        match self {
            StatusUpdateResponseDto::Wrapped { device, .. } => device,
            StatusUpdateResponseDto::Bare(device) => device,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeviceStatsDto {
    #[serde(default, alias = "devices")]
    pub total: u64,
    #[serde(default)]
    pub lost: u64,
    #[serde(default)]
    pub found: u64,
}

#[cfg(test)]
mod tests {
    use crate::{DeviceStatus, GeoPoint};

    use super::{DeviceDraft, StatusUpdateResponseDto};

    #[test]
    pub fn test_draft_serde_json() {
        let mut draft = DeviceDraft::new("Phone");
        draft.category = Some("phone".to_owned());
        let dto_str = r#"{"name":"Phone","category":"phone","status":"lost","latitude":null,"longitude":null}"#;
        assert_eq!(dto_str, serde_json::to_string(&draft).unwrap());

        draft.set_position(Some(GeoPoint::new(48.85, 2.35)));
        let value = serde_json::to_value(&draft).unwrap();
        assert_eq!(48.85, value["latitude"]);
        assert_eq!(2.35, value["longitude"]);
    }

    #[test]
    pub fn test_status_response_shapes() {
        let wrapped = r#"{"message":"Device status updated to found","device":{"id":4,"name":"Bag","status":"found"}}"#;
        let bare = r#"{"id":4,"name":"Bag","status":"found"}"#;
        for json in [wrapped, bare] {
            let device = serde_json::from_str::<StatusUpdateResponseDto>(json)
                .unwrap()
                .into_device();
            assert_eq!(4, device.id);
            assert_eq!(DeviceStatus::Found, device.status);
        }
    }
}
