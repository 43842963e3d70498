use crate::DeviceId;

pub enum ApiRoute {
    Devices,
    Device(DeviceId),
    DeviceStatus(DeviceId),
    DeviceSearch,
    DeviceStats,
    Register,
    Login,
    Health,
    AdminDevices,
    AdminStats,
}

impl ApiRoute {
    pub fn path(&self) -> String {
        match self {
            ApiRoute::Devices => "/devices".to_owned(),
            ApiRoute::Device(id) => format!("/devices/{}", id),
            ApiRoute::DeviceStatus(id) => format!("/devices/{}/status", id),
            ApiRoute::DeviceSearch => "/devices/search".to_owned(),
            ApiRoute::DeviceStats => "/devices/stats".to_owned(),
            ApiRoute::Register => "/api/auth/register".to_owned(),
            ApiRoute::Login => "/api/auth/login".to_owned(),
            ApiRoute::Health => "/health".to_owned(),
            ApiRoute::AdminDevices => "/admin/devices".to_owned(),
            ApiRoute::AdminStats => "/admin/stats".to_owned(),
        }
    }

    pub fn target(&self, base_url: impl AsRef<str>) -> String {
        format!("{}{}", base_url.as_ref().trim_end_matches('/'), self.path())
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(
            self,
            ApiRoute::Register | ApiRoute::Login | ApiRoute::Health
        )
    }
}
