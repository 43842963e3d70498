use async_trait::async_trait;
use lostfound_proto::{
    dto::{
        AdminStatsDto, DeviceDraft, DeviceStatsDto, HealthDto, LoginRequestDto, LoginResponseDto,
        RegisterRequestDto, StatusUpdateDto, StatusUpdateResponseDto,
    },
    ApiRoute, Device, DeviceId, DeviceStatus,
};
use reqwest::{Client, Method, RequestBuilder};

use crate::{
    session::{Session, SessionContext},
    Result, Settings,
};

use super::check;

/// Device operations a screen needs from the registry.
#[async_trait]
pub trait DeviceApi: Send + Sync {
    async fn list_devices(&self) -> Result<Vec<Device>>;

    async fn create_device(&self, draft: &DeviceDraft) -> Result<Device>;

    async fn update_device(&self, id: DeviceId, draft: &DeviceDraft) -> Result<Device>;

    async fn update_status(&self, id: DeviceId, status: DeviceStatus) -> Result<Device>;

    async fn delete_device(&self, id: DeviceId) -> Result<()>;

    async fn search_devices(&self, query: &str) -> Result<Vec<Device>>;

    async fn device_stats(&self) -> Result<DeviceStatsDto>;
}

#[derive(Clone, Debug)]
pub struct RegistryClient {
    base_url: String,
    session: SessionContext,
    client: Client,
}

impl RegistryClient {
    pub fn new(settings: &Settings, session: SessionContext) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            session,
            client: super::client_for(settings),
        }
    }

    pub fn with_client(base_url: impl ToString, session: SessionContext, client: Client) -> Self {
        Self {
            base_url: base_url.to_string(),
            session,
            client,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    async fn request(&self, method: Method, route: ApiRoute) -> Result<RequestBuilder> {
        let url = route.target(&self.base_url);
        log::debug!("{} {}", method, url);
        let builder = self.client.request(method, url);
        if route.requires_auth() {
            let token = self.session.token().await?;
            Ok(builder.bearer_auth(token))
        } else {
            Ok(builder)
        }
    }

    pub async fn register(&self, dto: &RegisterRequestDto) -> Result<()> {
        let response = self
            .request(Method::POST, ApiRoute::Register)
            .await?
            .json(dto)
            .send()
            .await?;
        check(response).await?;
        log::info!("registered {}", dto.username);
        Ok(())
    }

    /// Logs in and begins the shared session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session> {
        let dto = LoginRequestDto {
            username: username.to_owned(),
            password: password.to_owned(),
        };
        let response = self
            .request(Method::POST, ApiRoute::Login)
            .await?
            .json(&dto)
            .send()
            .await?;
        let response = check(response).await?.json::<LoginResponseDto>().await?;
        let username = response.username.unwrap_or(dto.username);
        Ok(self.session.begin(username, response.token).await)
    }

    pub async fn logout(&self) -> Option<Session> {
        self.session.end().await
    }

    pub async fn health(&self) -> Result<HealthDto> {
        let response = self
            .request(Method::GET, ApiRoute::Health)
            .await?
            .send()
            .await?;
        // an unhealthy registry answers 500 with the same body
        Ok(response.json::<HealthDto>().await?)
    }

    /// Every user's devices. Non-admin accounts are rejected with 403.
    pub async fn admin_devices(&self) -> Result<Vec<Device>> {
        let response = self
            .request(Method::GET, ApiRoute::AdminDevices)
            .await?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn admin_stats(&self) -> Result<AdminStatsDto> {
        let response = self
            .request(Method::GET, ApiRoute::AdminStats)
            .await?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

#[async_trait]
impl DeviceApi for RegistryClient {
    async fn list_devices(&self) -> Result<Vec<Device>> {
        let response = self
            .request(Method::GET, ApiRoute::Devices)
            .await?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn create_device(&self, draft: &DeviceDraft) -> Result<Device> {
        let response = self
            .request(Method::POST, ApiRoute::Devices)
            .await?
            .json(draft)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_device(&self, id: DeviceId, draft: &DeviceDraft) -> Result<Device> {
        let response = self
            .request(Method::PUT, ApiRoute::Device(id))
            .await?
            .json(draft)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update_status(&self, id: DeviceId, status: DeviceStatus) -> Result<Device> {
        let response = self
            .request(Method::PATCH, ApiRoute::DeviceStatus(id))
            .await?
            .json(&StatusUpdateDto { status })
            .send()
            .await?;
        let dto = check(response)
            .await?
            .json::<StatusUpdateResponseDto>()
            .await?;
        Ok(dto.into_device())
    }

    async fn delete_device(&self, id: DeviceId) -> Result<()> {
        let response = self
            .request(Method::DELETE, ApiRoute::Device(id))
            .await?
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    async fn search_devices(&self, query: &str) -> Result<Vec<Device>> {
        let response = self
            .request(Method::GET, ApiRoute::DeviceSearch)
            .await?
            .query(&[("q", query)])
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn device_stats(&self) -> Result<DeviceStatsDto> {
        let response = self
            .request(Method::GET, ApiRoute::DeviceStats)
            .await?
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}
