use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct HealthStatsDto {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub devices: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HealthDto {
    pub status: String,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub stats: Option<HealthStatsDto>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthDto {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
