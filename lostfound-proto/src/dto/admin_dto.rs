use serde::{Deserialize, Serialize};

/// Registry-wide counts, only served to administrators.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AdminStatsDto {
    #[serde(default)]
    pub users: u64,
    #[serde(default)]
    pub devices: u64,
    #[serde(default)]
    pub lost: u64,
    #[serde(default)]
    pub found: u64,
}

#[cfg(test)]
mod tests {
    use super::AdminStatsDto;

    #[test]
    pub fn test_admin_stats_serde_json() {
        let dto_str = r#"{"users":3,"devices":7,"lost":5,"found":2}"#;
        let dto = serde_json::from_str::<AdminStatsDto>(dto_str).unwrap();
        assert_eq!(
            AdminStatsDto {
                users: 3,
                devices: 7,
                lost: 5,
                found: 2
            },
            dto
        );
    }
}
