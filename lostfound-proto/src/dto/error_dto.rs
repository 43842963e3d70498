use serde::{Deserialize, Serialize};

/// Rejection payload. The registry uses `message` for client errors and `error` for server failures.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ErrorDto {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorDto {
    pub fn reason(&self) -> Option<&str> {
        self.message.as_deref().or(self.error.as_deref())
    }
}
