use lostfound_proto::dto::ErrorDto;
use reqwest::{Response, StatusCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message} ({status})")]
    Rejected { status: StatusCode, message: String },
    #[error("Session expired or invalid, please log in again")]
    Unauthorized,
    #[error("Not allowed to access this resource")]
    Forbidden,
    #[error("Device not found")]
    NotFound,
    #[error("Unknown response status code: {0}")]
    Unknown(StatusCode),
}

impl ApiError {
    pub fn from_status(status: StatusCode, dto: &ErrorDto) -> Self {
        if let Some(reason) = dto.reason() {
            return ApiError::Rejected {
                status,
                message: reason.to_string(),
            };
        }
        match status {
            // 401, 422 is what flask-jwt answers for a malformed token
            StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY => ApiError::Unauthorized,
            // 403
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            // 404
            StatusCode::NOT_FOUND => ApiError::NotFound,
            _ => ApiError::Unknown(status),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Rejected { status, .. } => *status,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Unknown(status) => *status,
        }
    }
}

/// Passes successful responses through and turns everything else into an [`ApiError`].
pub(crate) async fn check(response: Response) -> crate::Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let dto: ErrorDto = serde_json::from_str(&body).unwrap_or_default();
    log::warn!("{} rejected: {}", status, body.trim());
    Err(ApiError::from_status(status, &dto).into())
}

#[cfg(test)]
mod tests {
    use lostfound_proto::dto::ErrorDto;
    use reqwest::StatusCode;

    use super::ApiError;

    #[test]
    fn test_reason_wins_over_status() {
        let dto = ErrorDto {
            message: Some("Device name is required".to_owned()),
            error: None,
        };
        let error = ApiError::from_status(StatusCode::BAD_REQUEST, &dto);
        assert_eq!("Device name is required (400 Bad Request)", error.to_string());
        assert_eq!(StatusCode::BAD_REQUEST, error.status());
    }

    #[test]
    fn test_status_fallbacks() {
        let dto = ErrorDto::default();
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, &dto),
            ApiError::Unauthorized
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, &dto),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::BAD_GATEWAY, &dto),
            ApiError::Unknown(StatusCode::BAD_GATEWAY)
        ));
    }
}
