mod admin_dto;
mod auth_dto;
mod device_dto;
mod error_dto;
mod health_dto;

pub use admin_dto::*;
pub use auth_dto::*;
pub use device_dto::*;
pub use error_dto::*;
pub use health_dto::*;
