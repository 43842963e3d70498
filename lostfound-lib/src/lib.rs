pub mod api;
mod error;
pub mod geo;
pub mod map;
pub mod screen;
pub mod session;
mod settings;
pub mod tracking;

pub type Result<T> = std::result::Result<T, error::Error>;

pub use error::*;
pub use settings::*;
