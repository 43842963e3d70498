mod constants;
mod device;
mod geo;
mod route;

pub mod dto;
pub use constants::*;
pub use device::*;
pub use geo::*;
pub use route::*;
