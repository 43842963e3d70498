mod tracker;
mod tracking_session;

pub use tracker::*;
pub use tracking_session::*;
