use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Reqwest(#[from] reqwest::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Api(#[from] crate::api::ApiError),
    #[error(transparent)]
    Draft(#[from] crate::screen::DraftError),
    #[error(transparent)]
    Screen(#[from] crate::screen::ScreenError),
    #[error(transparent)]
    Geo(#[from] crate::geo::GeoError),
    #[error(transparent)]
    Map(#[from] crate::map::MapError),
    #[error(transparent)]
    Tracking(#[from] crate::tracking::TrackingError),
    #[error(transparent)]
    Session(#[from] crate::session::SessionError),
}

impl Error {
    /// Transport failures, as opposed to rejections the registry answered with.
    pub fn is_network(&self) -> bool {
        match self {
            Error::Reqwest(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}
