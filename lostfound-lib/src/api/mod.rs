use std::time::Duration;

use once_cell::sync::Lazy;
use reqwest::Client;

use crate::{Settings, DEFAULT_REQUEST_TIMEOUT};

mod client;
mod error;

pub use client::*;
pub use error::*;

static CLIENT: Lazy<Client> = Lazy::new(|| build_client(DEFAULT_REQUEST_TIMEOUT));

/// Shared client for the default timeout, a dedicated one otherwise.
pub(crate) fn client_for(settings: &Settings) -> Client {
    if settings.request_timeout == DEFAULT_REQUEST_TIMEOUT {
        CLIENT.clone()
    } else {
        build_client(settings.request_timeout)
    }
}

pub(crate) fn build_client(timeout: Duration) -> Client {
    reqwest::ClientBuilder::new()
        .user_agent(concat!("lostfound/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
        .expect("Failed to create reqwest client")
}
