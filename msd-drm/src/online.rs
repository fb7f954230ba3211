use crate::{DrmError, MatchFields, OnlineClient, Result};
use std::{io, time::Duration};

/// Blocking [`OnlineClient`] backed by reqwest. Only cover art fetching is
/// wired up; vendor track lookup endpoints are not bundled with this crate.
#[derive(Clone)]
pub struct HttpOnlineClient {
    client: reqwest::blocking::Client,
}

impl HttpOnlineClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(io::Error::other)?;
        Ok(Self { client })
    }
}

impl OnlineClient for HttpOnlineClient {
    fn fetch_cover(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(io::Error::other)?;
        let bytes = response.bytes().map_err(io::Error::other)?;
        Ok(bytes.to_vec())
    }

    fn match_track(&self, id: u64) -> Result<MatchFields> {
        Err(DrmError::Io(io::Error::other(format!(
            "no lookup endpoint configured for track {}",
            id
        ))))
    }
}
