// 🌐 Fetcher - raw GET of a remote resource
// The only network touchpoint. Production uses a blocking reqwest client;
// tests plug in an in-memory implementation.

use crate::error::BoxError;
use std::time::Duration;

/// Fetch a URL and return its body as raw bytes
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BoxError>;

    /// Fetch and decode as UTF-8 text (lossy, like a browser would)
    fn fetch_text(&self, url: &str) -> Result<String, BoxError> {
        let bytes = self.fetch(url)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Blocking HTTP fetcher. No timeout and no retry: a hung request hangs the run.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, BoxError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(None::<Duration>)
            .user_agent(concat!("banks-etl/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(HttpFetcher { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>, BoxError> {
        log::debug!("GET {}", url);

        let response = self.client.get(url).send()?.error_for_status()?;
        let bytes = response.bytes()?;

        log::debug!("GET {} -> {} bytes", url, bytes.len());
        Ok(bytes.to_vec())
    }
}
