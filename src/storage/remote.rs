use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{CACHE_CONTROL, HeaderValue};
use url::Url;

use crate::{Error, Result};

use super::REMOTE_PATH;
use super::loader::RemoteSource;

const TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches the published document over HTTP, bypassing caches.
pub struct HttpSource {
    client: Client,
    url: Url,
}

impl HttpSource {
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder()
            .timeout(TIMEOUT)
            .user_agent(concat!("blockpage/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, url })
    }

    /// Source for the published document of the site at `origin`.
    pub fn for_origin(origin: &Url) -> Result<Self> {
        let url = origin.join(REMOTE_PATH).map_err(|err| Error::Network(err.to_string()))?;
        Self::new(url)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl RemoteSource for HttpSource {
    fn fetch(&self) -> Result<String> {
        let _scope = crate::perf::scope("storage.fetch").with("url", &self.url);
        let response = self
            .client
            .get(self.url.clone())
            .header(CACHE_CONTROL, HeaderValue::from_static("no-store"))
            .send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                url: self.url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}
