//! Blocking reqwest client implementing [`ImageTransport`].

use std::io::Write;
use std::time::Duration;

use chromadesk_core::ports::ImageTransport;
use chromadesk_core::DownloadError;
use reqwest::blocking::Client;
use tracing::{debug, warn};

pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(60);

pub(crate) fn client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self::from_client(client(DOWNLOAD_TIMEOUT)?))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

impl ImageTransport for HttpTransport {
    fn download(&self, url: &str, out: &mut dyn Write) -> Result<u64, DownloadError> {
        debug!(url, "HTTP GET image");
        let mut resp = self.client.get(url).send().map_err(|e| {
            warn!(url, error = %e, "Image request failed");
            DownloadError::Transport(e.to_string())
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }

        resp.copy_to(out)
            .map_err(|e| DownloadError::Transport(e.to_string()))
    }
}
