//! Bing "image of the day" metadata via the HPImageArchive JSON endpoint.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use chromadesk_core::ports::MetadataFetcher;
use chromadesk_core::{FeaturedImageInfo, FetchError};

pub const BING_BASE_URL: &str = "https://www.bing.com";

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    #[serde(default)]
    images: Vec<ArchiveImage>,
}

#[derive(Debug, Deserialize)]
struct ArchiveImage {
    startdate: Option<String>,
    url: Option<String>,
    title: Option<String>,
    copyright: Option<String>,
}

pub struct BingFetcher {
    client: Client,
    base: Url,
}

impl BingFetcher {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self::with_client(crate::http::client(FETCH_TIMEOUT)?, BING_BASE_URL)?)
    }

    pub fn with_client(client: Client, base: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            base: Url::parse(base)?,
        })
    }

    pub fn archive_url(&self, region: &str) -> Result<Url, url::ParseError> {
        let mut url = self.base.join("HPImageArchive.aspx")?;
        url.query_pairs_mut()
            .append_pair("format", "js")
            .append_pair("idx", "0")
            .append_pair("n", "1")
            .append_pair("mkt", region);
        Ok(url)
    }
}

impl MetadataFetcher for BingFetcher {
    fn fetch(&self, region: &str) -> Result<FeaturedImageInfo, FetchError> {
        let url = self
            .archive_url(region)
            .map_err(|e| FetchError::Malformed(format!("archive url: {e}")))?;
        debug!(%url, "HTTP GET image archive");

        let resp = self.client.get(url.clone()).send().map_err(|e| {
            warn!(%url, error = %e, "Image archive request failed");
            FetchError::Transport(e.to_string())
        })?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        let body = resp
            .text()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        parse_archive(&body, &self.base)
    }
}

/// Turn an HPImageArchive JSON body into image info. Relative image URLs resolve against `base`.
pub fn parse_archive(body: &str, base: &Url) -> Result<FeaturedImageInfo, FetchError> {
    let resp: ArchiveResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;
    let image = resp
        .images
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("no images in response".into()))?;

    let rel = image
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or(FetchError::MissingUrl)?;
    let full_url = base
        .join(rel.trim())
        .map_err(|e| FetchError::Malformed(format!("image url {rel:?}: {e}")))?;

    let raw_date = image.startdate.unwrap_or_default();
    let date = NaiveDate::parse_from_str(raw_date.trim(), "%Y%m%d")
        .map_err(|_| FetchError::Malformed(format!("startdate {raw_date:?}")))?;

    Ok(FeaturedImageInfo {
        date,
        title: non_empty(image.title),
        copyright: non_empty(image.copyright),
        full_url: full_url.into(),
    })
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse(BING_BASE_URL).unwrap()
    }

    const SAMPLE: &str = r#"{
        "images": [{
            "startdate": "20240101",
            "fullstartdate": "202401010800",
            "url": "/th?id=OHR.Lake_EN-US123_1920x1080.jpg&rid=hp&pid=hp",
            "urlbase": "/th?id=OHR.Lake_EN-US123",
            "copyright": "A lake (© Someone)",
            "title": "Still waters"
        }],
        "tooltips": {}
    }"#;

    #[test]
    fn parses_sample_response() {
        let info = parse_archive(SAMPLE, &base()).unwrap();
        assert_eq!(info.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(info.title.as_deref(), Some("Still waters"));
        assert_eq!(info.copyright.as_deref(), Some("A lake (© Someone)"));
        assert_eq!(
            info.full_url,
            "https://www.bing.com/th?id=OHR.Lake_EN-US123_1920x1080.jpg&rid=hp&pid=hp"
        );
    }

    #[test]
    fn absolute_url_is_kept() {
        let body = r#"{"images":[{"startdate":"20240102","url":"https://cdn.example/a.jpg"}]}"#;
        let info = parse_archive(body, &base()).unwrap();
        assert_eq!(info.full_url, "https://cdn.example/a.jpg");
        assert_eq!(info.title, None);
        assert_eq!(info.display_title(), "Unknown Title");
    }

    #[test]
    fn missing_url_is_a_fetch_error() {
        let body = r#"{"images":[{"startdate":"20240101","title":"T"}]}"#;
        assert!(matches!(parse_archive(body, &base()), Err(FetchError::MissingUrl)));

        let body = r#"{"images":[{"startdate":"20240101","url":"  "}]}"#;
        assert!(matches!(parse_archive(body, &base()), Err(FetchError::MissingUrl)));
    }

    #[test]
    fn malformed_bodies_are_fetch_errors() {
        for body in [
            "not json",
            r#"{"images":[]}"#,
            r#"{}"#,
            r#"{"images":[{"startdate":"yesterday","url":"/a.jpg"}]}"#,
        ] {
            assert!(
                matches!(parse_archive(body, &base()), Err(FetchError::Malformed(_))),
                "{body}"
            );
        }
    }

    #[test]
    fn archive_url_carries_region() {
        let f = BingFetcher::with_client(Client::new(), BING_BASE_URL).unwrap();
        let url = f.archive_url("de-DE").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.bing.com/HPImageArchive.aspx?format=js&idx=0&n=1&mkt=de-DE"
        );
    }
}
