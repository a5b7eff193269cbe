// src/source/http.rs
use async_trait::async_trait;
use reqwest::{header, Url};
use std::time::Duration;

use crate::source::{VersionObject, VersionSource};
use crate::utils::error::SourceError;

const USER_AGENT: &str = concat!("lcp_compare/", env!("CARGO_PKG_VERSION"));
const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 120;

/// Version store behind an HTTP API:
/// `GET {base}/cases/{case_id}/versions` returns a JSON list of objects and
/// `GET {base}/objects/{key}` returns an object's bytes.
#[derive(Debug, Clone)]
pub struct HttpVersionSource {
    base_url: Url,
    client: reqwest::Client,
}

/// Creates a reqwest client configured for the version store.
fn build_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
        .build()
}

impl HttpVersionSource {
    pub fn new(base_url: &str) -> Result<Self, SourceError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| SourceError::Parse(format!("Invalid base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(SourceError::Parse(format!("Base URL cannot carry a path: {}", base_url)));
        }
        Ok(Self { base_url, client: build_client()? })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn join<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Url {
        let mut url = self.base_url.clone();
        // checked in `new`
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    pub fn versions_url(&self, case_id: &str) -> Url {
        self.join(["cases", case_id, "versions"])
    }

    /// Object keys keep their `/` separators; each segment is encoded on its own.
    pub fn object_url(&self, key: &str) -> Url {
        self.join(std::iter::once("objects").chain(key.split('/').filter(|s| !s.is_empty())))
    }
}

#[async_trait]
impl VersionSource for HttpVersionSource {
    async fn list_objects(&self, case_id: &str) -> Result<Vec<VersionObject>, SourceError> {
        let url = self.versions_url(case_id);
        tracing::info!("Listing versions from: {}", url);

        let response = self.client.get(url.clone())
            .header(header::ACCEPT, "application/json")
            .send()
            .await?; // Propagates reqwest::Error as SourceError::Network

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!("No versions listed for case {}", case_id);
            return Ok(Vec::new());
        }
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(SourceError::Http(status));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| SourceError::Parse(e.to_string()))
    }

    async fn fetch_bytes(&self, key: &str) -> Result<Option<Vec<u8>>, SourceError> {
        let url = self.object_url(key);
        tracing::debug!("Downloading version object from: {}", url);

        let response = self.client.get(url.clone())
            .header(header::ACCEPT, "application/pdf,application/octet-stream,*/*")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!("Received 404 Not Found for URL: {}", url);
            return Ok(None);
        }
        if !status.is_success() {
            tracing::error!("HTTP error status: {} for URL: {}", status, url);
            return Err(SourceError::Http(status));
        }

        let bytes = response.bytes().await?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);
        Ok(Some(bytes.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_joined_cleanly() {
        let source = HttpVersionSource::new("https://reports.example.com/api/").unwrap();
        assert_eq!(source.versions_url("C-3").as_str(), "https://reports.example.com/api/cases/C-3/versions");
        assert_eq!(
            source.object_url("/C-3/Output/202401011200-C-3-LCP.pdf").as_str(),
            "https://reports.example.com/api/objects/C-3/Output/202401011200-C-3-LCP.pdf"
        );
    }

    #[test]
    fn test_url_segments_are_percent_encoded() {
        let source = HttpVersionSource::new("https://reports.example.com/api").unwrap();
        assert_eq!(
            source.versions_url("C 3#1").as_str(),
            "https://reports.example.com/api/cases/C%203%231/versions"
        );
        assert_eq!(
            source.object_url("C 3/Output/202401011200 final#2.pdf").as_str(),
            "https://reports.example.com/api/objects/C%203/Output/202401011200%20final%232.pdf"
        );
        // a case id cannot climb out of its segment
        assert_eq!(source.versions_url("../admin").as_str(), "https://reports.example.com/api/cases/..%2Fadmin/versions");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(HttpVersionSource::new("not a url"), Err(SourceError::Parse(_))));
        assert!(matches!(HttpVersionSource::new("mailto:ops@example.com"), Err(SourceError::Parse(_))));
    }
}
