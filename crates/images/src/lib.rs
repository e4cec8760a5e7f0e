//! Blog Studio image-service infrastructure.
//!
//! - [`PixabayClient`] implements [`pipeline::ImageSearch`] against the Pixabay
//!   REST API (`GET /api/?key=..&q=..`).
//! - [`HttpDownloader`] implements [`pipeline::ImageDownloader`] with a plain
//!   `GET` of the image URL.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Ranking of hits and file naming are domain rules and
//! live in the `nodes` crate; this crate only moves bytes.

use async_trait::async_trait;
use pipeline::{ImageDownloader, ImageHit, ImageQuery, ImageSearch, PipelineError};
use serde::Deserialize;
use tracing::{debug, instrument};

pub const DEFAULT_PIXABAY_URL: &str = "https://pixabay.com/api/";

const SEARCH_SERVICE: &str = "Pixabay";
const DOWNLOAD_SERVICE: &str = "Image download";

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Pixabay image search client.
#[derive(Debug, Clone)]
pub struct PixabayClient {
    http: reqwest::Client,
    api_key: String,
    endpoint: String,
}

impl PixabayClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_endpoint(reqwest::Client::new(), api_key, DEFAULT_PIXABAY_URL)
    }

    pub fn with_endpoint(
        http: reqwest::Client,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            endpoint: endpoint.into(),
        }
    }

    fn query_params(&self, query: &ImageQuery) -> Vec<(&'static str, String)> {
        vec![
            ("key", self.api_key.clone()),
            ("q", query.term.clone()),
            ("image_type", query.image_type.clone()),
            ("orientation", query.orientation.as_str().to_string()),
            ("safesearch", query.safe_search.to_string()),
            ("per_page", query.per_page.to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "largeImageURL", default)]
    large_image_url: Option<String>,
    #[serde(default)]
    likes: u64,
}

impl From<SearchHit> for ImageHit {
    fn from(hit: SearchHit) -> Self {
        ImageHit {
            url: hit.large_image_url.filter(|u| !u.is_empty()),
            likes: hit.likes,
        }
    }
}

#[async_trait]
impl ImageSearch for PixabayClient {
    #[instrument(skip_all, fields(term = %query.term))]
    async fn search(&self, query: &ImageQuery) -> Result<Vec<ImageHit>, PipelineError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&self.query_params(query))
            .send()
            .await
            .map_err(|e| PipelineError::transport(SEARCH_SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            // Pixabay reports errors as plain text bodies.
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::status(
                SEARCH_SERVICE,
                status.as_u16(),
                body.trim(),
            ));
        }

        let parsed: SearchResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::transport(SEARCH_SERVICE, e))?;
        debug!(hits = parsed.hits.len(), "Image search completed");
        Ok(parsed.hits.into_iter().map(ImageHit::from).collect())
    }
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

/// Downloads image bytes over HTTP(S).
#[derive(Debug, Clone, Default)]
pub struct HttpDownloader {
    http: reqwest::Client,
}

impl HttpDownloader {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl ImageDownloader for HttpDownloader {
    #[instrument(skip(self))]
    async fn download(&self, url: &str) -> Result<Vec<u8>, PipelineError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::transport(DOWNLOAD_SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::status(
                DOWNLOAD_SERVICE,
                status.as_u16(),
                format!("GET {url}"),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::transport(DOWNLOAD_SERVICE, e))?;
        debug!(bytes = bytes.len(), "Image downloaded");
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeline::{ErrorKind, Orientation};
    use serde_json::json;

    fn query() -> ImageQuery {
        ImageQuery {
            term: "Seoul street food".to_string(),
            image_type: "photo".to_string(),
            orientation: Orientation::Horizontal,
            safe_search: true,
            per_page: 10,
        }
    }

    #[test]
    fn query_parameters() {
        let client = PixabayClient::new("secret");
        let q = query();
        let params = client.query_params(&q);
        assert_eq!(
            params,
            vec![
                ("key", "secret".to_string()),
                ("q", "Seoul street food".to_string()),
                ("image_type", "photo".to_string()),
                ("orientation", "horizontal".to_string()),
                ("safesearch", "true".to_string()),
                ("per_page", "10".to_string()),
            ]
        );
    }

    #[test]
    fn hits_map_to_domain() {
        let response: SearchResponse = serde_json::from_value(json!({
            "total": 2,
            "totalHits": 2,
            "hits": [
                {"id": 1, "largeImageURL": "https://pixabay.com/get/a.jpg", "likes": 12},
                {"id": 2, "largeImageURL": "", "likes": 40},
                {"id": 3}
            ]
        }))
        .unwrap();
        let hits: Vec<ImageHit> = response.hits.into_iter().map(ImageHit::from).collect();
        assert_eq!(hits[0].url.as_deref(), Some("https://pixabay.com/get/a.jpg"));
        assert_eq!(hits[0].likes, 12);
        assert_eq!(hits[1].url, None);
        assert_eq!(hits[2].likes, 0);
    }

    #[tokio::test]
    async fn unreachable_search_is_an_upstream_error() {
        let client =
            PixabayClient::with_endpoint(reqwest::Client::new(), "k", "http://127.0.0.1:9/api/");
        let err = client.search(&query()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Upstream);
        assert!(err.to_string().starts_with("Pixabay error - "));
    }
}
