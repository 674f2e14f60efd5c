use crate::models::{image_media_type, EmbeddedImage, SearchResult, Thumbnail};
use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while fetching a result thumbnail
#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Thumbnail request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Thumbnail host returned {0}")]
    Status(u16),

    #[error("Thumbnail host sent {0:?} instead of an image")]
    NotImage(Option<String>),
}

/// Fetches result thumbnails so they can be inlined into the page
///
/// Each fetch is bounded on its own; a failure only affects its own row.
pub struct ThumbnailFetcher {
    client: Client,
}

impl ThumbnailFetcher {
    pub fn new(timeout: Duration) -> Result<Self, ThumbnailError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Fetch a single image, treating anything but 200 as unavailable
    ///
    /// A 200 whose `Content-Type` is not a bare `image/<subtype>` is refused.
    pub async fn fetch(&self, url: &str) -> Result<EmbeddedImage, ThumbnailError> {
        let response = self.client.get(url).send().await?;

        if response.status() != StatusCode::OK {
            return Err(ThumbnailError::Status(response.status().as_u16()));
        }

        let header = response
            .headers()
            .get(CONTENT_TYPE)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let content_type = match header.as_deref().and_then(image_media_type) {
            Some(content_type) => content_type,
            None => return Err(ThumbnailError::NotImage(header)),
        };
        let bytes = response.bytes().await?;

        Ok(EmbeddedImage {
            content_type,
            bytes: bytes.to_vec(),
        })
    }

    /// Resolve the thumbnail of one result, degrading instead of failing
    pub async fn thumbnail_for(&self, result: &SearchResult) -> Thumbnail {
        let url = match result.image_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => return Thumbnail::Missing,
        };

        match self.fetch(url).await {
            Ok(image) => Thumbnail::Loaded(image),
            Err(ThumbnailError::Status(status)) => {
                tracing::debug!("Thumbnail {} unavailable: {}", url, status);
                Thumbnail::NotAvailable(status)
            }
            Err(e) => {
                tracing::warn!("Thumbnail {} failed to load: {}", url, e);
                Thumbnail::LoadFailed
            }
        }
    }

    /// Fetch thumbnails one after another, in result order
    pub async fn fetch_all(&self, results: &[SearchResult]) -> Vec<Thumbnail> {
        let mut thumbnails = Vec::with_capacity(results.len());
        for result in results {
            thumbnails.push(self.thumbnail_for(result).await);
        }
        thumbnails
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_url_skips_fetch() {
        let fetcher = ThumbnailFetcher::new(Duration::from_secs(1)).unwrap();

        let thumbnails = tokio_test::block_on(fetcher.fetch_all(&[
            SearchResult::default(),
            SearchResult {
                image_url: Some("  ".to_string()),
                ..Default::default()
            },
        ]));

        assert_eq!(thumbnails, vec![Thumbnail::Missing, Thumbnail::Missing]);
    }

    #[tokio::test]
    async fn test_unreachable_host_degrades() {
        let fetcher = ThumbnailFetcher::new(Duration::from_secs(1)).unwrap();
        let result = SearchResult {
            image_url: Some("http://127.0.0.1:9/none.png".to_string()),
            ..Default::default()
        };

        assert_eq!(fetcher.thumbnail_for(&result).await, Thumbnail::LoadFailed);
    }
}
