//! Map image retrieval.
//!
//! The renderer is the second network call of an answer and is optional:
//! a failure here must not discard the ranking that was already computed,
//! so callers keep the text answer and only lose the picture.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::{MapRenderRequest, StaticMapStyle};

/// Errors from rendering a map image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer did not answer in time.
    #[error("Map rendering timed out after {0:?}")]
    Timeout(Duration),

    /// HTTP request failed. The request URL is stripped, since it carries
    /// the API key.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The renderer answered with a non-success status.
    #[error("Map renderer returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// The renderer answered with an empty body.
    #[error("Map renderer returned an empty image")]
    EmptyImage,
}

impl From<reqwest::Error> for RenderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Turns a [`MapRenderRequest`] into encoded image bytes.
#[async_trait]
pub trait MapRenderer: Send + Sync {
    /// Renders the map.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError`] if the image cannot be produced.
    async fn render(&self, request: &MapRenderRequest) -> Result<Vec<u8>, RenderError>;
}

/// Fetches the image from the Yandex Static API, keeping it in memory.
#[derive(Debug, Clone)]
pub struct HttpMapRenderer {
    client: reqwest::Client,
    style: StaticMapStyle,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpMapRenderer {
    /// Creates a renderer with its own HTTP client bounded by `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Http`] if the HTTP client cannot be built.
    pub fn new(
        style: StaticMapStyle,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RenderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            style,
            api_key,
            timeout,
        })
    }

    /// The URL that will be fetched for `request`.
    #[must_use]
    pub fn url_for(&self, request: &MapRenderRequest) -> String {
        request.to_url(&self.style, self.api_key.as_deref())
    }
}

#[async_trait]
impl MapRenderer for HttpMapRenderer {
    async fn render(&self, request: &MapRenderRequest) -> Result<Vec<u8>, RenderError> {
        let url = self.url_for(request);
        log::debug!("Rendering map with {} markers", request.markers.len());

        let resp = self.client.get(&url).send().await.map_err(|e| self.classify(e))?;

        if !resp.status().is_success() {
            return Err(RenderError::Status {
                status: resp.status().as_u16(),
            });
        }

        let bytes = resp.bytes().await.map_err(|e| self.classify(e))?;
        if bytes.is_empty() {
            return Err(RenderError::EmptyImage);
        }

        Ok(bytes.to_vec())
    }
}

impl HttpMapRenderer {
    fn classify(&self, e: reqwest::Error) -> RenderError {
        if e.is_timeout() {
            RenderError::Timeout(self.timeout)
        } else {
            RenderError::from(e)
        }
    }
}
