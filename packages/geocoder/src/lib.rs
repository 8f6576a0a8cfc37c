#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding for the hydrant map.
//!
//! Turns a free-text address into a [`Coordinate`] through the narrow
//! [`Geocoder`] contract. Concrete providers are configured via TOML files
//! in `services/`:
//!
//! 1. **Yandex Geocoder** (priority 1): requires `YANDEX_MAPS_API_KEY`.
//! 2. **Nominatim / OpenStreetMap** (priority 2): free, keyless, disabled
//!    by default.
//!
//! Providers are loaded from the [`service_registry`] and tried in
//! priority order by [`chain::GeocoderChain`]. Every provider is treated as
//! an untrusted, fallible upstream: its response is validated before a
//! coordinate is handed back.

pub mod chain;
pub mod nominatim;
pub mod service_registry;
pub mod yandex;

use std::time::Duration;

use async_trait::async_trait;
use hydrant_map_hydrant_models::Coordinate;
use serde::Serialize;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

/// A geocoding result for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedAddress {
    /// The resolved point.
    pub coordinate: Coordinate,
    /// The matched/canonical address returned by the geocoder.
    pub matched_address: Option<String>,
    /// Which provider resolved this address.
    pub provider: GeocodingProvider,
}

/// Which geocoding provider resolved an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum GeocodingProvider {
    /// Yandex Maps Geocoder HTTP API.
    Yandex,
    /// Nominatim / `OpenStreetMap`.
    Nominatim,
}

/// Coarse classification of a [`GeocodeError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, AsRefStr)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocodeFailure {
    /// The service understood the request but found nothing.
    NotFound,
    /// The service answered with something we could not interpret.
    MalformedResponse,
    /// The service could not be reached or answered with an error status.
    Transport,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// No result for the query.
    #[error("No geocoding result for '{query}'")]
    NotFound {
        /// The address text that was looked up.
        query: String,
    },

    /// Response parsing failed.
    #[error("Malformed geocoder response: {message}")]
    MalformedResponse {
        /// Description of the parsing failure.
        message: String,
    },

    /// HTTP request failed. The request URL is stripped, since it carries
    /// the API key.
    #[error("HTTP error: {0}")]
    Http(#[source] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Geocoder returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,

    /// The call did not finish in time.
    #[error("Geocoding timed out after {0:?}")]
    Timeout(Duration),

    /// No provider is configured.
    #[error("No geocoding provider configured")]
    NoProvider,
}

impl GeocodeError {
    /// Classifies this error as not found, malformed, or transport.
    #[must_use]
    pub fn reason(&self) -> GeocodeFailure {
        match self {
            Self::NotFound { .. } => GeocodeFailure::NotFound,
            Self::MalformedResponse { .. } => GeocodeFailure::MalformedResponse,
            Self::Http(e) if e.is_decode() => GeocodeFailure::MalformedResponse,
            Self::Http(_)
            | Self::Status { .. }
            | Self::RateLimited
            | Self::Timeout(_)
            | Self::NoProvider => GeocodeFailure::Transport,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for GeocodeError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.without_url())
    }
}

/// Resolves free-text addresses to coordinates.
///
/// Implementations perform network I/O and may be slow or fail; they must
/// not retry a query that came back empty.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Short identifier for logging (e.g., `"yandex"`).
    fn name(&self) -> &str;

    /// Geocodes one address.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::NotFound`] when the service has no match,
    /// [`GeocodeError::MalformedResponse`] when its answer cannot be
    /// interpreted, and a transport-class error otherwise.
    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError>;
}

/// Builds the HTTP client shared by all providers.
///
/// # Errors
///
/// Returns [`GeocodeError::Http`] if the TLS backend cannot be initialized.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, GeocodeError> {
    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(concat!("hydrant-map/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// Turns an upstream `(latitude, longitude)` pair into a validated
/// coordinate.
pub(crate) fn validated(latitude: f64, longitude: f64) -> Result<Coordinate, GeocodeError> {
    Coordinate::new(latitude, longitude).map_err(|e| GeocodeError::malformed(e.to_string()))
}
