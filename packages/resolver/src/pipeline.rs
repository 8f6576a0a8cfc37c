//! Address → nearest hydrants resolution.
//!
//! One [`ResolutionPipeline::resolve`] call walks
//! `Idle → Geocoding → Selecting → Rendering → Done`. Only the geocoding
//! step does I/O; it is bounded by [`ResolverConfig::geocode_timeout`] and
//! never retried here. The pipeline holds no per-call state, so any number
//! of `resolve` calls may run concurrently against the same instance.

use std::sync::Arc;

use hydrant_map_catalog::{HydrantCatalog, nearest::select_nearest};
use hydrant_map_geocoder::{GeocodeError, GeocodedAddress, Geocoder};
use hydrant_map_hydrant_models::DisplayEntry;
use hydrant_map_static_map::MapRenderRequest;
use strum_macros::{AsRefStr, Display};
use thiserror::Error;

use crate::config::ResolverConfig;
use crate::format::{caption, format_entries};

/// Where a resolution currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ResolutionStage {
    /// Not started.
    Idle,
    /// Waiting on the geocoder.
    Geocoding,
    /// Ranking catalog records.
    Selecting,
    /// Building the map request and display entries.
    Rendering,
    /// Finished successfully.
    Done,
    /// Finished with an error.
    Failed,
}

impl ResolutionStage {
    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub const fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Geocoding)
                | (Self::Geocoding, Self::Selecting)
                | (Self::Selecting, Self::Rendering)
                | (Self::Rendering, Self::Done)
                | (Self::Idle | Self::Geocoding | Self::Selecting, Self::Failed)
        )
    }
}

/// Errors from [`ResolutionPipeline::resolve`].
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The address could not be turned into a coordinate.
    #[error("Could not resolve address: {0}")]
    Geocode(#[from] GeocodeError),
}

impl ResolveError {
    /// The stage that failed.
    #[must_use]
    pub const fn stage(&self) -> ResolutionStage {
        match self {
            Self::Geocode(_) => ResolutionStage::Geocoding,
        }
    }
}

/// The answer to one address query.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    /// Where the address was geocoded to.
    pub location: GeocodedAddress,
    /// What to draw on the answer map.
    pub map_request: MapRenderRequest,
    /// Ranked hydrants, nearest first. Empty when the catalog has none.
    pub entries: Vec<DisplayEntry>,
}

impl Resolution {
    /// Chat caption for the entries.
    #[must_use]
    pub fn caption(&self) -> String {
        caption(&self.entries)
    }
}

/// Geocodes addresses and picks the nearest hydrants from a shared catalog.
#[derive(Clone)]
pub struct ResolutionPipeline {
    catalog: Arc<HydrantCatalog>,
    geocoder: Arc<dyn Geocoder>,
    config: ResolverConfig,
}

impl std::fmt::Debug for ResolutionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionPipeline")
            .field("hydrants", &self.catalog.len())
            .field("geocoder", &self.geocoder.name())
            .field("config", &self.config)
            .finish()
    }
}

impl ResolutionPipeline {
    /// Creates a pipeline over `catalog` using `geocoder`.
    #[must_use]
    pub fn new(
        catalog: Arc<HydrantCatalog>,
        geocoder: Arc<dyn Geocoder>,
        config: ResolverConfig,
    ) -> Self {
        Self {
            catalog,
            geocoder,
            config,
        }
    }

    /// The catalog this pipeline selects from.
    #[must_use]
    pub fn catalog(&self) -> &HydrantCatalog {
        &self.catalog
    }

    /// The active configuration.
    #[must_use]
    pub const fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolves `address` into a map request and ranked entries.
    ///
    /// Blank input is rejected as not found without contacting the
    /// geocoder.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Geocode`] if the geocoder finds nothing,
    /// answers with garbage, fails, or exceeds the configured timeout. No
    /// map request is produced in that case.
    pub async fn resolve(&self, address: &str) -> Result<Resolution, ResolveError> {
        let mut stage = ResolutionStage::Idle;

        advance(&mut stage, ResolutionStage::Geocoding);
        let location = match self.geocode(address.trim()).await {
            Ok(location) => location,
            Err(e) => {
                advance(&mut stage, ResolutionStage::Failed);
                return Err(e.into());
            }
        };
        log::info!(
            "Geocoded '{address}' to ({}, {}) via {}",
            location.coordinate.latitude(),
            location.coordinate.longitude(),
            location.provider
        );

        advance(&mut stage, ResolutionStage::Selecting);
        let ranked = select_nearest(&self.catalog, &location.coordinate, self.config.nearest_count);
        if ranked.is_empty() {
            log::info!("No hydrants in catalog for '{address}'");
        }

        advance(&mut stage, ResolutionStage::Rendering);
        let map_request = hydrant_map_static_map::build(location.coordinate, &ranked);
        if map_request.truncated > 0 {
            log::warn!(
                "Map shows {} of {} hydrants; marker symbols exhausted",
                map_request.markers.len(),
                ranked.len()
            );
        }
        let entries = format_entries(&ranked);

        advance(&mut stage, ResolutionStage::Done);
        Ok(Resolution {
            location,
            map_request,
            entries,
        })
    }

    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        if address.is_empty() {
            return Err(GeocodeError::NotFound {
                query: address.to_string(),
            });
        }

        let timeout = self.config.geocode_timeout;
        tokio::time::timeout(timeout, self.geocoder.geocode(address))
            .await
            .map_err(|_| GeocodeError::Timeout(timeout))?
    }
}

fn advance(stage: &mut ResolutionStage, next: ResolutionStage) {
    debug_assert!(
        stage.can_advance_to(next),
        "illegal resolution transition {stage} -> {next}"
    );
    log::debug!("Resolution stage {stage} -> {next}");
    *stage = next;
}
