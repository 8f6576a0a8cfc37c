//! Fixtures shared by the handler and bot tests.

use std::sync::Arc;

use async_trait::async_trait;
use hydrant_map_catalog::HydrantCatalog;
use hydrant_map_geocoder::{GeocodeError, GeocodedAddress, Geocoder, GeocodingProvider};
use hydrant_map_hydrant_models::{Attributes, Coordinate, HydrantRecord};
use hydrant_map_resolver::{ResolutionPipeline, ResolverConfig};
use hydrant_map_static_map::renderer::MapRenderer;

use crate::AppState;
use crate::telegram::TelegramClient;

/// The only address [`OneAddress`] knows; it lies 71 m from the single
/// catalog hydrant.
pub const KNOWN_ADDRESS: &str = "Орёл, Комсомольская 100";

/// Geocodes [`KNOWN_ADDRESS`] and nothing else.
pub struct OneAddress;

#[async_trait]
impl Geocoder for OneAddress {
    fn name(&self) -> &str {
        "one"
    }

    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        if address == KNOWN_ADDRESS {
            Ok(GeocodedAddress {
                coordinate: Coordinate::new(52.9650, 36.0630).unwrap(),
                matched_address: Some("Россия, Орёл, Комсомольская улица, 100".to_string()),
                provider: GeocodingProvider::Yandex,
            })
        } else {
            Err(GeocodeError::NotFound {
                query: address.to_string(),
            })
        }
    }
}

/// State over a one-hydrant catalog.
pub fn state(renderer: Arc<dyn MapRenderer>, telegram: Option<TelegramClient>) -> AppState {
    let catalog = HydrantCatalog::from_records(vec![HydrantRecord {
        id: "1".to_string(),
        coordinate: Coordinate::new(52.9648, 36.0620).unwrap(),
        label: "ПГ-1".to_string(),
        attributes: Attributes::new(),
    }]);
    AppState {
        pipeline: ResolutionPipeline::new(
            Arc::new(catalog),
            Arc::new(OneAddress),
            ResolverConfig::default(),
        ),
        renderer,
        telegram,
    }
}
