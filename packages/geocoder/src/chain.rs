//! Priority-ordered chain of geocoding providers.
//!
//! Each provider is asked in turn until one returns a coordinate. A
//! failure from one provider (no match, bad response, unreachable) moves
//! on to the next; the same provider is never asked twice for one query.
//! When every provider fails, a `NotFound` from any of them is reported
//! in preference to transport errors.

use async_trait::async_trait;

use crate::nominatim::NominatimGeocoder;
use crate::service_registry::{GeocodingService, ProviderConfig, enabled_services};
use crate::yandex::YandexGeocoder;
use crate::{GeocodeError, GeocodedAddress, Geocoder};

/// Tries each provider in order and returns the first match.
pub struct GeocoderChain {
    providers: Vec<Box<dyn Geocoder>>,
}

impl std::fmt::Debug for GeocoderChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderChain")
            .field(
                "providers",
                &self.providers.iter().map(|p| p.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl GeocoderChain {
    /// Wraps an explicit list of providers, tried in the given order.
    #[must_use]
    pub fn new(providers: Vec<Box<dyn Geocoder>>) -> Self {
        Self { providers }
    }

    /// Builds providers from service configurations.
    ///
    /// Services whose API key environment variable is unset or empty are
    /// skipped with a warning.
    #[must_use]
    pub fn from_services(client: &reqwest::Client, services: &[GeocodingService]) -> Self {
        let mut providers: Vec<Box<dyn Geocoder>> = Vec::new();

        for svc in services.iter().filter(|s| s.enabled) {
            match &svc.provider {
                ProviderConfig::Yandex {
                    base_url,
                    api_key_env,
                } => {
                    let Some(api_key) = std::env::var(api_key_env).ok().filter(|k| !k.is_empty())
                    else {
                        log::warn!("Skipping geocoder '{}': {api_key_env} is not set", svc.id);
                        continue;
                    };
                    providers.push(Box::new(YandexGeocoder::new(
                        client.clone(),
                        base_url.clone(),
                        api_key,
                    )));
                }
                ProviderConfig::Nominatim {
                    base_url,
                    country_codes,
                } => {
                    providers.push(Box::new(NominatimGeocoder::new(
                        client.clone(),
                        base_url.clone(),
                        country_codes.clone(),
                    )));
                }
            }
            log::info!("Geocoder '{}' enabled (priority {})", svc.name, svc.priority);
        }

        Self { providers }
    }

    /// Builds the chain from the embedded [`enabled_services`].
    #[must_use]
    pub fn from_registry(client: &reqwest::Client) -> Self {
        Self::from_services(client, &enabled_services())
    }

    /// Number of configured providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no provider is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

#[async_trait]
impl Geocoder for GeocoderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn geocode(&self, address: &str) -> Result<GeocodedAddress, GeocodeError> {
        let mut not_found = None;
        let mut last_err = GeocodeError::NoProvider;

        for provider in &self.providers {
            match provider.geocode(address).await {
                Ok(found) => return Ok(found),
                Err(e) => {
                    log::debug!("Geocoder '{}' failed for '{address}': {e}", provider.name());
                    if matches!(e, GeocodeError::NotFound { .. }) {
                        not_found.get_or_insert(e);
                    } else {
                        last_err = e;
                    }
                }
            }
        }

        Err(not_found.unwrap_or(last_err))
    }
}
