//! Runtime configuration read from environment variables.
//!
//! | Variable | Default |
//! |---|---|
//! | `HYDRANTS_PATH` | `data/hydrants.geojson` |
//! | `NEAREST_COUNT` | `3` |
//! | `GEOCODE_TIMEOUT_SECS` | `10` |
//! | `RENDER_TIMEOUT_SECS` | `15` |
//! | `YANDEX_MAPS_STATIC_KEY` | unset |
//!
//! Unparsable values fall back to the default with a warning.

use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Default number of hydrants in an answer.
pub const DEFAULT_NEAREST_COUNT: NonZeroUsize = match NonZeroUsize::new(3) {
    Some(count) => count,
    None => unreachable!(),
};

/// Default dataset location, relative to the working directory.
pub const DEFAULT_HYDRANTS_PATH: &str = "data/hydrants.geojson";

/// Settings that shape a single resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// How many nearest hydrants to select.
    pub nearest_count: NonZeroUsize,
    /// Upper bound on the geocoder call.
    pub geocode_timeout: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            nearest_count: DEFAULT_NEAREST_COUNT,
            geocode_timeout: Duration::from_secs(10),
        }
    }
}

impl ResolverConfig {
    /// Reads `NEAREST_COUNT` and `GEOCODE_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            nearest_count: env_or("NEAREST_COUNT", defaults.nearest_count),
            geocode_timeout: Duration::from_secs(env_or(
                "GEOCODE_TIMEOUT_SECS",
                defaults.geocode_timeout.as_secs(),
            )),
        }
    }
}

/// Process-level settings for binaries hosting the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `GeoJSON` dataset of hydrants.
    pub hydrants_path: PathBuf,
    /// Pipeline settings.
    pub resolver: ResolverConfig,
    /// Upper bound on fetching the map image.
    pub render_timeout: Duration,
    /// Yandex Static API key, if any.
    pub static_map_key: Option<String>,
}

impl AppConfig {
    /// Reads every setting from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            hydrants_path: std::env::var("HYDRANTS_PATH")
                .map_or_else(|_| PathBuf::from(DEFAULT_HYDRANTS_PATH), PathBuf::from),
            resolver: ResolverConfig::from_env(),
            render_timeout: Duration::from_secs(env_or("RENDER_TIMEOUT_SECS", 15)),
            static_map_key: std::env::var("YANDEX_MAPS_STATIC_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
        }
    }
}

fn env_or<T: FromStr + Copy>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {name}={raw:?}, using default");
            default
        }),
        Err(_) => default,
    }
}
