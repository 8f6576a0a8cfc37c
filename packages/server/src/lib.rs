#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Actix-Web server for the hydrant map.
//!
//! Loads the hydrant catalog once at startup and serves:
//!
//! - `GET /`: keep-alive probe for free-tier hosts.
//! - `GET /api/health`: version and catalog size.
//! - `POST /api/resolve`: address → nearest hydrants as JSON.
//! - `GET /api/map?address=...`: the rendered answer map as PNG.
//! - `POST /api/telegram`: Telegram bot webhook, when
//!   `TELEGRAM_BOT_TOKEN` is set.
//!
//! Every route goes through the same [`ResolutionPipeline`]; this crate
//! only adapts it to HTTP and chat.

mod handlers;
pub mod telegram;

#[cfg(test)]
mod test_support;

use std::sync::Arc;

use actix_web::{App, HttpServer, middleware, web};
use hydrant_map_catalog::{HydrantCatalog, MalformedDatasetError};
use hydrant_map_geocoder::{GeocodeError, build_client, chain::GeocoderChain};
use hydrant_map_resolver::{AppConfig, ResolutionPipeline};
use hydrant_map_static_map::StaticMapStyle;
use hydrant_map_static_map::renderer::{HttpMapRenderer, MapRenderer, RenderError};
use thiserror::Error;

use crate::telegram::TelegramClient;

/// Errors that stop the server from starting.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The hydrant dataset is unusable.
    #[error("Refusing to start with a malformed catalog: {0}")]
    Catalog(#[from] MalformedDatasetError),

    /// The geocoder HTTP client could not be built.
    #[error("Failed to set up geocoder: {0}")]
    Geocoder(#[from] GeocodeError),

    /// The map renderer HTTP client could not be built.
    #[error("Failed to set up map renderer: {0}")]
    Renderer(#[from] RenderError),

    /// The Telegram HTTP client could not be built.
    #[error("Failed to set up Telegram client: {0}")]
    Telegram(#[from] telegram::TelegramError),

    /// Binding or running the HTTP server failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shared application state.
pub struct AppState {
    /// Address resolution over the loaded catalog.
    pub pipeline: ResolutionPipeline,
    /// Fetches answer map images.
    pub renderer: Arc<dyn MapRenderer>,
    /// Bot API client, present when the webhook is enabled.
    pub telegram: Option<TelegramClient>,
}

impl AppState {
    /// Loads the catalog and wires up the geocoder, renderer and bot
    /// client from `config` and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the catalog is malformed or any HTTP
    /// client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, ServerError> {
        let catalog = Arc::new(HydrantCatalog::load_path(&config.hydrants_path)?);

        let client = build_client(config.resolver.geocode_timeout)?;
        let geocoder = GeocoderChain::from_registry(&client);
        if geocoder.is_empty() {
            log::warn!("No geocoding provider configured; every address will fail to resolve");
        }

        let renderer = HttpMapRenderer::new(
            StaticMapStyle::default(),
            config.static_map_key.clone(),
            config.render_timeout,
        )?;

        let telegram = match std::env::var("TELEGRAM_BOT_TOKEN") {
            Ok(token) if !token.is_empty() => {
                log::info!("Telegram webhook enabled at /api/telegram");
                Some(TelegramClient::new(&token)?)
            }
            _ => {
                log::info!("TELEGRAM_BOT_TOKEN not set; Telegram webhook disabled");
                None
            }
        };

        Ok(Self {
            pipeline: ResolutionPipeline::new(catalog, Arc::new(geocoder), config.resolver),
            renderer: Arc::new(renderer),
            telegram,
        })
    }
}

/// Registers every route on `cfg`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/health", web::get().to(handlers::health))
            .route("/resolve", web::post().to(handlers::resolve))
            .route("/map", web::get().to(handlers::map))
            .route("/telegram", web::post().to(handlers::telegram_webhook))
            .route("/telegram", web::get().to(handlers::telegram_probe)),
    );
}

/// Starts the hydrant map server.
///
/// Reads configuration from the environment, loads the catalog, and runs
/// the Actix-Web HTTP server until shutdown. The caller is responsible for
/// initializing logging and providing the async runtime (e.g. via
/// `#[actix_web::main]`).
///
/// # Errors
///
/// Returns [`ServerError`] if startup fails or the HTTP server fails to
/// bind or encounters a runtime error.
pub async fn run_server() -> Result<(), ServerError> {
    let config = AppConfig::from_env();
    log::info!(
        "Serving {} nearest hydrants from {}",
        config.resolver.nearest_count,
        config.hydrants_path.display()
    );

    let state = web::Data::new(AppState::from_config(&config)?);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);

    log::info!("Starting server on {bind_addr}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .configure(configure)
    })
    .bind((bind_addr, port))?
    .run()
    .await?;

    Ok(())
}
