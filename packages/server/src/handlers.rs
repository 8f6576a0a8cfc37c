//! HTTP handler functions for the hydrant map API.

use actix_web::{HttpResponse, http::StatusCode, web};
use hydrant_map_geocoder::GeocodeFailure;
use hydrant_map_resolver::{Resolution, ResolveError};
use hydrant_map_server_models::telegram::Update;
use hydrant_map_server_models::{
    ApiError, ApiHealth, ApiResolution, ApiResolveRequest, MapQueryParams,
};
use hydrant_map_static_map::renderer::RenderError;

use crate::{AppState, telegram};

/// `GET /`
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().body("Bot is awake!")
}

/// `GET /api/health`
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        hydrants: state.pipeline.catalog().len(),
    })
}

/// `POST /api/resolve`
///
/// Geocodes the address and returns the nearest hydrants.
pub async fn resolve(
    state: web::Data<AppState>,
    body: web::Json<ApiResolveRequest>,
) -> HttpResponse {
    match state.pipeline.resolve(&body.address).await {
        Ok(resolution) => HttpResponse::Ok().json(to_api(resolution)),
        Err(e) => resolve_error(&body.address, &e),
    }
}

/// `GET /api/map?address=...`
///
/// Resolves the address and returns the rendered map as PNG.
pub async fn map(state: web::Data<AppState>, params: web::Query<MapQueryParams>) -> HttpResponse {
    let resolution = match state.pipeline.resolve(&params.address).await {
        Ok(resolution) => resolution,
        Err(e) => return resolve_error(&params.address, &e),
    };

    match state.renderer.render(&resolution.map_request).await {
        Ok(png) => HttpResponse::Ok().content_type("image/png").body(png),
        Err(e) => {
            log::error!("Failed to render map for '{}': {e}", params.address);
            let status = match e {
                RenderError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::BAD_GATEWAY,
            };
            HttpResponse::build(status).json(ApiError {
                error: "Failed to render map".to_string(),
                reason: None,
            })
        }
    }
}

/// `POST /api/telegram`
///
/// Telegram webhook. Acknowledges every parsed update with `200 OK`.
pub async fn telegram_webhook(
    state: web::Data<AppState>,
    update: web::Json<Update>,
) -> HttpResponse {
    let Some(bot) = state.telegram.as_ref() else {
        return HttpResponse::NotFound().json(ApiError {
            error: "Telegram webhook is not enabled".to_string(),
            reason: None,
        });
    };

    telegram::handle_update(&state, bot, update.into_inner()).await;
    HttpResponse::Ok().body("OK")
}

/// `GET /api/telegram`
pub async fn telegram_probe() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "ok": true }))
}

fn to_api(resolution: Resolution) -> ApiResolution {
    let caption = resolution.caption();
    ApiResolution {
        center: resolution.location.coordinate,
        matched_address: resolution.location.matched_address,
        truncated_markers: resolution.map_request.truncated,
        entries: resolution.entries,
        caption,
    }
}

fn resolve_error(address: &str, e: &ResolveError) -> HttpResponse {
    let ResolveError::Geocode(inner) = e;
    let reason = inner.reason();

    let (status, message) = match reason {
        GeocodeFailure::NotFound => (StatusCode::UNPROCESSABLE_ENTITY, "Address not understood"),
        GeocodeFailure::MalformedResponse => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "Geocoder returned an unusable answer",
        ),
        GeocodeFailure::Transport => (StatusCode::BAD_GATEWAY, "Geocoder unavailable"),
    };

    if status.is_server_error() {
        log::error!("Failed to resolve '{address}': {e}");
    } else {
        log::warn!("Failed to resolve '{address}': {e}");
    }

    HttpResponse::build(status).json(ApiError {
        error: message.to_string(),
        reason: Some(reason.to_string()),
    })
}
