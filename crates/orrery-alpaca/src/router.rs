//! Axum router construction for the Alpaca API.
//!
//! Assembles the device and management routes into a single [`Router`]
//! with CORS enabled so browser-based clients on other origins can reach
//! the simulator.

use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers::{self, management};
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The router includes:
/// - `GET|PUT /api/v1/{device_type}/{device_number}/{method}` -- device members
/// - `GET /management/apiversions` -- supported API versions
/// - `GET /management/v1/description` -- server description
/// - `GET /management/v1/configureddevices` -- hosted devices
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/v1/{device_type}/{device_number}/{method}",
            get(handlers::device_get).put(handlers::device_put),
        )
        .route("/management/apiversions", get(management::api_versions))
        .route("/management/v1/description", get(management::description))
        .route(
            "/management/v1/configureddevices",
            get(management::configured_devices),
        )
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
