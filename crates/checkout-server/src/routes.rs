//! Router Assembly

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{health_check, pay, stripe_key, stripe_webhook};
use crate::state::AppState;

/// Build the application router.
///
/// The static directory is mounted as the fallback service, so `GET /`
/// serves the checkout page (`index.html`) and unrouted paths resolve to
/// the page's assets.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health & info
        .route("/health", get(health_check))
        .route("/stripe-key", get(stripe_key))

        // Payments
        .route("/pay", post(pay))
        .route("/webhook", post(stripe_webhook))

        // Checkout page & assets
        .fallback_service(ServeDir::new(&state.config.static_dir))

        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
