//! card-hold-rs HTTP Server
//!
//! Axum-based server for the place-a-hold checkout demo: creates payment
//! intents with manual confirmation and manual capture, settles holds, and
//! relays processor webhooks.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use checkout_payments::PaymentProcessor;
use checkout_server::{AppConfig, AppState, create_router, select_processor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    // Stripe when credentials are configured, the in-memory mock otherwise
    let processor = select_processor(&config.stripe);
    tracing::info!("✓ Payment processor: {}", processor.name());

    if config.stripe.webhook_secret.is_some() {
        tracing::info!("✓ Webhook endpoint enabled");
    } else {
        tracing::warn!("⚠ STRIPE_WEBHOOK_SECRET not set - webhook endpoint disabled");
    }

    // Build application state and router
    let state = AppState::new(config.clone(), processor);
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 card-hold server running on http://{}", config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /            - Checkout page (from {}/)", config.static_dir);
    tracing::info!("  GET  /health      - Health check");
    tracing::info!("  GET  /stripe-key  - Publishable key");
    tracing::info!("  POST /pay         - Create/confirm a payment");
    tracing::info!("  POST /webhook     - Processor webhook");
    tracing::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
