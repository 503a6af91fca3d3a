//! # checkout-server
//!
//! HTTP API layer for card-hold-rs.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - The checkout demo endpoints (publishable key, pay)
//! - Webhook handler for payment events
//! - Static serving of the checkout page
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Checkout page (static) |
//! | GET | `/health` | Health check |
//! | GET | `/stripe-key` | Publishable key for the browser |
//! | POST | `/pay` | Create/confirm a payment |
//! | POST | `/webhook` | Processor webhook |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, StripeConfig, select_processor};
