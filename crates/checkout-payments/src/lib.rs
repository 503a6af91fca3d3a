//! # checkout-payments
//!
//! Payment intent processing for card-hold-rs.
//!
//! ## Place a hold, then capture
//!
//! Every intent this crate creates uses manual confirmation and manual
//! capture: a successful confirmation authorizes the card without moving
//! money, and the server decides when the funds actually move.
//!
//! ```text
//! ┌─────────┐  create/confirm   ┌───────────┐   requires_capture
//! │ browser │──────POST /pay───▶│  backend  │───────capture────▶ funds move
//! └─────────┘                   └───────────┘
//!      │   requires_action?          │
//!      └──3-D Secure challenge───────┘  (re-invoke with paymentIntentId)
//! ```
//!
//! The processor owns the intent state machine end to end. This crate only
//! issues the three calls ([`PaymentProcessor`]), resolves a reported hold
//! inline, and folds the final status into the response union the browser
//! understands ([`PaymentResponse`]).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use checkout_payments::{CheckoutFlow, PayRequest, StripeProcessor};
//!
//! let processor = Arc::new(
//!     StripeProcessor::new("sk_test_xxx").with_api_version("2020-08-27"),
//! );
//! let flow = CheckoutFlow::new(processor);
//!
//! let request: PayRequest = serde_json::from_str(body)?;
//! let response = flow.process_payment(request).await?;
//! ```
//!
//! [`MockProcessor`] plays the same flow in memory for tests and
//! credential-less local runs.

mod checkout;
mod error;
mod intent;
mod mock;
mod processor;
mod stripe;
mod webhook;

pub use checkout::{
    CARD_DENIED_MESSAGE, CheckoutFlow, CompleteAuthentication, NewPayment, PayRequest,
    PaymentResponse, order_amount,
};
pub use error::{PaymentError, Result};
pub use intent::{CreateIntent, IntentStatus, PaymentIntent};
pub use mock::{MockProcessor, ProcessorCall};
pub use processor::PaymentProcessor;
pub use stripe::StripeProcessor;
pub use webhook::{WebhookEvent, WebhookHandler, WebhookVerifier};
