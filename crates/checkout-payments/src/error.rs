//! Payment Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, PaymentError>;

/// Errors surfaced by processor calls and webhook handling.
///
/// Processor failures are classified rather than collapsed: transport
/// problems, credential rejections and request rejections are distinct
/// variants even though the `/pay` endpoint maps them all to the same
/// client-facing payload.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Could not reach the processor (connect, TLS, timeout, body decode)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The processor rejected our API credentials
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The processor rejected the request itself (declined card, invalid
    /// payment method, bad parameters)
    #[error("{0}")]
    Rejected(String),

    /// Webhook signature verification failed
    #[error("Webhook signature invalid: {0}")]
    WebhookSignature(String),

    /// Webhook payload parsing failed
    #[error("Webhook parse error: {0}")]
    WebhookParse(String),

    /// Anything the processor returned that fits no other class
    #[error("Processor error: {0}")]
    Unknown(String),
}

impl PaymentError {
    /// Short classification tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            PaymentError::Network(_) => "network",
            PaymentError::Auth(_) => "auth",
            PaymentError::Rejected(_) => "rejected",
            PaymentError::WebhookSignature(_) => "webhook_signature",
            PaymentError::WebhookParse(_) => "webhook_parse",
            PaymentError::Unknown(_) => "unknown",
        }
    }
}
