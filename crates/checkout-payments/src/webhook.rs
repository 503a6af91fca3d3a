//! Webhook Handling
//!
//! Verifies processor event signatures and reacts to the payment-intent
//! lifecycle events this demo cares about: capture when a hold is placed,
//! log settlements and failures, acknowledge everything else.

use std::sync::Arc;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;

use crate::error::{PaymentError, Result};
use crate::intent::PaymentIntent;
use crate::processor::PaymentProcessor;

type HmacSha256 = Hmac<Sha256>;

/// Signatures older (or newer) than this many seconds are rejected.
const SIGNATURE_TOLERANCE_SECS: i64 = 300;

/// Raw event envelope as delivered by the processor.
#[derive(Clone, Debug, Deserialize)]
struct Event {
    id: String,
    #[serde(rename = "type")]
    type_: String,
    data: EventData,
}

#[derive(Clone, Debug, Deserialize)]
struct EventData {
    object: serde_json::Value,
}

/// Parsed webhook event
#[derive(Clone, Debug)]
pub enum WebhookEvent {
    /// A hold was placed (`payment_intent.amount_capturable_updated`);
    /// funds are waiting for capture.
    HoldPlaced { intent: PaymentIntent },

    /// Funds settled (`payment_intent.succeeded`).
    PaymentSucceeded { intent: PaymentIntent },

    /// The attempt failed (`payment_intent.payment_failed`).
    PaymentFailed { intent: PaymentIntent },

    /// Unhandled event type
    Other { event_type: String },
}

/// Checks the `Stripe-Signature` scheme: HMAC-SHA256 over
/// `"<timestamp>.<payload>"` with the endpoint secret, hex-encoded,
/// compared against every `v1=` candidate in the header.
pub struct WebhookVerifier {
    secret: String,
}

impl WebhookVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verify `signature_header` against `payload` at the current time.
    pub fn verify(&self, payload: &str, signature_header: &str) -> Result<()> {
        self.verify_at(payload, signature_header, Utc::now().timestamp())
    }

    fn verify_at(&self, payload: &str, signature_header: &str, now: i64) -> Result<()> {
        let mut timestamp = "";
        let mut candidates = Vec::new();

        for element in signature_header.split(',') {
            if let Some(t) = element.strip_prefix("t=") {
                timestamp = t;
            } else if let Some(s) = element.strip_prefix("v1=") {
                candidates.push(s);
            }
        }

        if timestamp.is_empty() || candidates.is_empty() {
            return Err(PaymentError::WebhookSignature(
                "Invalid signature format".to_string(),
            ));
        }

        let timestamp: i64 = timestamp.parse().map_err(|_| {
            PaymentError::WebhookSignature("Invalid signature timestamp".to_string())
        })?;

        // The header is attacker-controlled; the subtraction must not
        // overflow on extreme timestamps.
        if now.saturating_sub(timestamp).saturating_abs() > SIGNATURE_TOLERANCE_SECS {
            return Err(PaymentError::WebhookSignature(
                "Signature timestamp outside tolerance".to_string(),
            ));
        }

        let signed_payload = format!("{timestamp}.{payload}");

        let mut mac = HmacSha256::new_from_slice(self.secret.as_bytes())
            .map_err(|e| PaymentError::WebhookSignature(format!("HMAC error: {e}")))?;
        mac.update(signed_payload.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());

        if candidates.iter().any(|candidate| *candidate == expected) {
            Ok(())
        } else {
            Err(PaymentError::WebhookSignature(
                "Signature verification failed".to_string(),
            ))
        }
    }
}

/// Webhook handler
pub struct WebhookHandler {
    processor: Arc<dyn PaymentProcessor>,
    verifier: WebhookVerifier,
}

impl WebhookHandler {
    pub fn new(processor: Arc<dyn PaymentProcessor>, secret: impl Into<String>) -> Self {
        Self {
            processor,
            verifier: WebhookVerifier::new(secret),
        }
    }

    /// Verify the signature and parse the payload into a [`WebhookEvent`].
    pub fn parse_event(&self, payload: &str, signature_header: &str) -> Result<WebhookEvent> {
        self.verifier.verify(payload, signature_header)?;

        let event: Event = serde_json::from_str(payload)
            .map_err(|e| PaymentError::WebhookParse(e.to_string()))?;

        tracing::info!(event = %event.id, event_type = %event.type_, "processing webhook");

        match event.type_.as_str() {
            "payment_intent.amount_capturable_updated" => Ok(WebhookEvent::HoldPlaced {
                intent: intent_object(event.data.object)?,
            }),
            "payment_intent.succeeded" => Ok(WebhookEvent::PaymentSucceeded {
                intent: intent_object(event.data.object)?,
            }),
            "payment_intent.payment_failed" => Ok(WebhookEvent::PaymentFailed {
                intent: intent_object(event.data.object)?,
            }),
            _ => Ok(WebhookEvent::Other {
                event_type: event.type_,
            }),
        }
    }

    /// Process a webhook event
    pub async fn handle(&self, event: WebhookEvent) -> Result<()> {
        match event {
            WebhookEvent::HoldPlaced { intent } => {
                tracing::info!(
                    intent = %intent.id,
                    amount = intent.amount_capturable,
                    "hold placed, charging the held card"
                );
                self.processor.capture_intent(&intent.id).await?;
            }

            WebhookEvent::PaymentSucceeded { intent } => {
                tracing::info!(intent = %intent.id, "payment received");
            }

            WebhookEvent::PaymentFailed { intent } => {
                tracing::warn!(intent = %intent.id, "payment failed");
            }

            WebhookEvent::Other { event_type } => {
                tracing::debug!(event_type = %event_type, "unhandled webhook event");
            }
        }

        Ok(())
    }
}

fn intent_object(object: serde_json::Value) -> Result<PaymentIntent> {
    serde_json::from_value(object)
        .map_err(|e| PaymentError::WebhookParse(format!("Invalid payment intent data: {e}")))
}
