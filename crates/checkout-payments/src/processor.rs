//! Payment Processor Abstraction
//!
//! The trait mirrors the three processor operations this service uses.
//! Implementations are stateless request/response clients; the intent state
//! machine stays on the processor side.

use async_trait::async_trait;

use crate::error::Result;
use crate::intent::{CreateIntent, PaymentIntent};

/// Client for the external processor's payment-intent API.
#[async_trait]
pub trait PaymentProcessor: Send + Sync {
    /// Create an intent with manual confirmation and manual capture,
    /// confirming it in the same call. A success either places a hold
    /// (`requires_capture`) or reports the next step the client must take.
    async fn create_intent(&self, params: CreateIntent) -> Result<PaymentIntent>;

    /// Confirm an existing intent after the client completed an
    /// authentication challenge (second leg of the 3-D Secure flow).
    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent>;

    /// Capture the funds held by a confirmed intent. Must happen within the
    /// processor's capture window; nothing here tracks that deadline.
    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent>;

    /// Processor name for logs and health reporting.
    fn name(&self) -> &str;
}
