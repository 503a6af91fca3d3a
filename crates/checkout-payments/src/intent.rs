//! Payment Intent Wire Model
//!
//! The intent and its status state machine live entirely on the processor
//! side; these types mirror only the fields this service reads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle states a payment intent can report.
///
/// `RequiresSource` and `RequiresSourceAction` are emitted by accounts
/// pinned to API versions older than 2019-02-11 and mean the same thing as
/// `RequiresPaymentMethod` / `RequiresAction`. Status strings introduced
/// after this model was written deserialize as [`IntentStatus::Unknown`]
/// instead of failing the whole response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentStatus {
    RequiresPaymentMethod,
    RequiresSource,
    RequiresConfirmation,
    RequiresAction,
    RequiresSourceAction,
    Processing,
    RequiresCapture,
    Canceled,
    Succeeded,
    #[serde(other)]
    Unknown,
}

impl IntentStatus {
    /// Wire name of the status, for logs and error text.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentStatus::RequiresPaymentMethod => "requires_payment_method",
            IntentStatus::RequiresSource => "requires_source",
            IntentStatus::RequiresConfirmation => "requires_confirmation",
            IntentStatus::RequiresAction => "requires_action",
            IntentStatus::RequiresSourceAction => "requires_source_action",
            IntentStatus::Processing => "processing",
            IntentStatus::RequiresCapture => "requires_capture",
            IntentStatus::Canceled => "canceled",
            IntentStatus::Succeeded => "succeeded",
            IntentStatus::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for IntentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A payment intent as reported by the processor.
///
/// Unmodeled response fields are ignored on deserialization. This side
/// never mutates an intent directly; it only reads the snapshot and may
/// trigger a capture transition through the processor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaymentIntent {
    /// Opaque intent identifier (`pi_...`)
    pub id: String,
    /// Current lifecycle status
    pub status: IntentStatus,
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// Portion of `amount` currently held and still capturable
    #[serde(default)]
    pub amount_capturable: i64,
    /// Secret the browser uses to drive authentication challenges
    pub client_secret: Option<String>,
    /// ISO 4217 currency code
    pub currency: String,
    /// Creation time reported by the processor
    #[serde(with = "chrono::serde::ts_seconds")]
    pub created: DateTime<Utc>,
}

/// Parameters for creating an intent.
///
/// Confirmation and capture method are not parameters: every intent this
/// service creates uses manual confirmation and manual capture, confirmed
/// in the same call.
#[derive(Clone, Debug)]
pub struct CreateIntent {
    /// Amount in the smallest currency unit
    pub amount: i64,
    /// ISO 4217 currency code
    pub currency: String,
    /// Payment method identifier collected by the browser (`pm_...`)
    pub payment_method: String,
}
