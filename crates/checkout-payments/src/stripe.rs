//! Stripe REST Client
//!
//! Speaks the payment-intent endpoints directly: form-encoded POSTs with
//! bearer auth, optionally pinned to an API version via the
//! `Stripe-Version` header. The base URL is overridable so tests can point
//! the client at a local stub.

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{PaymentError, Result};
use crate::intent::{CreateIntent, PaymentIntent};
use crate::processor::PaymentProcessor;

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

/// Production [`PaymentProcessor`] backed by Stripe's HTTP API.
pub struct StripeProcessor {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
    api_version: Option<String>,
}

impl StripeProcessor {
    /// Create a client for the given secret key against the live API host.
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_API_BASE.to_string(),
            secret_key: secret_key.into(),
            api_version: None,
        }
    }

    /// Pin every call to a specific API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    /// Point the client at a different host (tests run against a stub).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn post_form(&self, path: &str, form: &[(&str, String)]) -> Result<PaymentIntent> {
        let url = format!("{}/v1/{}", self.base_url, path);
        tracing::debug!(%url, "calling payment processor");

        let mut request = self.http.post(&url).bearer_auth(&self.secret_key).form(form);
        if let Some(version) = &self.api_version {
            request = request.header("Stripe-Version", version);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.json::<PaymentIntent>().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(classify_failure(status, &body))
        }
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_intent(&self, params: CreateIntent) -> Result<PaymentIntent> {
        let form = [
            ("amount", params.amount.to_string()),
            ("currency", params.currency),
            ("payment_method", params.payment_method),
            ("confirmation_method", "manual".to_string()),
            ("capture_method", "manual".to_string()),
            ("confirm", "true".to_string()),
        ];
        self.post_form("payment_intents", &form).await
    }

    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        self.post_form(&format!("payment_intents/{intent_id}/confirm"), &[])
            .await
    }

    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        self.post_form(&format!("payment_intents/{intent_id}/capture"), &[])
            .await
    }

    fn name(&self) -> &str {
        "stripe"
    }
}

/// Error envelope Stripe wraps around non-2xx responses.
#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    #[serde(rename = "type")]
    kind: Option<String>,
    message: Option<String>,
}

/// Sort a failed response into the error taxonomy.
///
/// 401 always means our credentials were rejected, whatever `type` the
/// body carries. Card and invalid-request errors are the caller's fault;
/// everything else stays unclassified.
fn classify_failure(status: reqwest::StatusCode, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<ApiErrorEnvelope>(body).ok();

    let message = parsed
        .as_ref()
        .and_then(|envelope| envelope.error.message.clone())
        .unwrap_or_else(|| format!("HTTP {status} from payment processor"));

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return PaymentError::Auth(message);
    }

    let kind = parsed
        .as_ref()
        .and_then(|envelope| envelope.error.kind.as_deref())
        .unwrap_or("");

    match kind {
        "card_error" | "invalid_request_error" | "idempotency_error" => {
            PaymentError::Rejected(message)
        }
        _ => PaymentError::Unknown(message),
    }
}
