//! HTTP Handlers

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use checkout_payments::{PayRequest, PaymentResponse};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub processor: String,
}

#[derive(Serialize)]
pub struct PublishableKeyResponse {
    /// Field name is the browser contract
    #[serde(rename = "publicKey")]
    pub public_key: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        processor: state.checkout.processor_name().to_string(),
    })
}

/// Hand the browser the publishable key it needs to initialize the
/// processor's client-side code.
pub async fn stripe_key(State(state): State<AppState>) -> Json<PublishableKeyResponse> {
    Json(PublishableKeyResponse {
        public_key: state.config.stripe.publishable_key.clone(),
    })
}

/// Create, confirm and settle a payment.
pub async fn pay(
    State(state): State<AppState>,
    Json(request): Json<PayRequest>,
) -> Result<Json<PaymentResponse>, (StatusCode, Json<ErrorResponse>)> {
    let response = state.checkout.process_payment(request).await.map_err(|e| {
        tracing::error!(kind = e.kind(), "processor call failed: {e}");
        // Client faults and transient faults alike collapse to 403 here;
        // the browser client treats every {error} payload the same way.
        (
            StatusCode::FORBIDDEN,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(response))
}

/// Processor webhook endpoint
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> Result<Json<WebhookAck>, (StatusCode, Json<ErrorResponse>)> {
    let handler = state.webhook.as_ref().ok_or_else(|| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: "Webhooks not configured".into(),
            }),
        )
    })?;

    let signature = headers
        .get("stripe-signature")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: "Missing signature header".into(),
                }),
            )
        })?;

    let event = handler.parse_event(&body, signature).map_err(|e| {
        tracing::warn!(kind = e.kind(), "webhook rejected: {e}");
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    handler.handle(event).await.map_err(|e| {
        tracing::error!(kind = e.kind(), "webhook processing failed: {e}");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    Ok(Json(WebhookAck { status: "success" }))
}
