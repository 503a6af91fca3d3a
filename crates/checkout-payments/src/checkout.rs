//! Checkout Flow
//!
//! One round trip per `/pay` call: create or confirm the intent, capture
//! inline when the processor reports a hold, and fold the final status into
//! the browser-facing response shape. Nothing is persisted between calls;
//! the response is re-derived from the processor's returned status every
//! time.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::intent::{CreateIntent, IntentStatus, PaymentIntent};
use crate::processor::PaymentProcessor;

/// Denial text shown by the browser when the processor wants a different
/// payment method.
pub const CARD_DENIED_MESSAGE: &str =
    "Your card was denied, please provide a new payment method";

/// Placeholder order total in the smallest currency unit.
const PLACEHOLDER_ORDER_AMOUNT: i64 = 1400;

/// Total for the order, in the smallest currency unit.
///
/// Stand-in until real pricing lands. The total must be computed here on
/// the server; trusting a client-supplied amount would let the browser
/// pick its own price.
pub fn order_amount(items: &[serde_json::Value]) -> i64 {
    let _ = items;
    PLACEHOLDER_ORDER_AMOUNT
}

/// A `/pay` request body, discriminated by the presence of an intent id.
///
/// A body carrying `paymentIntentId` is the second leg of an
/// authentication challenge; anything else must look like a new payment.
/// When both shapes are present the intent id wins.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PayRequest {
    CompleteAuthentication(CompleteAuthentication),
    NewPayment(NewPayment),
}

/// First leg: collect a payment method and place the hold.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPayment {
    /// Line items chosen by the client; opaque until pricing exists.
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    /// ISO 4217 currency code
    pub currency: String,
    /// Payment method collected by the browser (`pm_...`)
    pub payment_method_id: String,
}

/// Second leg: the client finished its authentication challenge.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteAuthentication {
    pub payment_intent_id: String,
}

/// Client-facing outcome of a checkout call.
///
/// Serialized field names are the browser contract, hence camelCase.
/// `Denied` and `Unsettled` share the `{error}` shape on the wire but are
/// distinct outcomes: one asks for a new payment method, the other reports
/// a status outside the handled set.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PaymentResponse {
    /// The card requires an authentication challenge; the client completes
    /// it and calls back with the intent id.
    #[serde(rename_all = "camelCase")]
    RequiresAction {
        requires_action: bool,
        payment_intent_id: String,
        client_secret: Option<String>,
    },
    /// The processor would not take this payment method.
    Denied { error: String },
    /// Funds settled (or the intent finalized without needing a capture).
    #[serde(rename_all = "camelCase")]
    Complete {
        #[serde(skip_serializing_if = "Option::is_none")]
        client_secret: Option<String>,
    },
    /// Explicit fallback for statuses the contract does not cover
    /// (processing, canceled, unknown).
    Unsettled { error: String },
}

impl PaymentResponse {
    /// Fold a settled intent into the response contract.
    ///
    /// `requires_capture` is resolved by [`CheckoutFlow`] before this
    /// mapping runs and is therefore never produced for a client.
    pub fn from_intent(intent: &PaymentIntent) -> Self {
        match intent.status {
            IntentStatus::RequiresAction | IntentStatus::RequiresSourceAction => {
                PaymentResponse::RequiresAction {
                    requires_action: true,
                    payment_intent_id: intent.id.clone(),
                    client_secret: intent.client_secret.clone(),
                }
            }
            IntentStatus::RequiresPaymentMethod | IntentStatus::RequiresSource => {
                PaymentResponse::Denied {
                    error: CARD_DENIED_MESSAGE.to_string(),
                }
            }
            IntentStatus::Succeeded => {
                tracing::info!(intent = %intent.id, "payment received");
                PaymentResponse::Complete {
                    client_secret: intent.client_secret.clone(),
                }
            }
            status => {
                tracing::warn!(
                    intent = %intent.id,
                    status = status.as_str(),
                    "intent finished in an unhandled status"
                );
                PaymentResponse::Unsettled {
                    error: format!("payment not completed (status: {status})"),
                }
            }
        }
    }
}

/// Drives checkout calls against an injected processor.
#[derive(Clone)]
pub struct CheckoutFlow {
    processor: Arc<dyn PaymentProcessor>,
}

impl CheckoutFlow {
    pub fn new(processor: Arc<dyn PaymentProcessor>) -> Self {
        Self { processor }
    }

    /// Name of the processor behind this flow.
    pub fn processor_name(&self) -> &str {
        self.processor.name()
    }

    /// Handle one `/pay` call end to end.
    pub async fn process_payment(&self, request: PayRequest) -> Result<PaymentResponse> {
        let intent = match request {
            PayRequest::NewPayment(payment) => {
                let amount = order_amount(&payment.items);
                self.processor
                    .create_intent(CreateIntent {
                        amount,
                        currency: payment.currency,
                        payment_method: payment.payment_method_id,
                    })
                    .await?
            }
            PayRequest::CompleteAuthentication(auth) => {
                self.processor
                    .confirm_intent(&auth.payment_intent_id)
                    .await?
            }
        };

        let intent = self.settle(intent).await?;
        Ok(PaymentResponse::from_intent(&intent))
    }

    /// Resolve a hold before composing the response. Exactly one capture
    /// call is issued per hold; any other status passes through untouched.
    async fn settle(&self, intent: PaymentIntent) -> Result<PaymentIntent> {
        if intent.status != IntentStatus::RequiresCapture {
            return Ok(intent);
        }

        tracing::info!(
            intent = %intent.id,
            amount = intent.amount_capturable,
            "charging the held card"
        );
        self.processor.capture_intent(&intent.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaymentError;
    use crate::mock::{MockProcessor, ProcessorCall};
    use serde_json::json;

    fn parse(body: serde_json::Value) -> PayRequest {
        serde_json::from_value(body).unwrap()
    }

    fn flow_with_mock() -> (Arc<MockProcessor>, CheckoutFlow) {
        let mock = Arc::new(MockProcessor::new());
        let flow = CheckoutFlow::new(mock.clone());
        (mock, flow)
    }

    fn new_payment_body() -> serde_json::Value {
        json!({
            "items": [{"sku": "A"}],
            "currency": "usd",
            "paymentMethodId": "pm_card_visa"
        })
    }

    #[test]
    fn test_intent_id_presence_selects_confirm_leg() {
        let request = parse(json!({"paymentIntentId": "pi_123"}));
        assert_eq!(
            request,
            PayRequest::CompleteAuthentication(CompleteAuthentication {
                payment_intent_id: "pi_123".into()
            })
        );
    }

    #[test]
    fn test_payment_method_body_selects_new_payment() {
        let request = parse(new_payment_body());
        match request {
            PayRequest::NewPayment(payment) => {
                assert_eq!(payment.currency, "usd");
                assert_eq!(payment.payment_method_id, "pm_card_visa");
                assert_eq!(payment.items.len(), 1);
            }
            other => panic!("expected new payment, got {other:?}"),
        }
    }

    #[test]
    fn test_intent_id_wins_when_both_shapes_present() {
        let request = parse(json!({
            "paymentIntentId": "pi_123",
            "currency": "usd",
            "paymentMethodId": "pm_card_visa"
        }));
        assert!(matches!(request, PayRequest::CompleteAuthentication(_)));
    }

    #[test]
    fn test_items_are_optional_for_new_payments() {
        let request = parse(json!({
            "currency": "usd",
            "paymentMethodId": "pm_card_visa"
        }));
        match request {
            PayRequest::NewPayment(payment) => assert!(payment.items.is_empty()),
            other => panic!("expected new payment, got {other:?}"),
        }
    }

    #[test]
    fn test_body_matching_neither_shape_is_rejected() {
        let result: std::result::Result<PayRequest, _> =
            serde_json::from_value(json!({"currency": "usd"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_order_amount_ignores_items() {
        assert_eq!(order_amount(&[]), 1400);
        assert_eq!(order_amount(&[json!({"sku": "A"}), json!({"sku": "B"})]), 1400);
    }

    #[tokio::test]
    async fn test_new_payment_holds_then_captures_once() {
        let (mock, flow) = flow_with_mock();

        let response = flow.process_payment(parse(new_payment_body())).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(
            calls[0],
            ProcessorCall::Create { amount: 1400, .. }
        ));
        assert!(matches!(calls[1], ProcessorCall::Capture { .. }));
        assert!(matches!(response, PaymentResponse::Complete { client_secret: Some(_) }));
    }

    #[tokio::test]
    async fn test_client_supplied_amount_is_ignored() {
        let (mock, flow) = flow_with_mock();

        // An attacker-controlled amount field must not reach the processor.
        let body = json!({
            "items": [{"sku": "A"}],
            "currency": "usd",
            "paymentMethodId": "pm_card_visa",
            "amount": 1
        });
        flow.process_payment(parse(body)).await.unwrap();

        match &mock.calls()[0] {
            ProcessorCall::Create { amount, currency, .. } => {
                assert_eq!(*amount, 1400);
                assert_eq!(currency, "usd");
            }
            other => panic!("expected create, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authentication_challenge_passes_through() {
        let (mock, flow) = flow_with_mock();
        let pending = MockProcessor::intent_with_status(IntentStatus::RequiresAction, 1400);
        let intent_id = pending.id.clone();
        let secret = pending.client_secret.clone();
        mock.push_intent(pending);

        let response = flow.process_payment(parse(new_payment_body())).await.unwrap();

        assert_eq!(
            response,
            PaymentResponse::RequiresAction {
                requires_action: true,
                payment_intent_id: intent_id,
                client_secret: secret,
            }
        );
        // No capture may happen while the challenge is outstanding.
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_legacy_source_action_status_also_requires_action() {
        let (mock, flow) = flow_with_mock();
        mock.push_intent(MockProcessor::intent_with_status(
            IntentStatus::RequiresSourceAction,
            1400,
        ));

        let response = flow.process_payment(parse(new_payment_body())).await.unwrap();
        assert!(matches!(response, PaymentResponse::RequiresAction { .. }));
    }

    #[tokio::test]
    async fn test_denied_statuses_use_the_denial_message() {
        for status in [IntentStatus::RequiresPaymentMethod, IntentStatus::RequiresSource] {
            let (mock, flow) = flow_with_mock();
            mock.push_intent(MockProcessor::intent_with_status(status, 1400));

            let response = flow.process_payment(parse(new_payment_body())).await.unwrap();
            assert_eq!(
                response,
                PaymentResponse::Denied {
                    error: CARD_DENIED_MESSAGE.to_string(),
                }
            );
            assert_eq!(mock.calls().len(), 1);
        }
    }

    #[tokio::test]
    async fn test_direct_success_skips_capture() {
        let (mock, flow) = flow_with_mock();
        let settled = MockProcessor::intent_with_status(IntentStatus::Succeeded, 1400);
        let secret = settled.client_secret.clone();
        mock.push_intent(settled);

        let response = flow.process_payment(parse(new_payment_body())).await.unwrap();

        assert_eq!(response, PaymentResponse::Complete { client_secret: secret });
        assert_eq!(mock.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_leg_confirms_then_captures() {
        let (mock, flow) = flow_with_mock();
        let held = MockProcessor::intent_with_status(IntentStatus::RequiresCapture, 1400);
        let intent_id = held.id.clone();
        mock.push_intent(held);

        let response = flow
            .process_payment(parse(json!({"paymentIntentId": intent_id.clone()})))
            .await
            .unwrap();

        let calls = mock.calls();
        assert_eq!(
            calls[0],
            ProcessorCall::Confirm {
                intent_id: intent_id.clone()
            }
        );
        assert_eq!(calls[1], ProcessorCall::Capture { intent_id });
        assert!(matches!(response, PaymentResponse::Complete { .. }));
    }

    #[tokio::test]
    async fn test_processor_errors_propagate() {
        let (mock, flow) = flow_with_mock();
        mock.push_error(PaymentError::Unknown("stub outage".into()));

        let err = flow
            .process_payment(parse(new_payment_body()))
            .await
            .unwrap_err();
        assert!(matches!(err, PaymentError::Unknown(_)));
    }

    #[tokio::test]
    async fn test_uncovered_statuses_map_to_unsettled() {
        for (status, wire_name) in [
            (IntentStatus::Processing, "processing"),
            (IntentStatus::Canceled, "canceled"),
            (IntentStatus::Unknown, "unknown"),
        ] {
            let (mock, flow) = flow_with_mock();
            mock.push_intent(MockProcessor::intent_with_status(status, 1400));

            let response = flow.process_payment(parse(new_payment_body())).await.unwrap();
            assert_eq!(
                response,
                PaymentResponse::Unsettled {
                    error: format!("payment not completed (status: {wire_name})"),
                }
            );
        }
    }

    #[test]
    fn test_response_wire_shapes_are_exact() {
        let requires_action = PaymentResponse::RequiresAction {
            requires_action: true,
            payment_intent_id: "pi_1".into(),
            client_secret: Some("pi_1_secret".into()),
        };
        assert_eq!(
            serde_json::to_value(&requires_action).unwrap(),
            json!({
                "requiresAction": true,
                "paymentIntentId": "pi_1",
                "clientSecret": "pi_1_secret"
            })
        );

        let denied = PaymentResponse::Denied {
            error: CARD_DENIED_MESSAGE.to_string(),
        };
        assert_eq!(
            serde_json::to_value(&denied).unwrap(),
            json!({"error": CARD_DENIED_MESSAGE})
        );

        let complete = PaymentResponse::Complete {
            client_secret: Some("pi_1_secret".into()),
        };
        assert_eq!(
            serde_json::to_value(&complete).unwrap(),
            json!({"clientSecret": "pi_1_secret"})
        );

        // A finalized intent with no secret serializes to an empty object
        // rather than an explicit null.
        let complete_without_secret = PaymentResponse::Complete { client_secret: None };
        assert_eq!(
            serde_json::to_value(&complete_without_secret).unwrap(),
            json!({})
        );
    }
}
