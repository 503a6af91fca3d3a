//! Mock Payment Processor
//!
//! Scriptable in-memory processor for tests and credential-less local runs.
//! Unscripted, it plays the hold-then-capture happy path: create/confirm
//! place a hold (`requires_capture`), capture settles it (`succeeded`).
//! Every call is recorded so tests can assert amounts and call counts.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{PaymentError, Result};
use crate::intent::{CreateIntent, IntentStatus, PaymentIntent};
use crate::processor::PaymentProcessor;

/// One recorded processor call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProcessorCall {
    Create {
        amount: i64,
        currency: String,
        payment_method: String,
    },
    Confirm {
        intent_id: String,
    },
    Capture {
        intent_id: String,
    },
}

/// In-memory [`PaymentProcessor`] with scripted responses.
///
/// Scripted results are consumed in FIFO order by whichever call comes
/// next; once the script is empty the default happy-path behavior takes
/// over.
#[derive(Default)]
pub struct MockProcessor {
    script: Mutex<VecDeque<Result<PaymentIntent>>>,
    calls: Mutex<Vec<ProcessorCall>>,
    last: Mutex<Option<PaymentIntent>>,
}

impl MockProcessor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an intent to be returned by the next call.
    pub fn push_intent(&self, intent: PaymentIntent) {
        self.script.lock().unwrap().push_back(Ok(intent));
    }

    /// Queue an error to be returned by the next call.
    pub fn push_error(&self, err: PaymentError) {
        self.script.lock().unwrap().push_back(Err(err));
    }

    /// Everything the processor has been asked to do, in order.
    pub fn calls(&self) -> Vec<ProcessorCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Build a plausible intent in `status` for scripting.
    pub fn intent_with_status(status: IntentStatus, amount: i64) -> PaymentIntent {
        let id = format!("pi_mock_{}", uuid::Uuid::new_v4().simple());
        let client_secret = Some(format!("{id}_secret_{}", uuid::Uuid::new_v4().simple()));
        PaymentIntent {
            id,
            status,
            amount,
            amount_capturable: if status == IntentStatus::RequiresCapture {
                amount
            } else {
                0
            },
            client_secret,
            currency: "usd".to_string(),
            created: Utc::now(),
        }
    }

    fn record(&self, call: ProcessorCall) {
        self.calls.lock().unwrap().push(call);
    }

    /// Pop the next scripted result, remembering successful intents so
    /// follow-up calls can find them by id.
    fn scripted(&self) -> Option<Result<PaymentIntent>> {
        let next = self.script.lock().unwrap().pop_front()?;
        if let Ok(intent) = &next {
            *self.last.lock().unwrap() = Some(intent.clone());
        }
        Some(next)
    }

    fn transition(&self, intent_id: &str, status: IntentStatus) -> Result<PaymentIntent> {
        let mut last = self.last.lock().unwrap();
        match last.as_mut() {
            Some(intent) if intent.id == intent_id => {
                intent.status = status;
                intent.amount_capturable = if status == IntentStatus::RequiresCapture {
                    intent.amount
                } else {
                    0
                };
                Ok(intent.clone())
            }
            _ => Err(PaymentError::Rejected(format!(
                "No such payment_intent: '{intent_id}'"
            ))),
        }
    }
}

#[async_trait]
impl PaymentProcessor for MockProcessor {
    async fn create_intent(&self, params: CreateIntent) -> Result<PaymentIntent> {
        self.record(ProcessorCall::Create {
            amount: params.amount,
            currency: params.currency.clone(),
            payment_method: params.payment_method.clone(),
        });

        if let Some(result) = self.scripted() {
            return result;
        }

        let mut intent =
            Self::intent_with_status(IntentStatus::RequiresCapture, params.amount);
        intent.currency = params.currency;
        *self.last.lock().unwrap() = Some(intent.clone());
        Ok(intent)
    }

    async fn confirm_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        self.record(ProcessorCall::Confirm {
            intent_id: intent_id.to_string(),
        });

        if let Some(result) = self.scripted() {
            return result;
        }

        self.transition(intent_id, IntentStatus::RequiresCapture)
    }

    async fn capture_intent(&self, intent_id: &str) -> Result<PaymentIntent> {
        self.record(ProcessorCall::Capture {
            intent_id: intent_id.to_string(),
        });

        if let Some(result) = self.scripted() {
            return result;
        }

        self.transition(intent_id, IntentStatus::Succeeded)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
