//! Application State & Configuration
//!
//! Configuration is read once from the environment at startup into an
//! immutable struct; handlers receive it through [`AppState`], never
//! through ambient globals.

use std::sync::Arc;

use checkout_payments::{
    CheckoutFlow, MockProcessor, PaymentProcessor, StripeProcessor, WebhookHandler,
};

/// Processor credentials and API pinning.
#[derive(Clone, Debug)]
pub struct StripeConfig {
    /// Secret API key for server-side calls (mock processor when unset)
    pub secret_key: Option<String>,
    /// Publishable key handed to the browser
    pub publishable_key: String,
    /// Optional API version sent with every processor call
    pub api_version: Option<String>,
    /// Endpoint secret for webhook signatures (webhooks disabled if unset)
    pub webhook_secret: Option<String>,
}

/// Settings read from the environment at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Address the HTTP listener binds
    pub bind_addr: String,
    /// Directory served at `/` (checkout page and assets)
    pub static_dir: String,
    pub stripe: StripeConfig,
}

impl AppConfig {
    /// Read configuration from the environment (`.env` already loaded).
    ///
    /// Without `STRIPE_SECRET_KEY` the server runs against the in-memory
    /// mock processor; once a secret key is present the publishable key
    /// must be set too.
    pub fn from_env() -> anyhow::Result<Self> {
        let secret_key = std::env::var("STRIPE_SECRET_KEY").ok();
        let publishable_key = if secret_key.is_some() {
            require("STRIPE_PUBLISHABLE_KEY")?
        } else {
            std::env::var("STRIPE_PUBLISHABLE_KEY").unwrap_or_else(|_| "pk_test_mock".into())
        };

        Ok(Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:4242".into()),
            static_dir: std::env::var("STATIC_DIR").unwrap_or_else(|_| "static".into()),
            stripe: StripeConfig {
                secret_key,
                publishable_key,
                api_version: std::env::var("STRIPE_API_VERSION").ok(),
                webhook_secret: std::env::var("STRIPE_WEBHOOK_SECRET").ok(),
            },
        })
    }
}

fn require(name: &str) -> anyhow::Result<String> {
    std::env::var(name).map_err(|_| anyhow::anyhow!("{name} is not set"))
}

/// Pick the processor for this run: Stripe when a secret key is
/// configured, the in-memory mock otherwise.
pub fn select_processor(stripe: &StripeConfig) -> Arc<dyn PaymentProcessor> {
    match &stripe.secret_key {
        Some(secret) => {
            let mut processor = StripeProcessor::new(secret);
            if let Some(version) = &stripe.api_version {
                tracing::info!("✓ Processor API version pinned to {}", version);
                processor = processor.with_api_version(version);
            }
            Arc::new(processor)
        }
        None => {
            tracing::warn!("⚠ STRIPE_SECRET_KEY not set - using the in-memory mock processor");
            Arc::new(MockProcessor::new())
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Checkout flow bound to the configured processor
    pub checkout: CheckoutFlow,

    /// Webhook handler (None until a webhook secret is configured)
    pub webhook: Option<Arc<WebhookHandler>>,

    /// Startup configuration, read-only
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire the state up from configuration and a processor.
    pub fn new(config: AppConfig, processor: Arc<dyn PaymentProcessor>) -> Self {
        let webhook = config
            .stripe
            .webhook_secret
            .clone()
            .map(|secret| Arc::new(WebhookHandler::new(processor.clone(), secret)));

        Self {
            checkout: CheckoutFlow::new(processor),
            webhook,
            config: Arc::new(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(webhook_secret: Option<&str>) -> AppConfig {
        AppConfig {
            bind_addr: "127.0.0.1:0".into(),
            static_dir: "static".into(),
            stripe: StripeConfig {
                secret_key: Some("sk_test_key".into()),
                publishable_key: "pk_test_key".into(),
                api_version: None,
                webhook_secret: webhook_secret.map(String::from),
            },
        }
    }

    #[test]
    fn test_webhook_handler_requires_a_secret() {
        let without = AppState::new(test_config(None), Arc::new(MockProcessor::new()));
        assert!(without.webhook.is_none());

        let with = AppState::new(
            test_config(Some("whsec_test")),
            Arc::new(MockProcessor::new()),
        );
        assert!(with.webhook.is_some());
    }

    #[test]
    fn test_processor_selection_follows_the_secret_key() {
        let mut config = test_config(None);
        assert_eq!(select_processor(&config.stripe).name(), "stripe");

        config.stripe.secret_key = None;
        assert_eq!(select_processor(&config.stripe).name(), "mock");
    }
}
