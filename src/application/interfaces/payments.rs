use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::domain::value_objects::webhook_events::WebhookEvent;

/// Payment provider seam consumed by the orchestrator and the webhook
/// processor. The reqwest-backed client lives in infrastructure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PaystackGateway {
    /// Starts a checkout; the provider response is returned unmodified.
    async fn initialize_transaction(
        &self,
        email: &str,
        amount_minor: i64,
        plan: &str,
    ) -> Result<Value>;

    async fn disable_subscription(&self, subscription_code: &str, email_token: &str) -> Result<()>;

    /// Recomputes the body HMAC and constant-time-compares it against the
    /// signature header before parsing. A mismatch never reaches `apply`.
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent>;
}
