use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{Value, json};
use sha2::Sha512;
use tracing::error;

use crate::{
    application::interfaces::payments::PaystackGateway,
    domain::value_objects::webhook_events::WebhookEvent,
};

type HmacSha512 = Hmac<Sha512>;

/// Minimal Paystack client built on reqwest.
pub struct PaystackClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

#[derive(Debug, Deserialize)]
struct PaystackEnvelope {
    status: bool,
    message: Option<String>,
}

impl PaystackClient {
    pub fn new(base_url: String, secret_key: String, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build paystack http client")?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key,
        })
    }

    async fn ensure_success(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status();
        let body = match resp.text().await {
            Ok(text) if !text.is_empty() => text,
            Ok(_) => "<empty response body>".to_string(),
            Err(err) => format!("<failed to read response body: {err}>"),
        };

        error!(
            status = %status,
            response_body = %body,
            context = %context,
            "paystack api request failed"
        );

        anyhow::bail!("Paystack API request failed: {} (status {})", context, status);
    }
}

#[async_trait]
impl PaystackGateway for PaystackClient {
    async fn initialize_transaction(
        &self,
        email: &str,
        amount_minor: i64,
        plan: &str,
    ) -> Result<Value> {
        // https://paystack.com/docs/api/transaction/#initialize
        let body = json!({
            "email": email,
            "amount": amount_minor.to_string(),
            "plan": plan,
        });

        let resp = self
            .http
            .post(format!("{}/transaction/initialize", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "initialize transaction").await?;

        let parsed: Value = resp.json().await?;
        Ok(parsed)
    }

    async fn disable_subscription(&self, subscription_code: &str, email_token: &str) -> Result<()> {
        // https://paystack.com/docs/api/subscription/#disable
        let body = json!({
            "code": subscription_code,
            "token": email_token,
        });

        let resp = self
            .http
            .post(format!("{}/subscription/disable", self.base_url))
            .header(AUTHORIZATION, format!("Bearer {}", self.secret_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await?;
        let resp = Self::ensure_success(resp, "disable subscription").await?;

        let envelope: PaystackEnvelope = resp.json().await?;
        if !envelope.status {
            anyhow::bail!(
                "Paystack declined subscription disable: {}",
                envelope.message.unwrap_or_else(|| "<no message>".to_string())
            );
        }

        Ok(())
    }

    /// Verifies the `x-paystack-signature` header. Paystack signs the raw
    /// body with HMAC-SHA512 under the account secret key.
    /// https://paystack.com/docs/payments/webhooks/#verify-event-origin
    fn verify_webhook_signature(&self, payload: &[u8], signature: &str) -> Result<WebhookEvent> {
        let provided = hex::decode(signature.trim()).context("signature header is not valid hex")?;

        let mut mac = HmacSha512::new_from_slice(self.secret_key.as_bytes())?;
        mac.update(payload);
        mac.verify_slice(&provided)
            .map_err(|_| anyhow::anyhow!("invalid webhook signature"))?;

        let event: WebhookEvent = serde_json::from_slice(payload)?;
        Ok(event)
    }
}
