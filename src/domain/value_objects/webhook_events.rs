use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A verified provider webhook delivery. Produced only by
/// `PaystackGateway::verify_webhook_signature`; never built from an
/// unverified body.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub data: WebhookEventData,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEventData {
    pub subscription_code: Option<String>,
    pub status: Option<String>,
    pub amount: Option<i64>,
    pub plan: Option<PlanField>,
    pub customer: Option<CustomerField>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub email_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerField {
    pub email: Option<String>,
}

/// The provider sends `plan` either as a bare plan code or as an object.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PlanField {
    Named { name: Option<String> },
    Bare(String),
}

impl PlanField {
    pub fn name(&self) -> Option<&str> {
        match self {
            PlanField::Named { name } => name.as_deref(),
            PlanField::Bare(name) => Some(name.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    SubscriptionCreate,
    SubscriptionUpdate,
    SubscriptionCancel,
    Unknown,
}

impl WebhookEvent {
    pub fn kind(&self) -> EventKind {
        match self.event.as_str() {
            "subscription.create" => EventKind::SubscriptionCreate,
            "charge.success" | "subscription.update" => EventKind::SubscriptionUpdate,
            "subscription.not_renew" | "subscription.disable" => EventKind::SubscriptionCancel,
            _ => EventKind::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_event_types() {
        let kind = |event: &str| WebhookEvent {
            event: event.to_string(),
            data: WebhookEventData::default(),
        }
        .kind();

        assert_eq!(kind("subscription.create"), EventKind::SubscriptionCreate);
        assert_eq!(kind("charge.success"), EventKind::SubscriptionUpdate);
        assert_eq!(kind("subscription.update"), EventKind::SubscriptionUpdate);
        assert_eq!(kind("subscription.not_renew"), EventKind::SubscriptionCancel);
        assert_eq!(kind("subscription.disable"), EventKind::SubscriptionCancel);
        assert_eq!(kind("charge.dispute.create"), EventKind::Unknown);
    }

    #[test]
    fn parses_subscription_create_payload() {
        let body = serde_json::json!({
            "event": "subscription.create",
            "data": {
                "subscription_code": "SUB_abc123",
                "status": "active",
                "amount": 500000,
                "plan": { "name": "monthly-pro" },
                "customer": { "email": "user@example.com" },
                "next_payment_date": "2026-09-24T00:00:00Z",
                "email_token": "tok_xyz"
            }
        });

        let event: WebhookEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.kind(), EventKind::SubscriptionCreate);
        assert_eq!(event.data.subscription_code.as_deref(), Some("SUB_abc123"));
        assert_eq!(
            event.data.plan.as_ref().and_then(|p| p.name()),
            Some("monthly-pro")
        );
        assert_eq!(
            event.data.customer.as_ref().and_then(|c| c.email.as_deref()),
            Some("user@example.com")
        );
        assert_eq!(event.data.amount, Some(500000));
    }

    #[test]
    fn tolerates_unknown_shape_without_field_errors() {
        let body = serde_json::json!({
            "event": "transfer.success",
            "data": { "reference": "ref_1" }
        });

        let event: WebhookEvent = serde_json::from_value(body).unwrap();
        assert_eq!(event.kind(), EventKind::Unknown);
        assert!(event.data.subscription_code.is_none());
    }

    #[test]
    fn accepts_bare_plan_codes() {
        let body = serde_json::json!({
            "event": "charge.success",
            "data": { "plan": "PLN_basic" }
        });

        let event: WebhookEvent = serde_json::from_value(body).unwrap();
        assert_eq!(
            event.data.plan.as_ref().and_then(|p| p.name()),
            Some("PLN_basic")
        );
    }
}
