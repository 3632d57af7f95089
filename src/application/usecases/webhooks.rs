use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::{
    application::interfaces::payments::PaystackGateway,
    domain::{
        entities::subscriptions::{InsertSubscriptionEntity, UpdateSubscriptionEntity},
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::{
            enums::{
                subscription_flags::SubscriptionFlag, subscription_statuses::SubscriptionStatus,
            },
            webhook_events::{EventKind, WebhookEvent, WebhookEventData},
        },
    },
};

#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("invalid webhook signature")]
    InvalidSignature,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl WebhookError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            WebhookError::InvalidSignature => StatusCode::BAD_REQUEST,
            WebhookError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Applies provider webhook deliveries to subscription and user records.
/// Every apply path is an upsert or a no-op, so redelivered events converge
/// to the same state. Missing linkage (unknown user or code) is acknowledged
/// rather than errored: redelivery cannot resolve it.
pub struct WebhookUseCase<U, S, P>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaystackGateway + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    subscription_repo: Arc<S>,
    paystack: Arc<P>,
}

impl<U, S, P> WebhookUseCase<U, S, P>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaystackGateway + Send + Sync + 'static,
{
    pub fn new(user_repo: Arc<U>, subscription_repo: Arc<S>, paystack: Arc<P>) -> Self {
        Self {
            user_repo,
            subscription_repo,
            paystack,
        }
    }

    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<(), WebhookError> {
        let event = self
            .paystack
            .verify_webhook_signature(payload, signature)
            .map_err(|err| {
                warn!(error = %err, "webhooks: signature verification failed");
                WebhookError::InvalidSignature
            })?;

        info!(event_type = %event.event, "webhooks: verified delivery");

        match event.kind() {
            EventKind::SubscriptionCreate => self.apply_create(&event.data).await,
            EventKind::SubscriptionUpdate => self.apply_update(&event.data).await,
            EventKind::SubscriptionCancel => self.apply_cancel(&event.data).await,
            EventKind::Unknown => {
                debug!(event_type = %event.event, "webhooks: ignoring unhandled event type");
                Ok(())
            }
        }
    }

    async fn apply_create(&self, data: &WebhookEventData) -> Result<(), WebhookError> {
        let Some(code) = data.subscription_code.as_deref() else {
            warn!("webhooks: create event without subscription_code, acknowledging");
            return Ok(());
        };
        let Some(email) = data.customer.as_ref().and_then(|c| c.email.as_deref()) else {
            warn!(subscription_code = code, "webhooks: create event without customer email");
            return Ok(());
        };

        let user = match self.user_repo.find_by_email(email).await.map_err(|err| {
            error!(subscription_code = code, db_error = ?err, "webhooks: user lookup failed");
            WebhookError::Internal(err)
        })? {
            Some(user) => user,
            None => {
                // The event may race ahead of account linkage; redelivery
                // with the same unknown email would fail the same way.
                info!(
                    subscription_code = code,
                    "webhooks: no user for billing email, acknowledging"
                );
                return Ok(());
            }
        };

        let insert = InsertSubscriptionEntity {
            subscription_code: Some(code.to_string()),
            user_id: user.id,
            plan: data
                .plan
                .as_ref()
                .and_then(|p| p.name())
                .unwrap_or("unknown")
                .to_string(),
            amount_minor: data.amount.unwrap_or(0),
            status: SubscriptionStatus::Active.to_string(),
            next_payment_date: data.next_payment_date,
            email_token: data.email_token.clone(),
        };

        self.subscription_repo
            .upsert_by_code(insert)
            .await
            .map_err(|err| {
                error!(
                    subscription_code = code,
                    user_id = %user.id,
                    db_error = ?err,
                    "webhooks: subscription upsert failed"
                );
                WebhookError::Internal(err)
            })?;

        // One active subscription per user: activating this code retires
        // any other active row the user holds.
        self.subscription_repo
            .deactivate_other_active(user.id, code)
            .await
            .map_err(WebhookError::Internal)?;

        self.user_repo
            .set_subscription_flag(user.id, SubscriptionFlag::Active)
            .await
            .map_err(|err| {
                error!(
                    user_id = %user.id,
                    db_error = ?err,
                    "webhooks: failed to flag user active"
                );
                WebhookError::Internal(err)
            })?;

        info!(
            subscription_code = code,
            user_id = %user.id,
            "webhooks: subscription created and user activated"
        );
        Ok(())
    }

    async fn apply_update(&self, data: &WebhookEventData) -> Result<(), WebhookError> {
        let Some(code) = data.subscription_code.as_deref() else {
            warn!("webhooks: update event without subscription_code, acknowledging");
            return Ok(());
        };

        let existing = self
            .subscription_repo
            .find_by_code(code)
            .await
            .map_err(WebhookError::Internal)?;

        let Some(subscription) = existing else {
            // Update delivered ahead of the create: store it instead of
            // failing.
            info!(
                subscription_code = code,
                "webhooks: update for unknown code, storing as late create"
            );
            return self.apply_create(data).await;
        };

        // Cancelled is terminal. A stale charge.success delivered after the
        // cancel must not flip the row back while the owner's flag stays
        // inactive.
        if SubscriptionStatus::from_str(&subscription.status) == SubscriptionStatus::Cancelled {
            debug!(
                subscription_code = code,
                "webhooks: update for cancelled subscription, acknowledging"
            );
            return Ok(());
        }

        let update = UpdateSubscriptionEntity {
            plan: data.plan.as_ref().and_then(|p| p.name()).map(String::from),
            amount_minor: data.amount,
            status: data
                .status
                .as_deref()
                .map(|s| SubscriptionStatus::from_str(s).to_string()),
            next_payment_date: data.next_payment_date,
            email_token: data.email_token.clone(),
        };

        self.subscription_repo
            .update_billing_fields(subscription.id, update)
            .await
            .map_err(|err| {
                error!(
                    subscription_code = code,
                    db_error = ?err,
                    "webhooks: billing field update failed"
                );
                WebhookError::Internal(err)
            })?;

        info!(subscription_code = code, "webhooks: subscription renewed");
        Ok(())
    }

    async fn apply_cancel(&self, data: &WebhookEventData) -> Result<(), WebhookError> {
        let Some(code) = data.subscription_code.as_deref() else {
            warn!("webhooks: cancel event without subscription_code, acknowledging");
            return Ok(());
        };

        let subscription = match self
            .subscription_repo
            .find_by_code(code)
            .await
            .map_err(WebhookError::Internal)?
        {
            Some(subscription) => subscription,
            None => {
                info!(
                    subscription_code = code,
                    "webhooks: cancel for unknown code, acknowledging"
                );
                return Ok(());
            }
        };

        if SubscriptionStatus::from_str(&subscription.status) == SubscriptionStatus::Cancelled {
            debug!(subscription_code = code, "webhooks: already cancelled, no-op");
            return Ok(());
        }

        self.subscription_repo
            .mark_cancelled(subscription.id)
            .await
            .map_err(|err| {
                error!(
                    subscription_code = code,
                    db_error = ?err,
                    "webhooks: cancel transition failed"
                );
                WebhookError::Internal(err)
            })?;

        self.user_repo
            .set_subscription_flag(subscription.user_id, SubscriptionFlag::Inactive)
            .await
            .map_err(WebhookError::Internal)?;

        info!(
            subscription_code = code,
            user_id = %subscription.user_id,
            "webhooks: subscription cancelled and user deactivated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use mockall::predicate::eq;
    use uuid::Uuid;

    use crate::{
        application::interfaces::payments::MockPaystackGateway,
        domain::{
            entities::{subscriptions::SubscriptionEntity, users::UserEntity},
            repositories::{
                subscriptions::MockSubscriptionRepository, users::MockUserRepository,
            },
            value_objects::webhook_events::CustomerField,
        },
    };

    fn user_fixture(email: &str) -> UserEntity {
        UserEntity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            subscription_active: SubscriptionFlag::Inactive.to_string(),
            created_at: Utc::now(),
        }
    }

    fn subscription_fixture(code: &str, user_id: Uuid, status: SubscriptionStatus) -> SubscriptionEntity {
        SubscriptionEntity {
            id: Uuid::new_v4(),
            subscription_code: Some(code.to_string()),
            user_id,
            plan: "monthly-pro".to_string(),
            amount_minor: 500000,
            status: status.to_string(),
            next_payment_date: None,
            email_token: Some("tok_xyz".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn create_event(code: &str, email: &str) -> WebhookEvent {
        WebhookEvent {
            event: "subscription.create".to_string(),
            data: WebhookEventData {
                subscription_code: Some(code.to_string()),
                status: Some("active".to_string()),
                amount: Some(500000),
                plan: None,
                customer: Some(CustomerField {
                    email: Some(email.to_string()),
                }),
                next_payment_date: None,
                email_token: Some("tok_xyz".to_string()),
            },
        }
    }

    fn gateway_returning(event: WebhookEvent) -> MockPaystackGateway {
        let mut gateway = MockPaystackGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(move |_, _| Ok(event.clone()));
        gateway
    }

    #[tokio::test]
    async fn invalid_signature_rejects_without_touching_store() {
        let mut gateway = MockPaystackGateway::new();
        gateway
            .expect_verify_webhook_signature()
            .returning(|_, _| Err(anyhow::anyhow!("invalid webhook signature")));

        // No expectations set: any repository call panics the test.
        let usecase = WebhookUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(gateway),
        );

        let result = usecase.handle_webhook(b"{}", "deadbeef").await;
        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[tokio::test]
    async fn create_event_upserts_subscription_and_activates_user() {
        let user = user_fixture("u2@example.com");
        let user_id = user.id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .withf(|email| email == "u2@example.com")
            .returning(move |_| Ok(Some(user.clone())));
        user_repo
            .expect_set_subscription_flag()
            .with(eq(user_id), eq(SubscriptionFlag::Active))
            .times(1)
            .returning(|_, _| Ok(()));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_upsert_by_code()
            .withf(move |insert| {
                insert.subscription_code.as_deref() == Some("SUB1")
                    && insert.user_id == user_id
                    && insert.status == SubscriptionStatus::Active.to_string()
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));
        subscription_repo
            .expect_deactivate_other_active()
            .with(eq(user_id), eq("SUB1"))
            .times(1)
            .returning(|_, _| Ok(0));

        let usecase = WebhookUseCase::new(
            Arc::new(user_repo),
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(create_event("SUB1", "u2@example.com"))),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn redelivered_create_event_converges_to_same_state() {
        let user = user_fixture("u2@example.com");
        let user_id = user.id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .times(2)
            .returning(move |_| Ok(Some(user.clone())));
        user_repo
            .expect_set_subscription_flag()
            .with(eq(user_id), eq(SubscriptionFlag::Active))
            .times(2)
            .returning(|_, _| Ok(()));

        let mut subscription_repo = MockSubscriptionRepository::new();
        // The upsert is keyed by the code, so the second delivery refreshes
        // the same row instead of inserting a duplicate.
        subscription_repo
            .expect_upsert_by_code()
            .withf(|insert| insert.subscription_code.as_deref() == Some("SUB1"))
            .times(2)
            .returning(|_| Ok(Uuid::new_v4()));
        subscription_repo
            .expect_deactivate_other_active()
            .times(2)
            .returning(|_, _| Ok(0));

        let usecase = WebhookUseCase::new(
            Arc::new(user_repo),
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(create_event("SUB1", "u2@example.com"))),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn missing_user_is_acknowledged_without_writes() {
        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(|_| Ok(None));

        let usecase = WebhookUseCase::new(
            Arc::new(user_repo),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(gateway_returning(create_event(
                "SUB1",
                "nobody@example.com",
            ))),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn update_for_known_code_refreshes_billing_fields() {
        let user_id = Uuid::new_v4();
        let subscription = subscription_fixture("SUB1", user_id, SubscriptionStatus::Active);
        let subscription_id = subscription.id;

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_code()
            .with(eq("SUB1"))
            .returning(move |_| Ok(Some(subscription.clone())));
        subscription_repo
            .expect_update_billing_fields()
            .withf(move |id, update| *id == subscription_id && update.amount_minor == Some(750000))
            .times(1)
            .returning(|_, _| Ok(()));

        let event = WebhookEvent {
            event: "charge.success".to_string(),
            data: WebhookEventData {
                subscription_code: Some("SUB1".to_string()),
                status: Some("active".to_string()),
                amount: Some(750000),
                plan: None,
                customer: None,
                next_payment_date: None,
                email_token: None,
            },
        };

        let usecase = WebhookUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(event)),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn stale_renewal_after_cancel_does_not_reactivate() {
        let user_id = Uuid::new_v4();
        let cancelled = subscription_fixture("SUB1", user_id, SubscriptionStatus::Cancelled);

        // No update_billing_fields expectation: writing to the cancelled row
        // panics the test.
        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_code()
            .with(eq("SUB1"))
            .returning(move |_| Ok(Some(cancelled.clone())));

        let event = WebhookEvent {
            event: "charge.success".to_string(),
            data: WebhookEventData {
                subscription_code: Some("SUB1".to_string()),
                status: Some("active".to_string()),
                amount: Some(500000),
                ..Default::default()
            },
        };

        let usecase = WebhookUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(event)),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn update_for_unknown_code_is_stored_as_late_create() {
        let user = user_fixture("u2@example.com");
        let user_id = user.id;

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));
        user_repo
            .expect_set_subscription_flag()
            .times(1)
            .returning(|_, _| Ok(()));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_find_by_code()
            .with(eq("SUB9"))
            .returning(|_| Ok(None));
        subscription_repo
            .expect_upsert_by_code()
            .withf(move |insert| {
                insert.subscription_code.as_deref() == Some("SUB9") && insert.user_id == user_id
            })
            .times(1)
            .returning(|_| Ok(Uuid::new_v4()));
        subscription_repo
            .expect_deactivate_other_active()
            .times(1)
            .returning(|_, _| Ok(0));

        let mut event = create_event("SUB9", "u2@example.com");
        event.event = "subscription.update".to_string();

        let usecase = WebhookUseCase::new(
            Arc::new(user_repo),
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(event)),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn cancel_twice_is_idempotent() {
        let user_id = Uuid::new_v4();
        let active = subscription_fixture("SUB1", user_id, SubscriptionStatus::Active);
        let cancelled = subscription_fixture("SUB1", user_id, SubscriptionStatus::Cancelled);

        let mut subscription_repo = MockSubscriptionRepository::new();
        let mut deliveries = vec![Some(cancelled), Some(active)];
        subscription_repo
            .expect_find_by_code()
            .times(2)
            .returning(move |_| Ok(deliveries.pop().flatten()));
        subscription_repo
            .expect_mark_cancelled()
            .times(1)
            .returning(|_| Ok(()));

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_set_subscription_flag()
            .with(eq(user_id), eq(SubscriptionFlag::Inactive))
            .times(1)
            .returning(|_, _| Ok(()));

        let event = WebhookEvent {
            event: "subscription.not_renew".to_string(),
            data: WebhookEventData {
                subscription_code: Some("SUB1".to_string()),
                ..Default::default()
            },
        };

        let usecase = WebhookUseCase::new(
            Arc::new(user_repo),
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(event)),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
        // Second delivery finds the row already cancelled and does nothing.
        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_event_type_is_acknowledged() {
        let event = WebhookEvent {
            event: "charge.dispute.create".to_string(),
            data: WebhookEventData::default(),
        };

        let usecase = WebhookUseCase::new(
            Arc::new(MockUserRepository::new()),
            Arc::new(MockSubscriptionRepository::new()),
            Arc::new(gateway_returning(event)),
        );

        usecase.handle_webhook(b"{}", "sig").await.unwrap();
    }

    #[tokio::test]
    async fn store_failure_is_surfaced_as_retry_worthy() {
        let user = user_fixture("u2@example.com");

        let mut user_repo = MockUserRepository::new();
        user_repo
            .expect_find_by_email()
            .returning(move |_| Ok(Some(user.clone())));

        let mut subscription_repo = MockSubscriptionRepository::new();
        subscription_repo
            .expect_upsert_by_code()
            .returning(|_| Err(anyhow::anyhow!("store unavailable")));

        let usecase = WebhookUseCase::new(
            Arc::new(user_repo),
            Arc::new(subscription_repo),
            Arc::new(gateway_returning(create_event("SUB1", "u2@example.com"))),
        );

        let result = usecase.handle_webhook(b"{}", "sig").await;
        let err = result.unwrap_err();
        assert!(matches!(err, WebhookError::Internal(_)));
        assert_eq!(err.status_code(), axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
