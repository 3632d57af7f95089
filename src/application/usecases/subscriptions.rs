use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::{
    application::interfaces::payments::PaystackGateway,
    domain::{
        repositories::{subscriptions::SubscriptionRepository, users::UserRepository},
        value_objects::{
            enums::subscription_flags::SubscriptionFlag,
            subscriptions::ActiveSubscriptionDto,
        },
    },
};

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("user not found")]
    UserNotFound,
    #[error("subscription not found")]
    SubscriptionNotFound,
    #[error("subscription is missing provider references")]
    MissingProviderReferences,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl SubscriptionError {
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;
        match self {
            SubscriptionError::UserNotFound | SubscriptionError::SubscriptionNotFound => {
                StatusCode::NOT_FOUND
            }
            SubscriptionError::MissingProviderReferences => StatusCode::CONFLICT,
            SubscriptionError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Thin synchronous façade over the payment provider. The real state
/// machine lives in the webhook processor; this only starts checkouts and
/// relays explicit cancellations.
pub struct SubscriptionUseCase<U, S, P>
where
    U: UserRepository + Send + Sync + 'static,
    S: SubscriptionRepository + Send + Sync + 'static,
    P: PaystackGateway + Send + Sync + 'static,
{
    user_repo: Arc<U>,
    subscription_repo: Arc<S>,
    paystack: Arc<P>,
}

impl<U, S, P> SubscriptionUseCase<U, S, P>
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

    pub async fn initialize(
        &self,
        user_id: Uuid,
        plan: &str,
        amount_minor: i64,
    ) -> Result<Value, SubscriptionError> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(SubscriptionError::UserNotFound)?;

        info!(%user_id, plan, amount_minor, "subscriptions: initializing checkout");
        let response = self
            .paystack
            .initialize_transaction(&user.email, amount_minor, plan)
            .await
            .map_err(|err| {
                error!(%user_id, plan, error = ?err, "subscriptions: provider initialize failed");
                SubscriptionError::Internal(err)
            })?;

        Ok(response)
    }

    pub async fn cancel(&self, user_id: Uuid, subscription_id: Uuid) -> Result<(), SubscriptionError> {
        let subscription = self
            .subscription_repo
            .find_by_id(subscription_id)
            .await?
            .ok_or(SubscriptionError::SubscriptionNotFound)?;

        // Another user's subscription id is indistinguishable from a missing one.
        if subscription.user_id != user_id {
            return Err(SubscriptionError::SubscriptionNotFound);
        }

        let (code, email_token) = match (
            subscription.subscription_code.as_deref(),
            subscription.email_token.as_deref(),
        ) {
            (Some(code), Some(token)) => (code, token),
            _ => {
                warn!(
                    %subscription_id,
                    "subscriptions: cancel requested before provider assigned references"
                );
                return Err(SubscriptionError::MissingProviderReferences);
            }
        };

        self.paystack
            .disable_subscription(code, email_token)
            .await
            .map_err(|err| {
                error!(
                    %subscription_id,
                    subscription_code = code,
                    error = ?err,
                    "subscriptions: provider disable failed"
                );
                SubscriptionError::Internal(err)
            })?;

        self.subscription_repo
            .mark_cancelled(subscription.id)
            .await?;
        self.user_repo
            .set_subscription_flag(subscription.user_id, SubscriptionFlag::Inactive)
            .await?;

        info!(
            %subscription_id,
            user_id = %subscription.user_id,
            "subscriptions: cancelled at provider and locally"
        );
        Ok(())
    }

    pub async fn fetch_active(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<ActiveSubscriptionDto>, SubscriptionError> {
        let subscriptions = self.subscription_repo.list_active_for_user(user_id).await?;
        Ok(subscriptions
            .into_iter()
            .map(ActiveSubscriptionDto::from)
            .collect())
    }
}
