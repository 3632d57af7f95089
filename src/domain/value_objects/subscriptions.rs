use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entities::subscriptions::SubscriptionEntity;

#[derive(Debug, Clone, Deserialize)]
pub struct InitializeSubscriptionModel {
    pub plan: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActiveSubscriptionDto {
    pub id: Uuid,
    pub subscription_code: Option<String>,
    pub plan: String,
    pub amount: i64,
    pub status: String,
    pub next_payment_date: Option<DateTime<Utc>>,
}

impl From<SubscriptionEntity> for ActiveSubscriptionDto {
    fn from(entity: SubscriptionEntity) -> Self {
        Self {
            id: entity.id,
            subscription_code: entity.subscription_code,
            plan: entity.plan,
            amount: entity.amount_minor,
            status: entity.status,
            next_payment_date: entity.next_payment_date,
        }
    }
}
