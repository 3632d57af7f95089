use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::infrastructure::postgres::schema::subscriptions;

#[derive(Debug, Clone, Identifiable, Selectable, Queryable)]
#[diesel(table_name = subscriptions)]
pub struct SubscriptionEntity {
    pub id: Uuid,
    pub subscription_code: Option<String>,
    pub user_id: Uuid,
    pub plan: String,
    pub amount_minor: i64,
    pub status: String,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub email_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub struct InsertSubscriptionEntity {
    pub subscription_code: Option<String>,
    pub user_id: Uuid,
    pub plan: String,
    pub amount_minor: i64,
    pub status: String,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub email_token: Option<String>,
}

#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = subscriptions)]
pub struct UpdateSubscriptionEntity {
    pub plan: Option<String>,
    pub amount_minor: Option<i64>,
    pub status: Option<String>,
    pub next_payment_date: Option<DateTime<Utc>>,
    pub email_token: Option<String>,
}
