pub mod enums;
pub mod iam;
pub mod retry;
pub mod subscriptions;
pub mod uploads;
pub mod webhook_events;
