use std::fmt::Display;

use serde::{Deserialize, Serialize};

#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Pending,
    #[default]
    Active,
    Cancelled,
}

impl Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        };
        write!(f, "{}", status)
    }
}

impl SubscriptionStatus {
    pub fn from_str(value: &str) -> Self {
        match value {
            "pending" => SubscriptionStatus::Pending,
            "active" => SubscriptionStatus::Active,
            "cancelled" | "canceled" | "non-renewing" | "complete" => {
                SubscriptionStatus::Cancelled
            }
            // Paystack emits statuses we do not track, e.g. "attention".
            // Those must not grant access, so they land on Pending.
            _ => SubscriptionStatus::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_statuses_map_to_tracked_states() {
        assert_eq!(SubscriptionStatus::from_str("active"), SubscriptionStatus::Active);
        assert_eq!(SubscriptionStatus::from_str("pending"), SubscriptionStatus::Pending);
        assert_eq!(
            SubscriptionStatus::from_str("non-renewing"),
            SubscriptionStatus::Cancelled
        );
    }

    #[test]
    fn unrecognized_provider_status_does_not_activate() {
        assert_eq!(
            SubscriptionStatus::from_str("attention"),
            SubscriptionStatus::Pending
        );
        assert_eq!(SubscriptionStatus::from_str(""), SubscriptionStatus::Pending);
    }
}
