use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// Denormalized per-user flag kept in sync by the webhook processor.
#[derive(Default, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubscriptionFlag {
    Active,
    #[default]
    Inactive,
}

impl Display for SubscriptionFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let flag = match self {
            SubscriptionFlag::Active => "active",
            SubscriptionFlag::Inactive => "inactive",
        };
        write!(f, "{}", flag)
    }
}

impl SubscriptionFlag {
    pub fn from_str(value: &str) -> Self {
        match value {
            "active" => SubscriptionFlag::Active,
            _ => SubscriptionFlag::Inactive,
        }
    }
}
