//! User model and related functionality

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// AI chat quota granted to a fresh or recently-booked free-tier user.
pub const DEFAULT_CHAT_QUOTA: i32 = 5;

/// Subscription state of the AI chat feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Inactive,
    Active,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Inactive => "inactive",
            SubscriptionStatus::Active => "active",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "active" => SubscriptionStatus::Active,
            _ => SubscriptionStatus::Inactive,
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub username: String,
    pub name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub whatsapp_number: String,
    pub created_at: DateTime<Utc>,
    pub ai_chat_quota: i32,
    pub ai_subscription_status: String,
    pub ai_subscription_expires_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn subscription_status(&self) -> SubscriptionStatus {
        SubscriptionStatus::from_str(&self.ai_subscription_status)
    }

    /// An active subscription that has not yet passed its expiry.
    pub fn is_subscribed(&self, now: DateTime<Utc>) -> bool {
        self.subscription_status() == SubscriptionStatus::Active
            && self.ai_subscription_expires_at.is_some_and(|exp| exp > now)
    }
}

/// New user creation payload. The password arrives already hashed because
/// registration stashes it in a pending record before the user row exists.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub whatsapp_number: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(status: &str, expires_at: Option<DateTime<Utc>>) -> User {
        User {
            username: "andi".to_string(),
            name: "Andi".to_string(),
            password_hash: "hash".to_string(),
            whatsapp_number: "628123456789".to_string(),
            created_at: Utc::now(),
            ai_chat_quota: DEFAULT_CHAT_QUOTA,
            ai_subscription_status: status.to_string(),
            ai_subscription_expires_at: expires_at,
        }
    }

    #[test]
    fn active_unexpired_subscription_counts() {
        let now = Utc::now();
        let u = user("active", Some(now + Duration::days(10)));
        assert!(u.is_subscribed(now));
    }

    #[test]
    fn expired_subscription_does_not_count() {
        let now = Utc::now();
        let u = user("active", Some(now - Duration::days(1)));
        assert!(!u.is_subscribed(now));
    }

    #[test]
    fn inactive_status_never_counts() {
        let now = Utc::now();
        let u = user("inactive", Some(now + Duration::days(10)));
        assert!(!u.is_subscribed(now));
        let u = user("inactive", None);
        assert!(!u.is_subscribed(now));
    }
}
