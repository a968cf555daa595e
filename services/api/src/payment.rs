//! Payment gateway client
//!
//! Creates hosted-checkout transactions for the AI subscription and parses
//! the gateway's asynchronous status notifications. Signature verification
//! of notifications is the gateway SDK's concern and is not duplicated here.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::session::SessionUser;

/// Price of one month of AI subscription, in minor currency units.
pub const SUBSCRIPTION_PRICE: i64 = 50_000;

/// Payment gateway configuration
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Server-side API key, used to authenticate gateway calls
    pub server_key: String,
    /// Client-side key, handed to the frontend checkout widget
    pub client_key: String,
    /// Gateway base URL
    pub base_url: String,
}

impl PaymentConfig {
    /// Create a new PaymentConfig from environment variables
    ///
    /// # Environment Variables
    /// - `PAYMENT_SERVER_KEY`: server API key (required)
    /// - `PAYMENT_CLIENT_KEY`: client key (required)
    /// - `PAYMENT_BASE_URL`: gateway base URL (default: sandbox)
    pub fn from_env() -> Result<Self> {
        let server_key = std::env::var("PAYMENT_SERVER_KEY")
            .map_err(|_| anyhow::anyhow!("PAYMENT_SERVER_KEY environment variable not set"))?;
        let client_key = std::env::var("PAYMENT_CLIENT_KEY")
            .map_err(|_| anyhow::anyhow!("PAYMENT_CLIENT_KEY environment variable not set"))?;
        let base_url = std::env::var("PAYMENT_BASE_URL")
            .unwrap_or_else(|_| "https://app.sandbox.midtrans.com".to_string());

        Ok(Self {
            server_key,
            client_key,
            base_url,
        })
    }
}

/// A transaction freshly created at the gateway.
#[derive(Debug, Clone)]
pub struct CreatedTransaction {
    pub order_id: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
struct CheckoutTokenResponse {
    token: String,
}

/// Asynchronous status notification posted by the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentNotification {
    pub order_id: String,
    pub transaction_status: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
}

/// What a notification means for the stored transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationAction {
    /// Payment went through; activate what was purchased.
    Settle,
    /// Payment definitively failed.
    Fail,
    /// Intermediate or unknown status; leave the transaction as is.
    Ignore,
}

impl PaymentNotification {
    /// Parse a raw webhook body.
    pub fn parse(payload: &serde_json::Value) -> Result<Self> {
        let notification = serde_json::from_value(payload.clone())?;
        Ok(notification)
    }

    pub fn action(&self) -> NotificationAction {
        match self.transaction_status.as_str() {
            "capture" | "settlement" => {
                if self.fraud_status.as_deref() == Some("accept") {
                    NotificationAction::Settle
                } else {
                    NotificationAction::Ignore
                }
            }
            "cancel" | "deny" | "expire" => NotificationAction::Fail,
            _ => NotificationAction::Ignore,
        }
    }
}

/// Build the gateway order id for a subscription purchase.
pub fn subscription_order_id(whatsapp: &str, now: DateTime<Utc>) -> String {
    format!("SUB-AI-{}-{}", whatsapp, now.timestamp_millis())
}

/// Client for the payment gateway
#[derive(Clone)]
pub struct PaymentClient {
    http: reqwest::Client,
    config: PaymentConfig,
}

impl PaymentClient {
    pub fn new(config: PaymentConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    /// Key the frontend checkout widget needs.
    pub fn client_key(&self) -> &str {
        &self.config.client_key
    }

    /// Create a one-month subscription checkout at the gateway and return
    /// the order id and checkout token.
    pub async fn create_subscription_transaction(
        &self,
        user: &SessionUser,
        now: DateTime<Utc>,
    ) -> Result<CreatedTransaction> {
        let order_id = subscription_order_id(&user.whatsapp, now);

        let body = json!({
            "transaction_details": {
                "order_id": order_id,
                "gross_amount": SUBSCRIPTION_PRICE,
            },
            "item_details": [{
                "id": "AI_SUB_1M",
                "price": SUBSCRIPTION_PRICE,
                "quantity": 1,
                "name": "AI Stylist subscription (1 month)",
            }],
            "customer_details": {
                "first_name": user.name,
                "phone": user.whatsapp,
            },
        });

        let response: CheckoutTokenResponse = self
            .http
            .post(format!("{}/snap/v1/transactions", self.config.base_url))
            .basic_auth(&self.config.server_key, Some(""))
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        info!("Gateway transaction {} created", order_id);
        Ok(CreatedTransaction {
            order_id,
            token: response.token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification(status: &str, fraud: Option<&str>) -> PaymentNotification {
        PaymentNotification {
            order_id: "SUB-AI-628123-1".to_string(),
            transaction_status: status.to_string(),
            fraud_status: fraud.map(str::to_string),
        }
    }

    #[test]
    fn settlement_with_accepted_fraud_check_settles() {
        assert_eq!(
            notification("settlement", Some("accept")).action(),
            NotificationAction::Settle
        );
        assert_eq!(
            notification("capture", Some("accept")).action(),
            NotificationAction::Settle
        );
    }

    #[test]
    fn suspicious_or_missing_fraud_status_is_ignored() {
        assert_eq!(
            notification("settlement", Some("challenge")).action(),
            NotificationAction::Ignore
        );
        assert_eq!(notification("settlement", None).action(), NotificationAction::Ignore);
    }

    #[test]
    fn terminal_failures_fail() {
        for status in ["cancel", "deny", "expire"] {
            assert_eq!(notification(status, None).action(), NotificationAction::Fail);
        }
    }

    #[test]
    fn intermediate_statuses_are_ignored() {
        assert_eq!(notification("pending", None).action(), NotificationAction::Ignore);
        assert_eq!(notification("refund", None).action(), NotificationAction::Ignore);
    }

    #[test]
    fn parses_a_raw_webhook_body() {
        let payload = serde_json::json!({
            "order_id": "SUB-AI-628123456789-1700000000000",
            "transaction_status": "settlement",
            "fraud_status": "accept",
            "gross_amount": "50000.00",
        });
        let notification = PaymentNotification::parse(&payload).expect("parses");
        assert_eq!(notification.order_id, "SUB-AI-628123456789-1700000000000");
        assert_eq!(notification.action(), NotificationAction::Settle);
    }

    #[test]
    fn order_ids_embed_contact_and_timestamp() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp");
        assert_eq!(
            subscription_order_id("628123456789", now),
            "SUB-AI-628123456789-1700000000000"
        );
    }
}
