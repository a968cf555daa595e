//! Payment transaction model

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// Lifecycle status of a gateway transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Success,
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Success => "success",
            TransactionStatus::Failed => "failed",
        }
    }
}

/// Gateway transaction, keyed by the order id we hand to the gateway.
/// Status moves pending -> success|failed via the notification webhook.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PaymentTransaction {
    pub order_id: String,
    pub user_whatsapp: String,
    pub amount: i64,
    pub status: String,
    pub transaction_token: Option<String>,
    pub created_at: DateTime<Utc>,
}
