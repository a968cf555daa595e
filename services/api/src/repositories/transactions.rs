//! Payment transaction repository

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::models::{PaymentTransaction, TransactionStatus};

/// Payment transaction repository
#[derive(Clone)]
pub struct TransactionRepository {
    pool: PgPool,
}

impl TransactionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a freshly created gateway transaction as pending.
    pub async fn insert_pending(
        &self,
        order_id: &str,
        user_whatsapp: &str,
        amount: i64,
        transaction_token: &str,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO payment_transactions (order_id, user_whatsapp, amount, status, transaction_token)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(order_id)
        .bind(user_whatsapp)
        .bind(amount)
        .bind(TransactionStatus::Pending.as_str())
        .bind(transaction_token)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a transaction by gateway order id.
    pub async fn find(&self, order_id: &str) -> Result<Option<PaymentTransaction>> {
        let transaction = sqlx::query_as::<_, PaymentTransaction>(
            r#"
            SELECT order_id, user_whatsapp, amount, status, transaction_token, created_at
            FROM payment_transactions
            WHERE order_id = $1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }

    /// Mark a transaction successful, but only on the first transition from
    /// pending. Returns false for a replayed notification, which keeps the
    /// webhook idempotent per order id.
    pub async fn mark_success_if_pending(&self, order_id: &str) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE payment_transactions SET status = $1 WHERE order_id = $2 AND status = $3",
        )
        .bind(TransactionStatus::Success.as_str())
        .bind(order_id)
        .bind(TransactionStatus::Pending.as_str())
        .execute(&self.pool)
        .await?;

        let first_transition = result.rows_affected() == 1;
        if first_transition {
            info!("Transaction {} marked successful", order_id);
        }
        Ok(first_transition)
    }

    /// Mark a transaction failed (cancelled, denied, or expired upstream).
    pub async fn mark_failed(&self, order_id: &str) -> Result<()> {
        sqlx::query("UPDATE payment_transactions SET status = $1 WHERE order_id = $2")
            .bind(TransactionStatus::Failed.as_str())
            .bind(order_id)
            .execute(&self.pool)
            .await?;

        info!("Transaction {} marked failed", order_id);
        Ok(())
    }
}
