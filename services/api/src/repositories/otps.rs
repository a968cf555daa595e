//! OTP request repository

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::OtpRequest;

/// OTP repository. One row per WhatsApp number; issuing a new code
/// supersedes the previous one.
#[derive(Clone)]
pub struct OtpRepository {
    pool: PgPool,
}

impl OtpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a fresh code for a number, replacing any existing one.
    pub async fn upsert(
        &self,
        whatsapp_number: &str,
        code: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO otp_requests (whatsapp_number, otp_code, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (whatsapp_number)
            DO UPDATE SET otp_code = EXCLUDED.otp_code, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(whatsapp_number)
        .bind(code)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch the pending request for a number.
    pub async fn find(&self, whatsapp_number: &str) -> Result<Option<OtpRequest>> {
        let request = sqlx::query_as::<_, OtpRequest>(
            r#"
            SELECT whatsapp_number, otp_code, expires_at, created_at
            FROM otp_requests
            WHERE whatsapp_number = $1
            "#,
        )
        .bind(whatsapp_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(request)
    }

    /// Remove a consumed or invalidated request.
    pub async fn delete(&self, whatsapp_number: &str) -> Result<()> {
        sqlx::query("DELETE FROM otp_requests WHERE whatsapp_number = $1")
            .bind(whatsapp_number)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
