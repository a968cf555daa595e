//! User repository for database operations

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::models::{NewUser, SubscriptionStatus, User};

const USER_COLUMNS: &str = "username, name, password_hash, whatsapp_number, created_at, \
                            ai_chat_quota, ai_subscription_status, ai_subscription_expires_at";

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a password for storage.
    pub fn hash_password(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
            .to_string();

        Ok(hash)
    }

    /// Verify a user's password against the stored hash.
    pub fn verify_password(user: &User, password: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|e| anyhow::anyhow!("Failed to parse password hash: {}", e))?;

        let argon2 = Argon2::default();
        Ok(argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Create a new user. The password hash was produced at registration
    /// time, before OTP verification.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        info!("Creating new user: {}", new_user.username);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, name, password_hash, whatsapp_number)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.username)
        .bind(&new_user.name)
        .bind(&new_user.password_hash)
        .bind(&new_user.whatsapp_number)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by username (case-insensitive) or WhatsApp number.
    pub async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            SELECT {USER_COLUMNS}
            FROM users
            WHERE LOWER(username) = LOWER($1) OR whatsapp_number = $1
            "#
        ))
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by WhatsApp number.
    pub async fn find_by_whatsapp(&self, whatsapp: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE whatsapp_number = $1"
        ))
        .bind(whatsapp)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Replace a user's password hash (password reset).
    pub async fn update_password(&self, whatsapp: &str, password_hash: &str) -> Result<()> {
        sqlx::query("UPDATE users SET password_hash = $1 WHERE whatsapp_number = $2")
            .bind(password_hash)
            .bind(whatsapp)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Take one unit of AI chat quota. Returns false when the quota was
    /// already exhausted; the counter never goes below zero.
    pub async fn decrement_quota(&self, whatsapp: &str) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users SET ai_chat_quota = ai_chat_quota - 1
            WHERE whatsapp_number = $1 AND ai_chat_quota > 0
            "#,
        )
        .bind(whatsapp)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Activate the AI subscription until the given expiry.
    pub async fn activate_subscription(
        &self,
        whatsapp: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        info!(
            "Activating subscription for {} until {}",
            whatsapp, expires_at
        );

        sqlx::query(
            r#"
            UPDATE users
            SET ai_subscription_status = $1, ai_subscription_expires_at = $2
            WHERE whatsapp_number = $3
            "#,
        )
        .bind(SubscriptionStatus::Active.as_str())
        .bind(expires_at)
        .bind(whatsapp)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::DEFAULT_CHAT_QUOTA;

    fn user_with_hash(hash: &str) -> User {
        User {
            username: "andi".to_string(),
            name: "Andi".to_string(),
            password_hash: hash.to_string(),
            whatsapp_number: "628123456789".to_string(),
            created_at: Utc::now(),
            ai_chat_quota: DEFAULT_CHAT_QUOTA,
            ai_subscription_status: "inactive".to_string(),
            ai_subscription_expires_at: None,
        }
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = UserRepository::hash_password("hunter42").expect("hashing succeeds");
        let user = user_with_hash(&hash);
        assert!(UserRepository::verify_password(&user, "hunter42").expect("verify runs"));
        assert!(!UserRepository::verify_password(&user, "hunter43").expect("verify runs"));
    }

    #[test]
    fn garbage_hash_is_an_error_not_a_match() {
        let user = user_with_hash("not-a-phc-string");
        assert!(UserRepository::verify_password(&user, "anything").is_err());
    }
}
