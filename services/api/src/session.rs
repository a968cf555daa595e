//! Session and pending-registration storage in Redis
//!
//! Login sessions are keyed by a random UUID carried in the session cookie.
//! Registrations awaiting OTP verification are stored as their own
//! short-lived records keyed by WhatsApp number, so an unverified signup
//! never touches the users table.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use common::cache::RedisPool;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "session_id";

/// How long a login session lives without re-authentication.
pub const SESSION_TTL_SECONDS: u64 = 24 * 60 * 60;

/// How long an unverified registration is kept waiting for its OTP.
pub const REGISTRATION_TTL_SECONDS: u64 = 15 * 60;

/// The logged-in identity carried by a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionUser {
    pub username: String,
    pub name: String,
    pub whatsapp: String,
}

/// Registration data held until the OTP is verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRegistration {
    pub username: String,
    pub name: String,
    pub password_hash: String,
    pub whatsapp_number: String,
}

/// Session manager for handling user sessions in Redis
#[derive(Clone)]
pub struct SessionManager {
    redis_pool: RedisPool,
}

impl SessionManager {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }

    /// Create a new session and return its id for the cookie.
    pub async fn create_session(&self, user: &SessionUser) -> Result<Uuid> {
        let session_id = Uuid::new_v4();
        info!("Creating session for user: {}", user.username);

        let payload = serde_json::to_string(user)?;
        self.redis_pool
            .set(
                &session_key(session_id),
                &payload,
                Some(SESSION_TTL_SECONDS),
            )
            .await?;

        Ok(session_id)
    }

    /// Look up the user bound to a session id.
    pub async fn get_session(&self, session_id: Uuid) -> Result<Option<SessionUser>> {
        let payload = self.redis_pool.get(&session_key(session_id)).await?;

        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Delete a session (logout).
    pub async fn delete_session(&self, session_id: Uuid) -> Result<()> {
        info!("Deleting session {}", session_id);
        self.redis_pool.delete(&session_key(session_id)).await?;
        Ok(())
    }
}

fn session_key(session_id: Uuid) -> String {
    format!("session:{}", session_id)
}

/// Store for registrations awaiting OTP verification
#[derive(Clone)]
pub struct RegistrationStore {
    redis_pool: RedisPool,
}

impl RegistrationStore {
    pub fn new(redis_pool: RedisPool) -> Self {
        Self { redis_pool }
    }

    /// Stash a pending registration, superseding any previous one for the
    /// same number.
    pub async fn stash(&self, registration: &PendingRegistration) -> Result<()> {
        info!(
            "Stashing pending registration for {}",
            registration.whatsapp_number
        );

        let payload = serde_json::to_string(registration)?;
        self.redis_pool
            .set(
                &registration_key(&registration.whatsapp_number),
                &payload,
                Some(REGISTRATION_TTL_SECONDS),
            )
            .await?;

        Ok(())
    }

    /// Fetch the pending registration for a number, if one is still alive.
    pub async fn get(&self, whatsapp_number: &str) -> Result<Option<PendingRegistration>> {
        let payload = self.redis_pool.get(&registration_key(whatsapp_number)).await?;

        match payload {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Drop the pending registration once it has been consumed.
    pub async fn remove(&self, whatsapp_number: &str) -> Result<()> {
        self.redis_pool
            .delete(&registration_key(whatsapp_number))
            .await?;
        Ok(())
    }
}

fn registration_key(whatsapp_number: &str) -> String {
    format!("pending-registration:{}", whatsapp_number)
}
