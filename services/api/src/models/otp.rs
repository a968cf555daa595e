//! One-time verification codes sent over WhatsApp

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use sqlx::FromRow;

/// Lifetime of a code from the moment it is issued.
pub const OTP_LIFETIME_MINUTES: i64 = 5;

/// Stored OTP request, at most one per WhatsApp number (a newer request
/// supersedes the previous code).
#[derive(Debug, Clone, FromRow)]
pub struct OtpRequest {
    pub whatsapp_number: String,
    pub otp_code: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Result of checking a submitted code against a stored request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpOutcome {
    Valid,
    Expired,
    Mismatch,
}

impl OtpRequest {
    /// A code is valid only when it matches and the current time is before
    /// the expiry. Expiry is reported even for a wrong code, so a stale
    /// request never reads as merely mistyped.
    pub fn verify(&self, code: &str, now: DateTime<Utc>) -> OtpOutcome {
        if now > self.expires_at {
            OtpOutcome::Expired
        } else if self.otp_code != code {
            OtpOutcome::Mismatch
        } else {
            OtpOutcome::Valid
        }
    }
}

/// Generate a fresh six-digit code.
pub fn generate_code() -> String {
    let code: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    code.to_string()
}

/// Expiry timestamp for a code issued now.
pub fn expiry_from(now: DateTime<Utc>) -> DateTime<Utc> {
    now + Duration::minutes(OTP_LIFETIME_MINUTES)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(code: &str, now: DateTime<Utc>, ttl_minutes: i64) -> OtpRequest {
        OtpRequest {
            whatsapp_number: "628123456789".to_string(),
            otp_code: code.to_string(),
            expires_at: now + Duration::minutes(ttl_minutes),
            created_at: now,
        }
    }

    #[test]
    fn matching_code_before_expiry_is_valid() {
        let now = Utc::now();
        let req = request("123456", now, 5);
        assert_eq!(req.verify("123456", now), OtpOutcome::Valid);
    }

    #[test]
    fn wrong_code_is_a_mismatch() {
        let now = Utc::now();
        let req = request("123456", now, 5);
        assert_eq!(req.verify("654321", now), OtpOutcome::Mismatch);
    }

    #[test]
    fn expired_code_is_expired_even_when_matching() {
        let now = Utc::now();
        let req = request("123456", now, 5);
        let later = now + Duration::minutes(6);
        assert_eq!(req.verify("123456", later), OtpOutcome::Expired);
        assert_eq!(req.verify("654321", later), OtpOutcome::Expired);
    }

    #[test]
    fn generated_codes_are_six_digits() {
        for _ in 0..32 {
            let code = generate_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn expiry_is_five_minutes_out() {
        let now = Utc::now();
        assert_eq!(expiry_from(now) - now, Duration::minutes(5));
    }
}
