//! Authentication and registration routes
//!
//! Registration is a two-step flow: the submitted account data is held in a
//! short-lived pending record while a one-time code is delivered over
//! WhatsApp, and the user row is only written once the code verifies.

use axum::{
    Form, Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{NewUser, OtpOutcome, otp};
use crate::repositories::UserRepository;
use crate::session::{PendingRegistration, SESSION_COOKIE, SessionUser};
use crate::state::AppState;
use crate::validation::{
    normalize_whatsapp_number, validate_password, validate_username, validate_whatsapp_number,
};

/// Request for user login
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub password: String,
}

/// Request for user registration
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_whatsapp: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

/// Request for OTP verification of a registration
#[derive(Deserialize)]
pub struct VerifyForm {
    #[serde(default)]
    pub customer_whatsapp: String,
    #[serde(default)]
    pub otp: String,
}

/// Request to resend an OTP
#[derive(Deserialize)]
pub struct ResendOtpForm {
    #[serde(default)]
    pub whatsapp_number: String,
}

/// Request to start a password reset
#[derive(Deserialize)]
pub struct ForgotPasswordForm {
    #[serde(default)]
    pub customer_whatsapp: String,
}

/// Request to finish a password reset
#[derive(Deserialize)]
pub struct ResetPasswordForm {
    #[serde(default)]
    pub whatsapp_number: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

fn session_cookie(session_id: Uuid) -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, session_id.to_string());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie
}

async fn log_in(
    state: &AppState,
    jar: CookieJar,
    user: SessionUser,
) -> Result<CookieJar, AppError> {
    let session_id = state.sessions.create_session(&user).await.map_err(|e| {
        error!("Failed to create session: {}", e);
        AppError::Internal
    })?;

    Ok(jar.add(session_cookie(session_id)))
}

/// Issue a fresh OTP for a number and deliver it over WhatsApp.
async fn issue_otp(state: &AppState, whatsapp_number: &str) -> Result<(), AppError> {
    let code = otp::generate_code();
    let expires_at = otp::expiry_from(Utc::now());

    state
        .otp_repository
        .upsert(whatsapp_number, &code, expires_at)
        .await
        .map_err(|e| {
            error!("Failed to store OTP: {}", e);
            AppError::Internal
        })?;

    state
        .whatsapp
        .send_otp_message(whatsapp_number, &code)
        .await
        .map_err(|e| {
            error!("Failed to send OTP to {}: {}", whatsapp_number, e);
            AppError::Upstream("Failed to send the verification code. Try again shortly.".to_string())
        })?;

    Ok(())
}

/// User login endpoint
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<LoginForm>,
) -> AppResult<impl IntoResponse> {
    if payload.identifier.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Username/WhatsApp number and password are required.".to_string(),
        ));
    }

    let identifier = payload.identifier.trim();
    info!("Login attempt for {}", identifier);

    let user = state
        .user_repository
        .find_by_identifier(identifier)
        .await
        .map_err(|e| {
            error!("Login lookup failed: {}", e);
            AppError::Internal
        })?
        .ok_or_else(|| AppError::AuthFailed("Invalid credential combination.".to_string()))?;

    let matches = UserRepository::verify_password(&user, &payload.password).map_err(|e| {
        error!("Password verification failed: {}", e);
        AppError::Internal
    })?;

    if !matches {
        return Err(AppError::AuthFailed(
            "Invalid credential combination.".to_string(),
        ));
    }

    let session_user = SessionUser {
        username: user.username,
        name: user.name,
        whatsapp: user.whatsapp_number,
    };
    let jar = log_in(&state, jar, session_user.clone()).await?;

    Ok((jar, Json(json!({ "message": "Logged in.", "user": session_user }))))
}

/// Registration endpoint: validates the form, stashes a pending
/// registration, and sends the OTP
pub async fn register(
    State(state): State<AppState>,
    Form(payload): Form<RegisterForm>,
) -> AppResult<impl IntoResponse> {
    if payload.username.is_empty()
        || payload.customer_name.is_empty()
        || payload.customer_whatsapp.is_empty()
        || payload.password.is_empty()
        || payload.confirm_password.is_empty()
    {
        return Err(AppError::Validation("All fields are required.".to_string()));
    }

    validate_password(&payload.password, &payload.confirm_password).map_err(AppError::Validation)?;

    let username = payload.username.trim().to_string();
    validate_username(&username).map_err(AppError::Validation)?;

    let whatsapp_number = normalize_whatsapp_number(&payload.customer_whatsapp);
    validate_whatsapp_number(&whatsapp_number).map_err(AppError::Validation)?;

    let existing = state
        .user_repository
        .find_by_identifier(&username)
        .await
        .map_err(|e| {
            error!("Registration lookup failed: {}", e);
            AppError::Internal
        })?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "This username is already taken. Please pick another.".to_string(),
        ));
    }

    let existing = state
        .user_repository
        .find_by_whatsapp(&whatsapp_number)
        .await
        .map_err(|e| {
            error!("Registration lookup failed: {}", e);
            AppError::Internal
        })?;
    if existing.is_some() {
        return Err(AppError::Conflict(
            "This WhatsApp number is already registered. Log in or use the password reset."
                .to_string(),
        ));
    }

    let password_hash = UserRepository::hash_password(&payload.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AppError::Internal
    })?;

    let registration = PendingRegistration {
        username,
        name: payload.customer_name.trim().to_string(),
        password_hash,
        whatsapp_number: whatsapp_number.clone(),
    };
    state.registrations.stash(&registration).await.map_err(|e| {
        error!("Failed to stash pending registration: {}", e);
        AppError::Internal
    })?;

    issue_otp(&state, &whatsapp_number).await?;

    Ok(Json(json!({
        "message": "A verification code has been sent to your WhatsApp number.",
        "whatsapp_number": whatsapp_number,
    })))
}

/// OTP verification endpoint: creates the user and logs them in
pub async fn verify_registration(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(payload): Form<VerifyForm>,
) -> AppResult<impl IntoResponse> {
    let whatsapp_number = payload.customer_whatsapp.trim();

    let request = state
        .otp_repository
        .find(whatsapp_number)
        .await
        .map_err(|e| {
            error!("OTP lookup failed: {}", e);
            AppError::Internal
        })?
        .ok_or_else(|| AppError::Validation("Verification failed. Try again.".to_string()))?;

    match request.verify(&payload.otp, Utc::now()) {
        OtpOutcome::Expired => {
            return Err(AppError::Validation(
                "The verification code has expired.".to_string(),
            ));
        }
        OtpOutcome::Mismatch => {
            return Err(AppError::Validation(
                "The verification code is incorrect.".to_string(),
            ));
        }
        OtpOutcome::Valid => {}
    }

    let pending = state
        .registrations
        .get(whatsapp_number)
        .await
        .map_err(|e| {
            error!("Pending registration lookup failed: {}", e);
            AppError::Internal
        })?;

    let Some(registration) = pending else {
        // The code was valid but there is nothing to finish; burn it.
        let _ = state.otp_repository.delete(whatsapp_number).await;
        return Err(AppError::Validation(
            "Registration session not found. Please register again.".to_string(),
        ));
    };

    let new_user = NewUser {
        username: registration.username,
        name: registration.name,
        password_hash: registration.password_hash,
        whatsapp_number: registration.whatsapp_number,
    };
    let user = state.user_repository.create(&new_user).await.map_err(|e| {
        error!("Failed to create user: {}", e);
        AppError::Internal
    })?;

    state
        .registrations
        .remove(whatsapp_number)
        .await
        .map_err(|e| {
            error!("Failed to drop pending registration: {}", e);
            AppError::Internal
        })?;
    state.otp_repository.delete(whatsapp_number).await.map_err(|e| {
        error!("Failed to delete OTP: {}", e);
        AppError::Internal
    })?;

    info!("User {} registered and verified", user.username);

    let session_user = SessionUser {
        username: user.username,
        name: user.name,
        whatsapp: user.whatsapp_number,
    };
    let jar = log_in(&state, jar, session_user.clone()).await?;

    Ok((jar, Json(json!({ "message": "Registration complete.", "user": session_user }))))
}

/// Resend OTP endpoint
pub async fn resend_otp(
    State(state): State<AppState>,
    Form(payload): Form<ResendOtpForm>,
) -> AppResult<impl IntoResponse> {
    if payload.whatsapp_number.is_empty() {
        return Err(AppError::Validation(
            "A WhatsApp number is required.".to_string(),
        ));
    }

    issue_otp(&state, payload.whatsapp_number.trim()).await?;

    Ok(Json(json!({
        "success": true,
        "message": "A new verification code has been sent.",
    })))
}

/// Logout endpoint
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        if let Ok(session_id) = Uuid::parse_str(cookie.value()) {
            if let Err(e) = state.sessions.delete_session(session_id).await {
                error!("Failed to delete session: {}", e);
            }
        }
    }

    let mut removal = Cookie::from(SESSION_COOKIE);
    removal.set_path("/");
    (jar.remove(removal), Redirect::to("/welcome"))
}

/// Start a password reset by sending an OTP to a registered number
pub async fn forgot_password(
    State(state): State<AppState>,
    Form(payload): Form<ForgotPasswordForm>,
) -> AppResult<impl IntoResponse> {
    let whatsapp_number = normalize_whatsapp_number(&payload.customer_whatsapp);
    validate_whatsapp_number(&whatsapp_number).map_err(AppError::Validation)?;

    let user = state
        .user_repository
        .find_by_whatsapp(&whatsapp_number)
        .await
        .map_err(|e| {
            error!("Password reset lookup failed: {}", e);
            AppError::Internal
        })?;
    if user.is_none() {
        return Err(AppError::Validation(
            "This WhatsApp number is not registered.".to_string(),
        ));
    }

    issue_otp(&state, &whatsapp_number).await?;

    Ok(Json(json!({
        "message": "A verification code has been sent to your WhatsApp number.",
        "whatsapp_number": whatsapp_number,
    })))
}

/// Finish a password reset with a verified OTP
pub async fn reset_password(
    State(state): State<AppState>,
    Form(payload): Form<ResetPasswordForm>,
) -> AppResult<impl IntoResponse> {
    if payload.otp.is_empty() || payload.password.is_empty() || payload.confirm_password.is_empty()
    {
        return Err(AppError::Validation("All fields are required.".to_string()));
    }
    validate_password(&payload.password, &payload.confirm_password).map_err(AppError::Validation)?;

    let whatsapp_number = payload.whatsapp_number.trim();

    let request = state
        .otp_repository
        .find(whatsapp_number)
        .await
        .map_err(|e| {
            error!("OTP lookup failed: {}", e);
            AppError::Internal
        })?
        .ok_or_else(|| AppError::Validation("Verification failed. Try again.".to_string()))?;

    match request.verify(&payload.otp, Utc::now()) {
        OtpOutcome::Expired => {
            return Err(AppError::Validation(
                "The verification code has expired.".to_string(),
            ));
        }
        OtpOutcome::Mismatch => {
            return Err(AppError::Validation(
                "The verification code is incorrect.".to_string(),
            ));
        }
        OtpOutcome::Valid => {}
    }

    let password_hash = UserRepository::hash_password(&payload.password).map_err(|e| {
        error!("Failed to hash password: {}", e);
        AppError::Internal
    })?;
    state
        .user_repository
        .update_password(whatsapp_number, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to update password: {}", e);
            AppError::Internal
        })?;
    state.otp_repository.delete(whatsapp_number).await.map_err(|e| {
        error!("Failed to delete OTP: {}", e);
        AppError::Internal
    })?;

    info!("Password updated for {}", whatsapp_number);

    Ok(Json(json!({
        "message": "Password updated. Please log in again.",
    })))
}
