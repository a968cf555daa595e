//! AI Stylist chat routes

use axum::{
    Extension, Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, warn};

use crate::ai::ImageAttachment;
use crate::error::{AppError, AppResult};
use crate::session::SessionUser;
use crate::state::AppState;

/// Fields accepted by the chat endpoint.
struct ChatInput {
    message: Option<String>,
    image: Option<ImageAttachment>,
}

async fn read_chat_input(mut multipart: Multipart) -> Result<ChatInput, AppError> {
    let mut message = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::Validation("Malformed upload.".to_string()))?
    {
        match field.name() {
            Some("message") => {
                let text = field
                    .text()
                    .await
                    .map_err(|_| AppError::Validation("Malformed upload.".to_string()))?;
                if !text.is_empty() {
                    message = Some(text);
                }
            }
            Some("face_image") => {
                let mime_type = field
                    .content_type()
                    .unwrap_or("image/jpeg")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::Validation("Malformed upload.".to_string()))?;
                if !data.is_empty() {
                    image = Some(ImageAttachment {
                        mime_type,
                        data: data.to_vec(),
                    });
                }
            }
            _ => {}
        }
    }

    Ok(ChatInput { message, image })
}

/// Chat with the AI Stylist. Free-tier users spend one quota unit per call;
/// subscribed users chat without limits until their subscription expires.
pub async fn chat(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let input = read_chat_input(multipart).await?;
    if input.message.is_none() && input.image.is_none() {
        return Err(AppError::Validation(
            "No message or image was sent.".to_string(),
        ));
    }

    let user = state
        .user_repository
        .find_by_whatsapp(&session.whatsapp)
        .await
        .map_err(|e| {
            error!("User lookup failed: {}", e);
            AppError::Internal
        })?
        .ok_or_else(|| {
            AppError::NotFound("User data not found. Please log in again.".to_string())
        })?;

    let subscribed = user.is_subscribed(Utc::now());
    if !subscribed && user.ai_chat_quota <= 0 {
        return Err(AppError::QuotaExceeded);
    }

    let reply = state
        .ai
        .respond(input.message.as_deref(), input.image.as_ref(), subscribed)
        .await
        .map_err(|e| {
            error!("AI request failed: {}", e);
            AppError::Upstream(
                "Sorry, the AI Stylist is busy right now. Try again in a moment.".to_string(),
            )
        })?;

    if !subscribed {
        let spent = state
            .user_repository
            .decrement_quota(&user.whatsapp_number)
            .await
            .map_err(|e| {
                error!("Quota decrement failed: {}", e);
                AppError::Internal
            })?;
        if !spent {
            warn!("Quota for {} was already exhausted", user.whatsapp_number);
        }
    }

    Ok(Json(json!({ "reply": reply })))
}

/// Current user's profile data including quota and subscription state
pub async fn user_info(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
) -> AppResult<impl IntoResponse> {
    let user = state
        .user_repository
        .find_by_whatsapp(&session.whatsapp)
        .await
        .map_err(|e| {
            error!("User lookup failed: {}", e);
            AppError::Internal
        })?
        .ok_or_else(|| AppError::NotFound("User not found.".to_string()))?;

    Ok(Json(json!({
        "name": user.name,
        "username": user.username,
        "whatsapp_number": user.whatsapp_number,
        "ai_chat_quota": user.ai_chat_quota,
        "ai_subscription_status": user.ai_subscription_status,
        "ai_subscription_expires_at": user.ai_subscription_expires_at,
    })))
}
