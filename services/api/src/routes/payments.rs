//! Subscription purchase and payment-webhook routes

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::{Months, Utc};
use serde_json::json;
use tracing::{error, info};

use crate::error::{AppError, AppResult};
use crate::payment::{NotificationAction, PaymentNotification, SUBSCRIPTION_PRICE};
use crate::session::SessionUser;
use crate::state::AppState;

/// Create a hosted-checkout transaction for one month of AI subscription
pub async fn create_subscription(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<impl IntoResponse> {
    let created = state
        .payments
        .create_subscription_transaction(&user, Utc::now())
        .await
        .map_err(|e| {
            error!("Gateway transaction creation failed: {}", e);
            AppError::Upstream(
                "Failed to create the payment transaction. Try again shortly.".to_string(),
            )
        })?;

    state
        .transaction_repository
        .insert_pending(
            &created.order_id,
            &user.whatsapp,
            SUBSCRIPTION_PRICE,
            &created.token,
        )
        .await
        .map_err(|e| {
            error!("Failed to record transaction: {}", e);
            AppError::Internal
        })?;

    Ok(Json(json!({ "token": created.token })))
}

/// Payment gateway webhook. May be delivered more than once per
/// transaction; only the first settlement activates the subscription.
pub async fn notification(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> AppResult<impl IntoResponse> {
    let notification = PaymentNotification::parse(&payload)
        .map_err(|_| AppError::Validation("Malformed notification payload.".to_string()))?;

    info!(
        "Payment notification received: order {} status {}",
        notification.order_id, notification.transaction_status
    );

    let transaction = state
        .transaction_repository
        .find(&notification.order_id)
        .await
        .map_err(|e| {
            error!("Transaction lookup failed: {}", e);
            AppError::Internal
        })?
        .ok_or_else(|| {
            AppError::NotFound(format!("Transaction {} not found.", notification.order_id))
        })?;

    match notification.action() {
        NotificationAction::Settle => {
            let first_transition = state
                .transaction_repository
                .mark_success_if_pending(&notification.order_id)
                .await
                .map_err(|e| {
                    error!("Failed to mark transaction successful: {}", e);
                    AppError::Internal
                })?;

            if first_transition {
                let expires_at = Utc::now() + Months::new(1);
                state
                    .user_repository
                    .activate_subscription(&transaction.user_whatsapp, expires_at)
                    .await
                    .map_err(|e| {
                        error!("Failed to activate subscription: {}", e);
                        AppError::Internal
                    })?;
            } else {
                info!(
                    "Notification for {} replayed, subscription unchanged",
                    notification.order_id
                );
            }
        }
        NotificationAction::Fail => {
            state
                .transaction_repository
                .mark_failed(&notification.order_id)
                .await
                .map_err(|e| {
                    error!("Failed to mark transaction failed: {}", e);
                    AppError::Internal
                })?;
        }
        NotificationAction::Ignore => {
            info!(
                "Ignoring notification for {} with status {}",
                notification.order_id, notification.transaction_status
            );
        }
    }

    Ok("OK")
}
