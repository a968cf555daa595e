//! Page-shaped JSON routes
//!
//! The frontend renders these documents; each carries the data its page
//! needs plus the `active_page` marker for the navigation.

use axum::{
    Extension, Json,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::payment::SUBSCRIPTION_PRICE;
use crate::session::{SESSION_COOKIE, SessionUser};
use crate::state::AppState;

/// Services offered by the shop.
pub const SERVICES: [&str; 5] = [
    "Men's Haircut",
    "Haircut + Wash",
    "Haircut + Creambath",
    "Beard Trim",
    "Full Package (Cut, Wash, Creambath, Beard)",
];

/// Landing page for guests
pub async fn welcome() -> impl IntoResponse {
    Json(json!({
        "message": "Welcome to SharpCuts. Log in or register to book an appointment.",
    }))
}

/// Booking page context: barbers and the service catalogue
pub async fn booking_page(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<impl IntoResponse> {
    let barbers = state.barber_repository.all().await.map_err(|e| {
        error!("Failed to list barbers: {}", e);
        AppError::Internal
    })?;

    Ok(Json(json!({
        "user": user,
        "barbers": barbers,
        "services": SERVICES,
        "active_page": "booking",
    })))
}

/// Post-booking confirmation page
pub async fn order_success(Extension(user): Extension<SessionUser>) -> impl IntoResponse {
    Json(json!({
        "user": user,
        "message": "Your order has been placed.",
    }))
}

/// Order history page
pub async fn history(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> AppResult<impl IntoResponse> {
    let orders = state
        .order_repository
        .history_for_customer(&user.whatsapp)
        .await
        .map_err(|e| {
            error!("Failed to fetch order history: {}", e);
            AppError::Internal
        })?;

    Ok(Json(json!({
        "user": user,
        "orders": orders,
        "active_page": "history",
    })))
}

/// Profile page. A session whose user has vanished from the store is
/// forcibly logged out.
pub async fn profile(
    State(state): State<AppState>,
    jar: CookieJar,
    Extension(session): Extension<SessionUser>,
) -> AppResult<Response> {
    let user = state
        .user_repository
        .find_by_whatsapp(&session.whatsapp)
        .await
        .map_err(|e| {
            error!("Failed to fetch profile: {}", e);
            AppError::Internal
        })?;

    let Some(user) = user else {
        if let Some(cookie) = jar.get(SESSION_COOKIE) {
            if let Ok(session_id) = Uuid::parse_str(cookie.value()) {
                if let Err(e) = state.sessions.delete_session(session_id).await {
                    error!("Failed to delete orphaned session: {}", e);
                }
            }
        }
        let mut removal = Cookie::from(SESSION_COOKIE);
        removal.set_path("/");
        return Ok((jar.remove(removal), Redirect::to("/welcome")).into_response());
    };

    Ok(Json(json!({ "user": user, "active_page": "profile" })).into_response())
}

/// About page
pub async fn about(Extension(user): Extension<SessionUser>) -> impl IntoResponse {
    Json(json!({
        "user": user,
        "active_page": "about",
    }))
}

/// AI Stylist chat page context
pub async fn ai_stylist(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> impl IntoResponse {
    Json(json!({
        "user": user,
        "active_page": "ai-stylist",
        "payment_client_key": state.payments.client_key(),
    }))
}

/// Subscription page context
pub async fn subscribe(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> impl IntoResponse {
    Json(json!({
        "user": user,
        "active_page": "ai-stylist",
        "payment_client_key": state.payments.client_key(),
        "price": SUBSCRIPTION_PRICE,
    }))
}
