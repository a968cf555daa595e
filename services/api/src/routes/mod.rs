//! Booking service routes

pub mod auth;
pub mod booking;
pub mod chat;
pub mod pages;
pub mod payments;

use axum::{
    Json, Router, middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use crate::middleware::{guest_middleware, session_middleware};
use crate::state::AppState;

/// Create the router for the booking service
pub fn create_router(state: AppState) -> Router {
    let guest_routes = Router::new()
        .route("/welcome", get(pages::welcome))
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/register/verify", post(auth::verify_registration))
        .route("/resend-otp", post(auth::resend_otp))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guest_middleware,
        ));

    let session_routes = Router::new()
        .route("/", get(pages::booking_page))
        .route("/order", post(booking::create_order))
        .route("/success", get(pages::order_success))
        .route("/history", get(pages::history))
        .route("/profile", get(pages::profile))
        .route("/about", get(pages::about))
        .route("/ai-stylist", get(pages::ai_stylist))
        .route("/subscribe", get(pages::subscribe))
        .route("/api/available-slots", get(booking::available_slots))
        .route("/api/chat", post(chat::chat))
        .route("/api/user-info", get(chat::user_info))
        .route("/api/subscribe", post(payments::create_subscription))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            session_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/logout", get(auth::logout))
        .route("/api/payment-notification", post(payments::notification))
        .merge(guest_routes)
        .merge(session_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "booking-api"
    }))
}
