//! Slot-query and booking routes

use axum::{
    Extension, Form, Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::models::{NewOrder, OrderType};
use crate::repositories::BookingOutcome;
use crate::scheduling::{available_slots as compute_slots, booking_window};
use crate::session::SessionUser;
use crate::state::AppState;

/// Query for the available-slots listing
#[derive(Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
    pub barber_id: Option<i32>,
}

/// Request for a new booking
#[derive(Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub service_type: String,
    #[serde(default)]
    pub order_type: String,
    #[serde(default)]
    pub order_date: String,
    #[serde(default)]
    pub order_time: String,
    pub barber_id: Option<i32>,
    pub address: Option<String>,
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format (expected YYYY-MM-DD).".to_string()))
}

fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| AppError::Validation("Invalid time format (expected HH:MM).".to_string()))
}

/// List the free slot start times for a barber on a day
pub async fn available_slots(
    State(state): State<AppState>,
    Query(query): Query<SlotsQuery>,
) -> AppResult<impl IntoResponse> {
    let (Some(date), Some(barber_id)) = (query.date, query.barber_id) else {
        return Err(AppError::Validation(
            "Date and barber id are required.".to_string(),
        ));
    };
    let date = parse_date(&date)?;

    let booked = state
        .order_repository
        .booked_intervals(barber_id, date)
        .await
        .map_err(|e| {
            error!("Failed to fetch bookings: {}", e);
            AppError::Internal
        })?;

    Ok(Json(compute_slots(date, state.business_hours, &booked)))
}

/// Create a booking. The slot's availability is re-checked atomically right
/// before the insert, so a stale listing can never double-book a barber.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    Form(payload): Form<OrderForm>,
) -> AppResult<impl IntoResponse> {
    let Some(barber_id) = payload.barber_id else {
        return Err(AppError::Validation("All fields are required.".to_string()));
    };
    if payload.service_type.is_empty()
        || payload.order_type.is_empty()
        || payload.order_date.is_empty()
        || payload.order_time.is_empty()
    {
        return Err(AppError::Validation("All fields are required.".to_string()));
    }

    let order_type = OrderType::parse(&payload.order_type)
        .ok_or_else(|| AppError::Validation("Unknown order type.".to_string()))?;
    let date = parse_date(&payload.order_date)?;
    let time = parse_time(&payload.order_time)?;
    let (start, end) = booking_window(date, time, order_type);

    let new_order = NewOrder {
        customer_name: user.name.clone(),
        customer_whatsapp: user.whatsapp.clone(),
        service_type: payload.service_type,
        order_type,
        order_start_time: start,
        order_end_time: end,
        barber_id,
        address: payload.address.filter(|a| !a.is_empty()),
    };

    let outcome = state
        .order_repository
        .create_if_available(&new_order)
        .await
        .map_err(|e| {
            error!("Order creation failed: {}", e);
            AppError::Internal
        })?;

    let order = match outcome {
        BookingOutcome::Conflict => {
            return Err(AppError::Conflict(
                "Sorry, the selected time slot is no longer available. Please pick another time."
                    .to_string(),
            ));
        }
        BookingOutcome::Created(order) => order,
    };

    // Notify the barber; delivery problems never fail the booking.
    match state.barber_repository.find_by_id(barber_id).await {
        Ok(Some(barber)) => state.whatsapp.send_order_notification(&barber, &order).await,
        Ok(None) => error!("Order {} references unknown barber {}", order.id, barber_id),
        Err(e) => error!("Failed to load barber for notification: {}", e),
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Your order has been placed.", "order": order })),
    ))
}
