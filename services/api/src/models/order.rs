//! Order model and the order-type catalogue

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

/// How the service is delivered, which decides the booking duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderType {
    InShop,
    HomeService,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::InShop => "in-shop",
            OrderType::HomeService => "home-service",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "in-shop" => Some(OrderType::InShop),
            "home-service" => Some(OrderType::HomeService),
            _ => None,
        }
    }

    /// Duration of a booking of this type, in minutes.
    pub fn duration_minutes(&self) -> i64 {
        match self {
            OrderType::InShop => 30,
            OrderType::HomeService => 45,
        }
    }
}

/// Order entity
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Order {
    pub id: i32,
    pub customer_name: String,
    pub customer_whatsapp: String,
    pub service_type: String,
    pub order_type: String,
    pub order_start_time: DateTime<Utc>,
    pub order_end_time: DateTime<Utc>,
    pub barber_id: i32,
    pub address: Option<String>,
}

/// Order joined with the assigned barber's name, for the history listing.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OrderHistoryEntry {
    pub id: i32,
    pub customer_name: String,
    pub customer_whatsapp: String,
    pub service_type: String,
    pub order_type: String,
    pub order_start_time: DateTime<Utc>,
    pub order_end_time: DateTime<Utc>,
    pub barber_id: i32,
    pub address: Option<String>,
    pub barber_name: String,
}

/// A validated booking request, ready for the conflict-checked insert.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_whatsapp: String,
    pub service_type: String,
    pub order_type: OrderType,
    pub order_start_time: DateTime<Utc>,
    pub order_end_time: DateTime<Utc>,
    pub barber_id: i32,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_type_round_trips_through_strings() {
        assert_eq!(OrderType::parse("in-shop"), Some(OrderType::InShop));
        assert_eq!(OrderType::parse("home-service"), Some(OrderType::HomeService));
        assert_eq!(OrderType::parse("walk-in"), None);
        assert_eq!(OrderType::InShop.as_str(), "in-shop");
        assert_eq!(OrderType::HomeService.as_str(), "home-service");
    }

    #[test]
    fn order_type_durations() {
        assert_eq!(OrderType::InShop.duration_minutes(), 30);
        assert_eq!(OrderType::HomeService.duration_minutes(), 45);
    }
}
