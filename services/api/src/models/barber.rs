//! Barber model

use serde::Serialize;
use sqlx::FromRow;

/// Barber entity. Immutable reference data seeded at startup.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Barber {
    pub id: i32,
    pub name: String,
    pub whatsapp_number: String,
}
