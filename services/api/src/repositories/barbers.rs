//! Barber repository for database operations

use anyhow::Result;
use sqlx::PgPool;

use crate::models::Barber;

/// Barber repository
#[derive(Clone)]
pub struct BarberRepository {
    pool: PgPool,
}

impl BarberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List every barber, in id order.
    pub async fn all(&self) -> Result<Vec<Barber>> {
        let barbers = sqlx::query_as::<_, Barber>(
            "SELECT id, name, whatsapp_number FROM barbers ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(barbers)
    }

    /// Find a barber by id.
    pub async fn find_by_id(&self, id: i32) -> Result<Option<Barber>> {
        let barber = sqlx::query_as::<_, Barber>(
            "SELECT id, name, whatsapp_number FROM barbers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(barber)
    }
}
