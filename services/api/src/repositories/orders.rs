//! Order repository: day queries and the conflict-checked booking insert

use anyhow::Result;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use sqlx::PgPool;
use tracing::info;

use crate::models::{NewOrder, Order, OrderHistoryEntry, SubscriptionStatus};
use crate::models::user::DEFAULT_CHAT_QUOTA;
use crate::scheduling::{day_range, intervals_overlap};

/// Result of the write-path availability re-check.
#[derive(Debug)]
pub enum BookingOutcome {
    Created(Order),
    Conflict,
}

/// Order repository
#[derive(Clone)]
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the `[start, end)` intervals booked for a barber on one day.
    pub async fn booked_intervals(
        &self,
        barber_id: i32,
        date: NaiveDate,
    ) -> Result<Vec<(DateTime<Utc>, DateTime<Utc>)>> {
        let (day_start, day_end) = day_range(date);

        let intervals = sqlx::query_as::<_, (DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT order_start_time, order_end_time
            FROM orders
            WHERE barber_id = $1
              AND order_start_time >= $2
              AND order_start_time < $3
            "#,
        )
        .bind(barber_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&self.pool)
        .await?;

        Ok(intervals)
    }

    /// Insert a booking if its window is still free.
    ///
    /// The availability re-check and the insert run in one transaction under
    /// an advisory lock keyed by (barber, day), so of two concurrent
    /// overlapping submissions exactly one commits; the other observes the
    /// first one's row and reports a conflict. On success the customer's AI
    /// chat quota is reset in the same transaction, unsubscribed users only.
    pub async fn create_if_available(&self, order: &NewOrder) -> Result<BookingOutcome> {
        let date = order.order_start_time.date_naive();
        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
            .bind(order.barber_id)
            .bind(date.num_days_from_ce())
            .execute(&mut *tx)
            .await?;

        let (day_start, day_end) = day_range(date);
        let existing = sqlx::query_as::<_, (DateTime<Utc>, DateTime<Utc>)>(
            r#"
            SELECT order_start_time, order_end_time
            FROM orders
            WHERE barber_id = $1
              AND order_start_time >= $2
              AND order_start_time < $3
            "#,
        )
        .bind(order.barber_id)
        .bind(day_start)
        .bind(day_end)
        .fetch_all(&mut *tx)
        .await?;

        let taken = existing.iter().any(|&(start, end)| {
            intervals_overlap(order.order_start_time, order.order_end_time, start, end)
        });

        if taken {
            tx.rollback().await?;
            return Ok(BookingOutcome::Conflict);
        }

        let created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (customer_name, customer_whatsapp, service_type, order_type,
                                order_start_time, order_end_time, barber_id, address)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, customer_name, customer_whatsapp, service_type, order_type,
                      order_start_time, order_end_time, barber_id, address
            "#,
        )
        .bind(&order.customer_name)
        .bind(&order.customer_whatsapp)
        .bind(&order.service_type)
        .bind(order.order_type.as_str())
        .bind(order.order_start_time)
        .bind(order.order_end_time)
        .bind(order.barber_id)
        .bind(&order.address)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE users SET ai_chat_quota = $1
            WHERE whatsapp_number = $2 AND ai_subscription_status = $3
            "#,
        )
        .bind(DEFAULT_CHAT_QUOTA)
        .bind(&order.customer_whatsapp)
        .bind(SubscriptionStatus::Inactive.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Order {} created for barber {} at {}",
            created.id, created.barber_id, created.order_start_time
        );
        Ok(BookingOutcome::Created(created))
    }

    /// A customer's orders, newest first, with the barber's name joined in.
    pub async fn history_for_customer(&self, whatsapp: &str) -> Result<Vec<OrderHistoryEntry>> {
        let orders = sqlx::query_as::<_, OrderHistoryEntry>(
            r#"
            SELECT o.id, o.customer_name, o.customer_whatsapp, o.service_type, o.order_type,
                   o.order_start_time, o.order_end_time, o.barber_id, o.address,
                   b.name AS barber_name
            FROM orders o
            JOIN barbers b ON o.barber_id = b.id
            WHERE o.customer_whatsapp = $1
            ORDER BY o.order_start_time DESC
            "#,
        )
        .bind(whatsapp)
        .fetch_all(&self.pool)
        .await?;

        Ok(orders)
    }
}
