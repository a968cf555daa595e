//! Schema bootstrap
//!
//! Creates the tables and indexes at startup and seeds the barber reference
//! data. Every statement is idempotent, so restarting against an existing
//! database is a no-op.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

pub async fn initialize(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS barbers (
            id SERIAL PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            whatsapp_number VARCHAR(20) NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS orders (
            id SERIAL PRIMARY KEY,
            customer_name VARCHAR(255) NOT NULL,
            customer_whatsapp VARCHAR(20) NOT NULL,
            service_type VARCHAR(255) NOT NULL,
            order_type VARCHAR(50) NOT NULL,
            order_start_time TIMESTAMPTZ NOT NULL,
            order_end_time TIMESTAMPTZ NOT NULL,
            barber_id INTEGER NOT NULL REFERENCES barbers (id),
            address TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            username VARCHAR(255) PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            password_hash TEXT NOT NULL,
            whatsapp_number VARCHAR(20) NOT NULL UNIQUE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP,
            ai_chat_quota INTEGER NOT NULL DEFAULT 5,
            ai_subscription_status VARCHAR(20) NOT NULL DEFAULT 'inactive',
            ai_subscription_expires_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS otp_requests (
            whatsapp_number VARCHAR(20) PRIMARY KEY,
            otp_code VARCHAR(10) NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS payment_transactions (
            order_id VARCHAR(255) PRIMARY KEY,
            user_whatsapp VARCHAR(20) NOT NULL,
            amount BIGINT NOT NULL,
            status VARCHAR(50) NOT NULL,
            transaction_token TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_orders_barber_start ON orders (barber_id, order_start_time)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_orders_customer ON orders (customer_whatsapp)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_payment_transactions_status ON payment_transactions (status)",
    )
    .execute(pool)
    .await?;

    // Seed reference barbers
    sqlx::query(
        r#"
        INSERT INTO barbers (id, name, whatsapp_number)
        VALUES (1, 'Agus', '6281234567890'), (2, 'Budi', '6281234567891')
        ON CONFLICT (id) DO NOTHING
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized");
    Ok(())
}
