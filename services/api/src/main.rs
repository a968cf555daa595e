use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

mod ai;
mod error;
mod middleware;
mod models;
mod payment;
mod repositories;
mod routes;
mod scheduling;
mod schema;
mod session;
mod state;
mod validation;
mod whatsapp;

use common::cache::{RedisConfig, RedisPool};
use common::database::{DatabaseConfig, init_pool};

use crate::ai::{AiClient, AiConfig};
use crate::payment::{PaymentClient, PaymentConfig};
use crate::repositories::{
    BarberRepository, OrderRepository, OtpRepository, TransactionRepository, UserRepository,
};
use crate::scheduling::BusinessHours;
use crate::session::{RegistrationStore, SessionManager};
use crate::state::AppState;
use crate::whatsapp::{WhatsAppClient, WhatsAppConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_max_level(Level::INFO)
        .init();

    info!("Starting booking service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    schema::initialize(&pool).await?;

    // Initialize Redis connection pool
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    // Initialize the WhatsApp gateway client and its connection monitor
    let whatsapp = WhatsAppClient::new(WhatsAppConfig::from_env()?);
    whatsapp.spawn_connection_monitor();

    let payments = PaymentClient::new(PaymentConfig::from_env()?);
    let ai = AiClient::new(AiConfig::from_env()?);
    let business_hours = BusinessHours::from_env()?;

    let app_state = AppState {
        db_pool: pool.clone(),
        redis_pool: redis_pool.clone(),
        sessions: SessionManager::new(redis_pool.clone()),
        registrations: RegistrationStore::new(redis_pool),
        barber_repository: BarberRepository::new(pool.clone()),
        order_repository: OrderRepository::new(pool.clone()),
        otp_repository: OtpRepository::new(pool.clone()),
        transaction_repository: TransactionRepository::new(pool.clone()),
        user_repository: UserRepository::new(pool),
        whatsapp,
        payments,
        ai,
        business_hours,
    };

    info!("Booking service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Booking service listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
