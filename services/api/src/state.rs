//! Application state shared across handlers

use sqlx::PgPool;

use common::cache::RedisPool;

use crate::ai::AiClient;
use crate::payment::PaymentClient;
use crate::repositories::{
    BarberRepository, OrderRepository, OtpRepository, TransactionRepository, UserRepository,
};
use crate::scheduling::BusinessHours;
use crate::session::{RegistrationStore, SessionManager};
use crate::whatsapp::WhatsAppClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub redis_pool: RedisPool,
    pub sessions: SessionManager,
    pub registrations: RegistrationStore,
    pub barber_repository: BarberRepository,
    pub order_repository: OrderRepository,
    pub otp_repository: OtpRepository,
    pub transaction_repository: TransactionRepository,
    pub user_repository: UserRepository,
    pub whatsapp: WhatsAppClient,
    pub payments: PaymentClient,
    pub ai: AiClient,
    pub business_hours: BusinessHours,
}
