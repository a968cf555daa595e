//! Repositories for database operations

pub mod barbers;
pub mod orders;
pub mod otps;
pub mod transactions;
pub mod users;

// Re-export for convenience
pub use barbers::BarberRepository;
pub use orders::{BookingOutcome, OrderRepository};
pub use otps::OtpRepository;
pub use transactions::TransactionRepository;
pub use users::UserRepository;
