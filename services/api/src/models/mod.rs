//! Booking service models

pub mod barber;
pub mod order;
pub mod otp;
pub mod transaction;
pub mod user;

// Re-export for convenience
pub use barber::Barber;
pub use order::{NewOrder, Order, OrderHistoryEntry, OrderType};
pub use otp::{OtpOutcome, OtpRequest};
pub use transaction::{PaymentTransaction, TransactionStatus};
pub use user::{NewUser, SubscriptionStatus, User};
