//! Domain models for the wallet ledger and payment settlement.

pub mod amount;
pub mod ids;
pub mod payment;
pub mod transaction;
pub mod wallet;

pub use amount::Amount;
pub use ids::{BookingId, PaymentId, UserId, WalletId, WalletTransactionId};
pub use payment::{Payment, PaymentMethod, PaymentStatus};
pub use transaction::{Direction, Posting, TransactionKind, WalletTransaction};
pub use wallet::Wallet;
