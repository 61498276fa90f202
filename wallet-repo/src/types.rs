//! Shared database row types for SQLite and PostgreSQL.
//!
//! Both backends bind `Uuid` and `DateTime<Utc>` natively (BLOB/TEXT on
//! SQLite, UUID/TIMESTAMPTZ on Postgres), so one set of rows serves both.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use wallet_types::{
    Amount, BookingId, Payment, PaymentId, PaymentMethod, PaymentStatus, RepoError,
    TransactionKind, UserId, Wallet, WalletId, WalletTransaction, WalletTransactionId,
};

// ─────────────────────────────────────────────────────────────────────────────
// Database row structs (derive FromRow for automatic mapping)
// ─────────────────────────────────────────────────────────────────────────────

/// Wallet row from database.
#[derive(FromRow)]
pub struct DbWallet {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Wallet transaction row from database.
#[derive(FromRow)]
pub struct DbWalletTransaction {
    pub id: Uuid,
    pub wallet_id: Uuid,
    pub kind: String,
    pub amount: i64,
    pub description: String,
    pub booking_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Payment row from database.
#[derive(FromRow)]
pub struct DbPayment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub booking_id: Option<Uuid>,
    pub amount: i64,
    pub method: String,
    pub status: String,
    pub external_id: Option<String>,
    pub redirect_url: Option<String>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Domain conversion
// ─────────────────────────────────────────────────────────────────────────────

fn corrupt(e: impl std::fmt::Display) -> RepoError {
    RepoError::Database(format!("corrupt row: {}", e))
}

impl DbWallet {
    /// Convert database row to domain Wallet.
    pub fn into_domain(self) -> Result<Wallet, RepoError> {
        Wallet::from_parts(
            WalletId::from_uuid(self.id),
            UserId::from_uuid(self.user_id),
            self.balance,
            self.created_at,
            self.updated_at,
        )
        .map_err(corrupt)
    }
}

impl DbWalletTransaction {
    /// Convert database row to domain WalletTransaction.
    pub fn into_domain(self) -> Result<WalletTransaction, RepoError> {
        let kind: TransactionKind = self.kind.parse().map_err(corrupt)?;
        let amount = Amount::new(self.amount).map_err(corrupt)?;

        Ok(WalletTransaction::from_parts(
            WalletTransactionId::from_uuid(self.id),
            WalletId::from_uuid(self.wallet_id),
            kind,
            amount,
            self.description,
            self.booking_id.map(BookingId::from_uuid),
            self.payment_id.map(PaymentId::from_uuid),
            self.created_at,
        ))
    }
}

impl DbPayment {
    /// Convert database row to domain Payment.
    pub fn into_domain(self) -> Result<Payment, RepoError> {
        let method: PaymentMethod = self.method.parse().map_err(corrupt)?;
        let status: PaymentStatus = self.status.parse().map_err(corrupt)?;
        let amount = Amount::new(self.amount).map_err(corrupt)?;

        Ok(Payment {
            id: PaymentId::from_uuid(self.id),
            user_id: UserId::from_uuid(self.user_id),
            booking_id: self.booking_id.map(BookingId::from_uuid),
            amount,
            method,
            status,
            external_id: self.external_id,
            redirect_url: self.redirect_url,
            error_message: self.error_message,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub fn db_err(e: sqlx::Error) -> RepoError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(db.message().to_string())
        }
        _ => RepoError::Database(e.to_string()),
    }
}

pub fn tx_err(e: sqlx::Error) -> RepoError {
    RepoError::Transaction(e.to_string())
}
