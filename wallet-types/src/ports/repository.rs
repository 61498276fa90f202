//! Repository port traits.
//!
//! This is the primary port in our hexagonal architecture.
//! Adapters (Postgres, SQLite) implement both traits.

use crate::domain::{Payment, PaymentId, UserId, Wallet, WalletId, WalletTransaction};
use crate::dto::Page;
use crate::error::RepoError;

/// One atomic unit of work against the wallet and payment stores.
///
/// Everything written through a unit of work becomes visible together on
/// `commit`. Dropping it without committing rolls every write back.
///
/// Locks are held until commit or drop. Settlement code locks the payment row
/// before the wallet row; the ledger only ever locks a single wallet.
#[async_trait::async_trait]
pub trait UnitOfWork: Send {
    /// Exclusively locks the user's wallet, creating an empty one if absent,
    /// and returns its balance as read under the lock.
    async fn lock_wallet(&mut self, user_id: UserId) -> Result<Wallet, RepoError>;

    /// Persists the balance of a wallet previously returned by `lock_wallet`.
    async fn save_wallet(&mut self, wallet: &Wallet) -> Result<(), RepoError>;

    /// Appends an entry to the transaction log.
    async fn append_transaction(&mut self, entry: &WalletTransaction) -> Result<(), RepoError>;

    /// Exclusively locks a payment row.
    async fn lock_payment(&mut self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Exclusively locks the payment carrying the given gateway reference.
    async fn lock_payment_by_external_id(
        &mut self,
        external_id: &str,
    ) -> Result<Option<Payment>, RepoError>;

    /// Persists the mutable fields of a locked payment.
    async fn save_payment(&mut self, payment: &Payment) -> Result<(), RepoError>;

    /// Commits every write made through this unit of work.
    async fn commit(self) -> Result<(), RepoError>;
}

/// The storage port for wallets, their ledger and payments.
#[async_trait::async_trait]
pub trait LedgerRepository: Send + Sync + 'static {
    type Tx: UnitOfWork;

    /// Starts a new unit of work.
    async fn begin(&self) -> Result<Self::Tx, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Wallet Store
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns the user's wallet, creating an empty one if absent.
    async fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet, RepoError>;

    /// Finds the user's wallet without creating it.
    async fn find_wallet(&self, user_id: UserId) -> Result<Option<Wallet>, RepoError>;

    /// Lists ledger entries for a wallet, newest first in commit order.
    async fn list_transactions(
        &self,
        wallet_id: WalletId,
        page: Page,
    ) -> Result<Vec<WalletTransaction>, RepoError>;

    // ─────────────────────────────────────────────────────────────────────────────
    // Payment Store
    // ─────────────────────────────────────────────────────────────────────────────

    /// Inserts a new payment.
    async fn insert_payment(&self, payment: &Payment) -> Result<(), RepoError>;

    /// Gets a payment by ID.
    async fn get_payment(&self, id: PaymentId) -> Result<Option<Payment>, RepoError>;

    /// Lists a user's payments, newest first.
    async fn list_payments(&self, user_id: UserId, page: Page) -> Result<Vec<Payment>, RepoError>;
}
