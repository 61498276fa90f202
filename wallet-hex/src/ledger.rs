//! Wallet Ledger Service
//!
//! Owns every balance change. Each mutation locks the wallet row, validates
//! against the balance read under that lock, writes the new balance and
//! appends exactly one ledger entry, all inside one unit of work.

use std::sync::Arc;

use wallet_types::{
    Amount, AppError, BookingId, Direction, LedgerRepository, Page, Posting, UnitOfWork, UserId,
    Wallet, WalletTransaction,
};

/// Applies a posting to the user's wallet inside an open unit of work.
///
/// The caller commits. Settlement uses this to post ledger entries in the
/// same unit of work as the payment status change.
pub(crate) async fn post_entry<U: UnitOfWork>(
    uow: &mut U,
    user_id: UserId,
    posting: Posting,
) -> Result<WalletTransaction, AppError> {
    let mut wallet = uow.lock_wallet(user_id).await?;

    let applied = match posting.kind.direction() {
        Direction::Credit => wallet.credit(posting.amount),
        Direction::Debit => wallet.debit(posting.amount),
    };
    if let Err(e) = applied {
        tracing::warn!(
            user_id = %user_id,
            kind = %posting.kind,
            amount = posting.amount.value(),
            error = %e,
            "ledger posting rejected"
        );
        return Err(e.into());
    }

    uow.save_wallet(&wallet).await?;

    let entry = WalletTransaction::record(wallet.id, posting);
    uow.append_transaction(&entry).await?;

    Ok(entry)
}

/// Application service for wallet balances and history.
///
/// Generic over `R: LedgerRepository` - the adapter is injected at compile time.
pub struct WalletService<R: LedgerRepository> {
    repo: Arc<R>,
}

impl<R: LedgerRepository> Clone for WalletService<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: LedgerRepository> WalletService<R> {
    /// Creates a new wallet service over a shared repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────────

    /// Returns the user's wallet, creating an empty one on first use.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_or_create_wallet(&self, user_id: UserId) -> Result<Wallet, AppError> {
        Ok(self.repo.get_or_create_wallet(user_id).await?)
    }

    /// Current balance; 0 for a user who never had a wallet.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_balance(&self, user_id: UserId) -> Result<i64, AppError> {
        let wallet = self.repo.find_wallet(user_id).await?;
        Ok(wallet.map_or(0, |w| w.balance))
    }

    /// Ledger history, newest first.
    #[tracing::instrument(skip(self), fields(user_id = %user_id))]
    pub async fn list_transactions(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Vec<WalletTransaction>, AppError> {
        match self.repo.find_wallet(user_id).await? {
            Some(wallet) => Ok(self.repo.list_transactions(wallet.id, page).await?),
            None => Ok(Vec::new()),
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────────

    /// Adds money to the wallet, creating it if needed.
    #[tracing::instrument(skip(self, description), fields(user_id = %user_id))]
    pub async fn deposit(
        &self,
        user_id: UserId,
        amount: i64,
        description: String,
    ) -> Result<WalletTransaction, AppError> {
        let amount = Amount::new(amount)?;
        self.post(user_id, Posting::deposit(amount, description))
            .await
    }

    /// Takes money out of the wallet.
    #[tracing::instrument(skip(self, description), fields(user_id = %user_id))]
    pub async fn withdraw(
        &self,
        user_id: UserId,
        amount: i64,
        description: String,
    ) -> Result<WalletTransaction, AppError> {
        let amount = Amount::new(amount)?;
        self.post(user_id, Posting::withdraw(amount, description))
            .await
    }

    /// Charges the wallet for a booking.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, booking_id = %booking_id))]
    pub async fn charge_for_booking(
        &self,
        user_id: UserId,
        amount: i64,
        booking_id: BookingId,
    ) -> Result<WalletTransaction, AppError> {
        let amount = Amount::new(amount)?;
        self.post(user_id, Posting::booking_charge(amount, booking_id))
            .await
    }

    /// Credits the wallet back for a cancelled booking.
    #[tracing::instrument(skip(self, reason), fields(user_id = %user_id, booking_id = %booking_id))]
    pub async fn refund_booking(
        &self,
        user_id: UserId,
        amount: i64,
        booking_id: BookingId,
        reason: String,
    ) -> Result<WalletTransaction, AppError> {
        let amount = Amount::new(amount)?;
        self.post(user_id, Posting::refund(amount, Some(booking_id), reason))
            .await
    }

    async fn post(&self, user_id: UserId, posting: Posting) -> Result<WalletTransaction, AppError> {
        let mut uow = self.repo.begin().await?;
        let entry = post_entry(&mut uow, user_id, posting).await?;
        uow.commit().await?;

        tracing::info!(
            transaction_id = %entry.id,
            wallet_id = %entry.wallet_id,
            kind = %entry.kind,
            amount = entry.amount.value(),
            "ledger entry committed"
        );
        Ok(entry)
    }
}
