//! Wallet domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::amount::Amount;
use super::ids::{UserId, WalletId};
use crate::error::DomainError;

/// A user's monetary balance. One per user, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Wallet {
    /// Unique identifier
    pub id: WalletId,
    /// Owning user (unique across wallets)
    pub user_id: UserId,
    /// Current balance in minor units, never negative
    #[schema(example = 1000)]
    pub balance: i64,
    /// When the wallet was created
    pub created_at: DateTime<Utc>,
    /// When the balance last changed
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Creates an empty wallet for a user.
    pub fn new(user_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::new(),
            user_id,
            balance: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Creates a wallet with all fields specified (for database reconstruction).
    pub fn from_parts(
        id: WalletId,
        user_id: UserId,
        balance: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if balance < 0 {
            return Err(DomainError::ValidationError(format!(
                "wallet {} has negative balance {}",
                id, balance
            )));
        }

        Ok(Self {
            id,
            user_id,
            balance,
            created_at,
            updated_at,
        })
    }

    /// Credits (adds) money to the wallet.
    pub fn credit(&mut self, amount: Amount) -> Result<(), DomainError> {
        self.balance = self
            .balance
            .checked_add(amount.value())
            .ok_or(DomainError::BalanceOverflow)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Debits (subtracts) money from the wallet.
    pub fn debit(&mut self, amount: Amount) -> Result<(), DomainError> {
        if !self.has_sufficient_balance(amount) {
            return Err(DomainError::InsufficientBalance {
                available: self.balance,
                requested: amount.value(),
            });
        }
        self.balance -= amount.value();
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn has_sufficient_balance(&self, amount: Amount) -> bool {
        self.balance >= amount.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(v: i64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn test_wallet_starts_empty() {
        let user = UserId::new();
        let wallet = Wallet::new(user);
        assert_eq!(wallet.user_id, user);
        assert_eq!(wallet.balance, 0);
    }

    #[test]
    fn test_wallet_credit_and_debit() {
        let mut wallet = Wallet::new(UserId::new());
        wallet.credit(amount(1000)).unwrap();
        wallet.debit(amount(300)).unwrap();
        assert_eq!(wallet.balance, 700);
    }

    #[test]
    fn test_debit_exact_balance() {
        let mut wallet = Wallet::new(UserId::new());
        wallet.credit(amount(500)).unwrap();
        wallet.debit(amount(500)).unwrap();
        assert_eq!(wallet.balance, 0);
    }

    #[test]
    fn test_insufficient_balance_leaves_wallet_untouched() {
        let mut wallet = Wallet::new(UserId::new());
        wallet.credit(amount(100)).unwrap();
        let result = wallet.debit(amount(200));
        assert!(matches!(
            result,
            Err(DomainError::InsufficientBalance {
                available: 100,
                requested: 200
            })
        ));
        assert_eq!(wallet.balance, 100);
    }

    #[test]
    fn test_credit_overflow() {
        let mut wallet = Wallet::new(UserId::new());
        wallet.credit(amount(i64::MAX)).unwrap();
        assert!(matches!(
            wallet.credit(amount(1)),
            Err(DomainError::BalanceOverflow)
        ));
        assert_eq!(wallet.balance, i64::MAX);
    }

    #[test]
    fn test_from_parts_rejects_negative_balance() {
        let now = Utc::now();
        let result = Wallet::from_parts(WalletId::new(), UserId::new(), -1, now, now);
        assert!(matches!(result, Err(DomainError::ValidationError(_))));
    }
}
