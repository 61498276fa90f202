//! Wallet transaction (ledger entry) domain model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::amount::Amount;
use super::ids::{BookingId, PaymentId, WalletId, WalletTransactionId};
use crate::error::DomainError;

/// Which way a posting moves the balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Credit,
    Debit,
}

/// The kind of a ledger entry. The sign of the amount is implied by the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money coming into the wallet (top-up, gateway settlement)
    Deposit,
    /// Voluntary withdrawal out of the wallet
    Withdraw,
    /// Debit attributed to a specific booking
    BookingCharge,
    /// Credit returning a booking charge
    Refund,
    /// Payout from the wallet to a restaurant
    PaymentToRestaurant,
}

impl TransactionKind {
    pub fn direction(&self) -> Direction {
        match self {
            TransactionKind::Deposit | TransactionKind::Refund => Direction::Credit,
            TransactionKind::Withdraw
            | TransactionKind::BookingCharge
            | TransactionKind::PaymentToRestaurant => Direction::Debit,
        }
    }

    /// Signed effect of `amount` on the balance.
    pub fn signed(&self, amount: Amount) -> i64 {
        match self.direction() {
            Direction::Credit => amount.value(),
            Direction::Debit => -amount.value(),
        }
    }
}

impl AsRef<str> for TransactionKind {
    fn as_ref(&self) -> &str {
        match self {
            Self::Deposit => "deposit",
            Self::Withdraw => "withdraw",
            Self::BookingCharge => "booking_charge",
            Self::Refund => "refund",
            Self::PaymentToRestaurant => "payment_to_restaurant",
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(Self::Deposit),
            "withdraw" => Ok(Self::Withdraw),
            "booking_charge" => Ok(Self::BookingCharge),
            "refund" => Ok(Self::Refund),
            "payment_to_restaurant" => Ok(Self::PaymentToRestaurant),
            other => Err(DomainError::ValidationError(format!(
                "Unknown transaction kind: {}",
                other
            ))),
        }
    }
}

/// A balance mutation that has not been written yet.
///
/// The ledger turns a posting into exactly one `WalletTransaction` once the
/// wallet row is locked and the new balance is validated.
#[derive(Debug, Clone)]
pub struct Posting {
    pub kind: TransactionKind,
    pub amount: Amount,
    pub description: String,
    pub booking_id: Option<BookingId>,
    pub payment_id: Option<PaymentId>,
}

impl Posting {
    fn new(kind: TransactionKind, amount: Amount, description: impl Into<String>) -> Self {
        Self {
            kind,
            amount,
            description: description.into(),
            booking_id: None,
            payment_id: None,
        }
    }

    pub fn deposit(amount: Amount, description: impl Into<String>) -> Self {
        Self::new(TransactionKind::Deposit, amount, description)
    }

    pub fn withdraw(amount: Amount, description: impl Into<String>) -> Self {
        Self::new(TransactionKind::Withdraw, amount, description)
    }

    pub fn booking_charge(amount: Amount, booking_id: BookingId) -> Self {
        Self::new(
            TransactionKind::BookingCharge,
            amount,
            format!("Charge for booking {}", booking_id),
        )
        .for_booking(Some(booking_id))
    }

    pub fn refund(amount: Amount, booking_id: Option<BookingId>, reason: impl Into<String>) -> Self {
        Self::new(TransactionKind::Refund, amount, reason).for_booking(booking_id)
    }

    pub fn for_booking(mut self, booking_id: Option<BookingId>) -> Self {
        self.booking_id = booking_id;
        self
    }

    pub fn for_payment(mut self, payment_id: PaymentId) -> Self {
        self.payment_id = Some(payment_id);
        self
    }
}

/// A recorded ledger entry.
///
/// Transactions are immutable once created; corrections are new entries.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WalletTransaction {
    /// Unique identifier
    pub id: WalletTransactionId,
    /// Wallet the entry belongs to
    pub wallet_id: WalletId,
    /// Kind of entry, implies the sign
    pub kind: TransactionKind,
    /// Magnitude in minor units
    #[schema(value_type = i64, example = 500)]
    pub amount: Amount,
    /// Free-text description
    pub description: String,
    /// Booking the entry is attributed to
    pub booking_id: Option<BookingId>,
    /// Payment that caused the entry
    pub payment_id: Option<PaymentId>,
    /// When the entry was written
    pub created_at: DateTime<Utc>,
}

impl WalletTransaction {
    /// Records a posting against a wallet.
    pub fn record(wallet_id: WalletId, posting: Posting) -> Self {
        Self {
            id: WalletTransactionId::new(),
            wallet_id,
            kind: posting.kind,
            amount: posting.amount,
            description: posting.description,
            booking_id: posting.booking_id,
            payment_id: posting.payment_id,
            created_at: Utc::now(),
        }
    }

    /// Reconstructs a transaction from database fields.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: WalletTransactionId,
        wallet_id: WalletId,
        kind: TransactionKind,
        amount: Amount,
        description: String,
        booking_id: Option<BookingId>,
        payment_id: Option<PaymentId>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            wallet_id,
            kind,
            amount,
            description,
            booking_id,
            payment_id,
            created_at,
        }
    }

    /// Signed effect of this entry on the balance.
    pub fn signed_amount(&self) -> i64 {
        self.kind.signed(self.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn amount(v: i64) -> Amount {
        Amount::new(v).unwrap()
    }

    #[test]
    fn test_kind_signs() {
        assert_eq!(TransactionKind::Deposit.signed(amount(10)), 10);
        assert_eq!(TransactionKind::Refund.signed(amount(10)), 10);
        assert_eq!(TransactionKind::Withdraw.signed(amount(10)), -10);
        assert_eq!(TransactionKind::BookingCharge.signed(amount(10)), -10);
        assert_eq!(TransactionKind::PaymentToRestaurant.signed(amount(10)), -10);
    }

    #[test]
    fn test_kind_string_roundtrip() {
        for kind in [
            TransactionKind::Deposit,
            TransactionKind::Withdraw,
            TransactionKind::BookingCharge,
            TransactionKind::Refund,
            TransactionKind::PaymentToRestaurant,
        ] {
            assert_eq!(kind.to_string().parse::<TransactionKind>().unwrap(), kind);
        }
        assert!("transfer".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_booking_charge_posting() {
        let booking = BookingId::new();
        let posting = Posting::booking_charge(amount(500), booking);
        assert_eq!(posting.kind, TransactionKind::BookingCharge);
        assert_eq!(posting.booking_id, Some(booking));
        assert!(posting.payment_id.is_none());
    }

    #[test]
    fn test_record_carries_posting_fields() {
        let wallet = WalletId::new();
        let payment = PaymentId::new();
        let booking = BookingId::new();
        let tx = WalletTransaction::record(
            wallet,
            Posting::refund(amount(200), Some(booking), "cancelled").for_payment(payment),
        );

        assert_eq!(tx.wallet_id, wallet);
        assert_eq!(tx.kind, TransactionKind::Refund);
        assert_eq!(tx.description, "cancelled");
        assert_eq!(tx.booking_id, Some(booking));
        assert_eq!(tx.payment_id, Some(payment));
        assert_eq!(tx.signed_amount(), 200);
    }
}
