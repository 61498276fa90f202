//! Ledger invariants against a real SQLite database.

use std::sync::Arc;

use wallet_hex::{PaymentService, WalletService};
use wallet_repo::SqliteRepo;
use wallet_types::{AppError, BookingId, Page, PaymentMethod, PaymentStatus, UserId};

async fn setup() -> (WalletService<SqliteRepo>, PaymentService<SqliteRepo>) {
    let repo = Arc::new(SqliteRepo::new("sqlite::memory:").await.unwrap());
    (
        WalletService::new(Arc::clone(&repo)),
        PaymentService::new(repo),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_withdraw_race() {
    let (wallets, _) = setup().await;
    let user = UserId::new();
    wallets.deposit(user, 100, "top-up".into()).await.unwrap();

    let first = {
        let wallets = wallets.clone();
        tokio::spawn(async move { wallets.withdraw(user, 60, "first".into()).await })
    };
    let second = {
        let wallets = wallets.clone();
        tokio::spawn(async move { wallets.withdraw(user, 60, "second".into()).await })
    };
    let outcomes = [first.await.unwrap(), second.await.unwrap()];

    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(
        outcomes
            .iter()
            .any(|r| matches!(r, Err(AppError::InsufficientBalance { available: 40, requested: 60 })))
    );
    assert_eq!(wallets.get_balance(user).await.unwrap(), 40);

    let history = wallets.list_transactions(user, Page::default()).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_postings_conserve_balance() {
    let (wallets, _) = setup().await;
    let user = UserId::new();
    wallets.deposit(user, 500, "seed".into()).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..20 {
        let wallets = wallets.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                wallets.deposit(user, 10, format!("deposit {}", i)).await
            } else {
                wallets.withdraw(user, 45, format!("withdraw {}", i)).await
            }
        }));
    }
    for handle in handles {
        let _ = handle.await.unwrap();
    }

    let balance = wallets.get_balance(user).await.unwrap();
    let history = wallets
        .list_transactions(user, Page::new(100, 0))
        .await
        .unwrap();
    let replayed: i64 = history.iter().map(|t| t.signed_amount()).sum();

    assert!(balance >= 0);
    assert_eq!(balance, replayed);
}

#[tokio::test]
async fn test_deposit_charge_refund_scenario() {
    let (wallets, _) = setup().await;
    let user = UserId::new();
    let booking = BookingId::new();

    wallets.deposit(user, 1000, "top-up".into()).await.unwrap();
    assert_eq!(wallets.get_balance(user).await.unwrap(), 1000);

    wallets.charge_for_booking(user, 500, booking).await.unwrap();
    assert_eq!(wallets.get_balance(user).await.unwrap(), 500);

    wallets
        .refund_booking(user, 500, booking, "Booking cancelled".into())
        .await
        .unwrap();
    assert_eq!(wallets.get_balance(user).await.unwrap(), 1000);

    let history = wallets.list_transactions(user, Page::default()).await.unwrap();
    assert_eq!(history.len(), 3);
}

#[tokio::test]
async fn test_declined_wallet_payment_leaves_ledger_untouched() {
    let (wallets, payments) = setup().await;
    let user = UserId::new();
    wallets.deposit(user, 100, "top-up".into()).await.unwrap();

    let payment = payments
        .create_payment(user, 300, PaymentMethod::Wallet, None)
        .await
        .unwrap();

    assert_eq!(payment.status, PaymentStatus::Failed);
    assert_eq!(wallets.get_balance(user).await.unwrap(), 100);
    let history = wallets.list_transactions(user, Page::default()).await.unwrap();
    assert_eq!(history.len(), 1);

    let stored = payments.get_payment(payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatus::Failed);
}
