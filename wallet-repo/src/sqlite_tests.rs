//! SQLite repository integration tests.

#[cfg(test)]
mod tests {
    use wallet_types::{
        Amount, BookingId, LedgerRepository, Page, Payment, PaymentMethod, PaymentStatus, Posting,
        RepoError, TransactionKind, UnitOfWork, UserId, WalletTransaction,
    };

    use crate::SqliteRepo;

    async fn setup_repo() -> SqliteRepo {
        SqliteRepo::new("sqlite::memory:").await.unwrap()
    }

    fn amount(v: i64) -> Amount {
        Amount::new(v).unwrap()
    }

    /// Credits a wallet through a committed unit of work.
    async fn deposit(repo: &SqliteRepo, user_id: UserId, value: i64) {
        let mut uow = repo.begin().await.unwrap();
        let mut wallet = uow.lock_wallet(user_id).await.unwrap();
        wallet.credit(amount(value)).unwrap();
        uow.save_wallet(&wallet).await.unwrap();
        let entry = WalletTransaction::record(wallet.id, Posting::deposit(amount(value), "top-up"));
        uow.append_transaction(&entry).await.unwrap();
        uow.commit().await.unwrap();
    }

    #[tokio::test]
    async fn test_get_or_create_wallet_is_idempotent() {
        let repo = setup_repo().await;
        let user = UserId::new();

        let first = repo.get_or_create_wallet(user).await.unwrap();
        let second = repo.get_or_create_wallet(user).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(first.balance, 0);
        assert_eq!(first.user_id, user);
    }

    #[tokio::test]
    async fn test_find_wallet_missing() {
        let repo = setup_repo().await;

        let result = repo.find_wallet(UserId::new()).await.unwrap();

        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_committed_unit_of_work_persists() {
        let repo = setup_repo().await;
        let user = UserId::new();

        deposit(&repo, user, 1000).await;

        let wallet = repo.find_wallet(user).await.unwrap().unwrap();
        assert_eq!(wallet.balance, 1000);

        let entries = repo
            .list_transactions(wallet.id, Page::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, TransactionKind::Deposit);
        assert_eq!(entries[0].amount.value(), 1000);
        assert_eq!(entries[0].description, "top-up");
    }

    #[tokio::test]
    async fn test_dropped_unit_of_work_rolls_back() {
        let repo = setup_repo().await;
        let user = UserId::new();
        deposit(&repo, user, 500).await;

        {
            let mut uow = repo.begin().await.unwrap();
            let mut wallet = uow.lock_wallet(user).await.unwrap();
            wallet.debit(amount(200)).unwrap();
            uow.save_wallet(&wallet).await.unwrap();
            let entry =
                WalletTransaction::record(wallet.id, Posting::withdraw(amount(200), "cash out"));
            uow.append_transaction(&entry).await.unwrap();
            // dropped without commit
        }

        let wallet = repo.find_wallet(user).await.unwrap().unwrap();
        assert_eq!(wallet.balance, 500);
        let entries = repo
            .list_transactions(wallet.id, Page::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_list_transactions_newest_first_and_paged() {
        let repo = setup_repo().await;
        let user = UserId::new();
        for value in [100, 200, 300] {
            deposit(&repo, user, value).await;
        }
        let wallet = repo.find_wallet(user).await.unwrap().unwrap();

        let all = repo
            .list_transactions(wallet.id, Page::default())
            .await
            .unwrap();
        let values: Vec<i64> = all.iter().map(|t| t.amount.value()).collect();
        assert_eq!(values, vec![300, 200, 100]);

        let page = repo
            .list_transactions(wallet.id, Page::new(1, 1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].amount.value(), 200);

        let past_end = repo
            .list_transactions(wallet.id, Page::new(10, 5))
            .await
            .unwrap();
        assert!(past_end.is_empty());
    }

    #[tokio::test]
    async fn test_transaction_tags_round_trip() {
        let repo = setup_repo().await;
        let user = UserId::new();
        let booking = BookingId::new();
        let payment = Payment::new(user, amount(300), PaymentMethod::Wallet, Some(booking));

        let mut uow = repo.begin().await.unwrap();
        let wallet = uow.lock_wallet(user).await.unwrap();
        let entry = WalletTransaction::record(
            wallet.id,
            Posting::refund(amount(300), Some(booking), "Refund for no-show").for_payment(payment.id),
        );
        uow.append_transaction(&entry).await.unwrap();
        uow.commit().await.unwrap();

        let entries = repo
            .list_transactions(wallet.id, Page::default())
            .await
            .unwrap();
        assert_eq!(entries[0].booking_id, Some(booking));
        assert_eq!(entries[0].payment_id, Some(payment.id));
        assert_eq!(entries[0].kind, TransactionKind::Refund);
    }

    #[tokio::test]
    async fn test_insert_and_get_payment() {
        let repo = setup_repo().await;
        let payment = Payment::new(UserId::new(), amount(300), PaymentMethod::GatewayA, None);

        repo.insert_payment(&payment).await.unwrap();
        let fetched = repo.get_payment(payment.id).await.unwrap().unwrap();

        assert_eq!(fetched.id, payment.id);
        assert_eq!(fetched.status, PaymentStatus::Pending);
        assert_eq!(fetched.method, PaymentMethod::GatewayA);
        assert_eq!(fetched.amount.value(), 300);
        assert!(fetched.external_id.is_none());
    }

    #[tokio::test]
    async fn test_save_payment_and_lock_by_external_id() {
        let repo = setup_repo().await;
        let mut payment = Payment::new(UserId::new(), amount(300), PaymentMethod::GatewayB, None);
        repo.insert_payment(&payment).await.unwrap();

        payment
            .attach_gateway("gb_abc".into(), "https://checkout.test/checkout?order=gb_abc".into())
            .unwrap();
        let mut uow = repo.begin().await.unwrap();
        uow.save_payment(&payment).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = repo.begin().await.unwrap();
        let found = uow.lock_payment_by_external_id("gb_abc").await.unwrap().unwrap();
        assert_eq!(found.id, payment.id);
        assert!(
            uow.lock_payment_by_external_id("gb_missing")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_external_id_is_unique() {
        let repo = setup_repo().await;
        let user = UserId::new();

        let mut first = Payment::new(user, amount(100), PaymentMethod::GatewayA, None);
        first.attach_gateway("ga_dup".into(), "https://a.test".into()).unwrap();
        repo.insert_payment(&first).await.unwrap();

        let mut second = Payment::new(user, amount(100), PaymentMethod::GatewayA, None);
        second.attach_gateway("ga_dup".into(), "https://a.test".into()).unwrap();
        let result = repo.insert_payment(&second).await;

        assert!(matches!(result, Err(RepoError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_list_payments_newest_first() {
        let repo = setup_repo().await;
        let user = UserId::new();
        let other = UserId::new();

        let older = Payment::new(user, amount(100), PaymentMethod::Wallet, None);
        let newer = Payment::new(user, amount(200), PaymentMethod::GatewayA, None);
        repo.insert_payment(&older).await.unwrap();
        repo.insert_payment(&newer).await.unwrap();
        repo.insert_payment(&Payment::new(other, amount(50), PaymentMethod::Wallet, None))
            .await
            .unwrap();

        let listed = repo.list_payments(user, Page::default()).await.unwrap();

        let ids: Vec<_> = listed.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_save_missing_payment_is_not_found() {
        let repo = setup_repo().await;
        let payment = Payment::new(UserId::new(), amount(100), PaymentMethod::Wallet, None);

        let mut uow = repo.begin().await.unwrap();
        let result = uow.save_payment(&payment).await;

        assert!(matches!(result, Err(RepoError::NotFound)));
    }
}
