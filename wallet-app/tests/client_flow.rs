//! End-to-end flows through the client SDK against a served router.

use std::sync::Arc;

use tempfile::TempDir;
use tokio::net::TcpListener;
use wallet_client::{ClientError, WalletClient};
use wallet_hex::{GatewayA, GatewayB, HttpServer, PaymentService, WalletService};
use wallet_repo::SqliteRepo;
use wallet_types::{BookingId, PaymentMethod, PaymentStatus, TransactionKind, UserId};

/// Serves the full stack on an ephemeral port over a file-backed SQLite
/// database. The returned directory must outlive the test.
async fn spawn_server() -> (WalletClient, TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let db_url = format!("sqlite://{}", tmp.path().join("wallet.db").display());
    let repo = Arc::new(SqliteRepo::new(&db_url).await.unwrap());

    let wallets = WalletService::new(Arc::clone(&repo));
    let payments = PaymentService::new(repo)
        .with_gateway(Arc::new(GatewayA::default()))
        .with_gateway(Arc::new(GatewayB::default()));
    let router = HttpServer::new(wallets, payments).router();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (WalletClient::new(format!("http://{}", addr)), tmp)
}

#[tokio::test]
async fn test_wallet_flow() {
    let (client, _tmp) = spawn_server().await;
    let user = UserId::new();

    assert!(client.health().await.unwrap());
    assert_eq!(client.get_balance(user).await.unwrap(), 0);

    client.deposit(user, 1000, None).await.unwrap();
    let tx = client
        .withdraw(user, 250, Some("cash out".to_string()))
        .await
        .unwrap();
    assert_eq!(tx.kind, TransactionKind::Withdraw);
    assert_eq!(tx.description, "cash out");

    let wallet = client.get_wallet(user).await.unwrap();
    assert_eq!(wallet.balance, 750);

    let history = client.list_transactions(user, 10, 0).await.unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind, TransactionKind::Withdraw);

    let err = client.withdraw(user, 10_000, None).await.unwrap_err();
    match err {
        ClientError::Api { status, kind, .. } => {
            assert_eq!(status, 400);
            assert_eq!(kind.as_deref(), Some("insufficient_balance"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_booking_paid_from_wallet_then_refunded() {
    let (client, _tmp) = spawn_server().await;
    let user = UserId::new();
    client.deposit(user, 1000, None).await.unwrap();

    let payment = client
        .create_payment(user, 400, PaymentMethod::Wallet, Some(BookingId::new()))
        .await
        .unwrap();
    assert_eq!(payment.status, PaymentStatus::Completed);
    assert_eq!(client.get_balance(user).await.unwrap(), 600);

    let refunded = client.refund(payment.id).await.unwrap();
    assert_eq!(refunded.status, PaymentStatus::Refunded);
    assert_eq!(client.get_balance(user).await.unwrap(), 1000);

    // A second refund is a no-op.
    client.refund(payment.id).await.unwrap();
    assert_eq!(client.get_balance(user).await.unwrap(), 1000);
}

#[tokio::test]
async fn test_gateway_top_up_and_decline() {
    let (client, _tmp) = spawn_server().await;
    let user = UserId::new();

    let paid = client
        .create_payment(user, 500, PaymentMethod::GatewayB, None)
        .await
        .unwrap();
    let checkout = client.checkout(paid.id).await.unwrap();
    assert!(checkout.external_id.starts_with("gb_"));
    client
        .send_callback(PaymentMethod::GatewayB, &checkout.external_id, true)
        .await
        .unwrap();
    assert_eq!(client.get_balance(user).await.unwrap(), 500);

    let declined = client
        .create_payment(user, 200, PaymentMethod::GatewayA, None)
        .await
        .unwrap();
    let checkout = client.checkout(declined.id).await.unwrap();
    client
        .send_callback(PaymentMethod::GatewayA, &checkout.external_id, false)
        .await
        .unwrap();

    let declined = client.get_payment(declined.id).await.unwrap();
    assert_eq!(declined.status, PaymentStatus::Failed);
    assert_eq!(client.get_balance(user).await.unwrap(), 500);

    let payments = client.list_payments(user, 10, 0).await.unwrap();
    assert_eq!(payments.len(), 2);
}
