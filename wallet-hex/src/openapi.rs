//! OpenAPI specification and documentation.

#![allow(dead_code)] // Path functions are only used by utoipa for documentation generation

use wallet_types::domain::{
    BookingId, Payment, PaymentId, PaymentMethod, PaymentStatus, TransactionKind, UserId, Wallet,
    WalletId, WalletTransaction, WalletTransactionId,
};
use wallet_types::dto::{
    BalanceResponse, CallbackAck, CheckoutResponse, CreatePaymentRequest, DepositRequest,
    GatewayCallbackRequest, PageQuery, WithdrawRequest,
};
use utoipa::OpenApi;

// Dummy functions to generate path documentation
// These are not the actual handlers, just for OpenAPI path generation

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = inline(serde_json::Value), example = json!({"status": "healthy"}))
    )
)]
async fn health() {}

/// Get a user's wallet, creating it on first access
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/wallet",
    tag = "wallet",
    params(("user_id" = UserId, Path, description = "User ID (UUID)")),
    responses(
        (status = 200, description = "Wallet", body = Wallet),
        (status = 400, description = "Invalid user ID")
    )
)]
async fn get_wallet() {}

/// Get a user's balance (0 if the user has no wallet)
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/wallet/balance",
    tag = "wallet",
    params(("user_id" = UserId, Path, description = "User ID (UUID)")),
    responses(
        (status = 200, description = "Current balance", body = BalanceResponse)
    )
)]
async fn get_balance() {}

/// Deposit money into a wallet
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/wallet/deposit",
    tag = "wallet",
    params(("user_id" = UserId, Path, description = "User ID (UUID)")),
    request_body = DepositRequest,
    responses(
        (status = 200, description = "Deposit recorded", body = WalletTransaction),
        (status = 400, description = "Amount is not positive")
    )
)]
async fn deposit() {}

/// Withdraw money from a wallet
#[utoipa::path(
    post,
    path = "/api/users/{user_id}/wallet/withdraw",
    tag = "wallet",
    params(("user_id" = UserId, Path, description = "User ID (UUID)")),
    request_body = WithdrawRequest,
    responses(
        (status = 200, description = "Withdrawal recorded", body = WalletTransaction),
        (status = 400, description = "Insufficient balance or invalid amount")
    )
)]
async fn withdraw() {}

/// List wallet transactions, newest first
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/wallet/transactions",
    tag = "wallet",
    params(("user_id" = UserId, Path, description = "User ID (UUID)"), PageQuery),
    responses(
        (status = 200, description = "Ledger entries", body = Vec<WalletTransaction>)
    )
)]
async fn list_transactions() {}

/// List a user's payments, newest first
#[utoipa::path(
    get,
    path = "/api/users/{user_id}/payments",
    tag = "payments",
    params(("user_id" = UserId, Path, description = "User ID (UUID)"), PageQuery),
    responses(
        (status = 200, description = "Payments", body = Vec<Payment>)
    )
)]
async fn list_user_payments() {}

/// Create a payment; wallet payments settle immediately
#[utoipa::path(
    post,
    path = "/api/payments",
    tag = "payments",
    request_body = CreatePaymentRequest,
    responses(
        (status = 201, description = "Payment created (wallet payments may come back failed)", body = Payment),
        (status = 400, description = "Amount is not positive")
    )
)]
async fn create_payment() {}

/// Get a payment
#[utoipa::path(
    get,
    path = "/api/payments/{id}",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    responses(
        (status = 200, description = "Payment", body = Payment),
        (status = 404, description = "Payment not found")
    )
)]
async fn get_payment() {}

/// Start gateway checkout for a pending payment
#[utoipa::path(
    post,
    path = "/api/payments/{id}/checkout",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    responses(
        (status = 200, description = "Checkout reference and redirect", body = CheckoutResponse),
        (status = 400, description = "Wallet payments have no checkout"),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment is not pending")
    )
)]
async fn checkout() {}

/// Refund a completed payment into the payer's wallet
#[utoipa::path(
    post,
    path = "/api/payments/{id}/refund",
    tag = "payments",
    params(("id" = PaymentId, Path, description = "Payment ID (UUID)")),
    responses(
        (status = 200, description = "Payment refunded (or already refunded)", body = Payment),
        (status = 404, description = "Payment not found"),
        (status = 409, description = "Payment is not completed")
    )
)]
async fn refund() {}

/// Gateway callback
#[utoipa::path(
    post,
    path = "/api/webhooks/{provider}",
    tag = "webhooks",
    params(("provider" = PaymentMethod, Path, description = "gateway_a or gateway_b")),
    request_body = GatewayCallbackRequest,
    responses(
        (status = 200, description = "Callback acknowledged", body = CallbackAck),
        (status = 404, description = "Unknown gateway"),
        (status = 409, description = "Payment already settled the other way")
    )
)]
async fn gateway_callback() {}

/// OpenAPI documentation for the Wallet API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wallet Ledger and Payments API",
        version = "1.0.0",
        description = "User wallets with an append-only ledger, and payment settlement through the wallet or mock external gateways.\n\nAmounts are integers in minor currency units.",
        license(name = "MIT"),
    ),
    paths(
        health,
        get_wallet,
        get_balance,
        deposit,
        withdraw,
        list_transactions,
        list_user_payments,
        create_payment,
        get_payment,
        checkout,
        refund,
        gateway_callback,
    ),
    components(
        schemas(
            Wallet,
            WalletTransaction,
            Payment,
            PaymentMethod,
            PaymentStatus,
            TransactionKind,
            UserId,
            WalletId,
            WalletTransactionId,
            PaymentId,
            BookingId,
            DepositRequest,
            WithdrawRequest,
            BalanceResponse,
            CreatePaymentRequest,
            CheckoutResponse,
            GatewayCallbackRequest,
            CallbackAck,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "wallet", description = "Wallet balance and ledger"),
        (name = "payments", description = "Payment creation, checkout and refunds"),
        (name = "webhooks", description = "Gateway callbacks"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/users/{user_id}/wallet",
            "/api/users/{user_id}/wallet/transactions",
            "/api/payments/{id}/checkout",
            "/api/webhooks/{provider}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
