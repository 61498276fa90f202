//! # Wallet Client SDK
//!
//! A typed Rust client for the wallet ledger and payments API.

use reqwest::Client;
use serde::de::DeserializeOwned;
use wallet_types::{
    BalanceResponse, BookingId, CallbackAck, CheckoutResponse, CreatePaymentRequest,
    DepositRequest, GatewayCallbackRequest, Payment, PaymentId, PaymentMethod, UserId, Wallet,
    WalletTransaction, WithdrawRequest,
};

/// Error type for client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {status} - {message}")]
    Api {
        status: u16,
        /// Machine-readable error kind, e.g. `insufficient_balance`.
        kind: Option<String>,
        message: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Wallet API client.
#[derive(Debug, Clone)]
pub struct WalletClient {
    base_url: String,
    http: Client,
}

impl WalletClient {
    /// Creates a new client.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    /// Checks if the API is healthy.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let resp = self
            .http
            .get(format!("{}/health", self.base_url))
            .send()
            .await?;
        Ok(resp.status().is_success())
    }

    /// Gets a user's wallet, creating it on the server if needed.
    pub async fn get_wallet(&self, user_id: UserId) -> Result<Wallet, ClientError> {
        self.get(&format!("/api/users/{}/wallet", user_id)).await
    }

    /// Gets a user's balance.
    pub async fn get_balance(&self, user_id: UserId) -> Result<i64, ClientError> {
        let resp: BalanceResponse = self
            .get(&format!("/api/users/{}/wallet/balance", user_id))
            .await?;
        Ok(resp.balance)
    }

    /// Deposits money into a user's wallet.
    pub async fn deposit(
        &self,
        user_id: UserId,
        amount: i64,
        description: Option<String>,
    ) -> Result<WalletTransaction, ClientError> {
        let req = DepositRequest {
            amount,
            description,
        };
        self.post(&format!("/api/users/{}/wallet/deposit", user_id), &req)
            .await
    }

    /// Withdraws money from a user's wallet.
    pub async fn withdraw(
        &self,
        user_id: UserId,
        amount: i64,
        description: Option<String>,
    ) -> Result<WalletTransaction, ClientError> {
        let req = WithdrawRequest {
            amount,
            description,
        };
        self.post(&format!("/api/users/{}/wallet/withdraw", user_id), &req)
            .await
    }

    /// Lists ledger entries, newest first.
    pub async fn list_transactions(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WalletTransaction>, ClientError> {
        self.get(&format!(
            "/api/users/{}/wallet/transactions?limit={}&offset={}",
            user_id, limit, offset
        ))
        .await
    }

    /// Lists a user's payments, newest first.
    pub async fn list_payments(
        &self,
        user_id: UserId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Payment>, ClientError> {
        self.get(&format!(
            "/api/users/{}/payments?limit={}&offset={}",
            user_id, limit, offset
        ))
        .await
    }

    /// Creates a payment. Wallet payments come back completed or failed.
    pub async fn create_payment(
        &self,
        user_id: UserId,
        amount: i64,
        method: PaymentMethod,
        booking_id: Option<BookingId>,
    ) -> Result<Payment, ClientError> {
        let req = CreatePaymentRequest {
            user_id,
            amount,
            method,
            booking_id,
        };
        self.post("/api/payments", &req).await
    }

    /// Gets a payment by ID.
    pub async fn get_payment(&self, id: PaymentId) -> Result<Payment, ClientError> {
        self.get(&format!("/api/payments/{}", id)).await
    }

    /// Starts gateway checkout for a pending payment.
    pub async fn checkout(&self, id: PaymentId) -> Result<CheckoutResponse, ClientError> {
        self.post_empty(&format!("/api/payments/{}/checkout", id))
            .await
    }

    /// Refunds a completed payment into the payer's wallet.
    pub async fn refund(&self, id: PaymentId) -> Result<Payment, ClientError> {
        self.post_empty(&format!("/api/payments/{}/refund", id))
            .await
    }

    /// Posts a gateway callback, as the provider would.
    pub async fn send_callback(
        &self,
        provider: PaymentMethod,
        external_id: &str,
        success: bool,
    ) -> Result<CallbackAck, ClientError> {
        let req = GatewayCallbackRequest {
            external_id: external_id.to_string(),
            success,
        };
        self.post(&format!("/api/webhooks/{}", provider), &req)
            .await
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        handle_response(resp).await
    }

    async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let resp = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .send()
            .await?;
        handle_response(resp).await
    }
}

async fn handle_response<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.text().await?;
    if status.is_success() {
        return Ok(serde_json::from_str(&body)?);
    }
    Err(api_error(status.as_u16(), body))
}

fn api_error(status: u16, body: String) -> ClientError {
    let parsed = serde_json::from_str::<serde_json::Value>(&body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|v| v.get(name))
            .and_then(|e| e.as_str())
            .map(String::from)
    };
    let kind = field("kind");
    let message = field("error").unwrap_or(body);
    ClientError::Api {
        status,
        kind,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WalletClient::new("http://localhost:3000");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_client_with_trailing_slash() {
        let client = WalletClient::new("http://localhost:3000/");
        assert_eq!(client.base_url, "http://localhost:3000");
    }

    #[test]
    fn test_api_error_reads_error_body() {
        let err = api_error(
            400,
            r#"{"error":"insufficient balance: available 40, requested 60","kind":"insufficient_balance","code":400}"#
                .to_string(),
        );
        match err {
            ClientError::Api {
                status,
                kind,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(kind.as_deref(), Some("insufficient_balance"));
                assert!(message.starts_with("insufficient balance"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = api_error(502, "Bad Gateway".to_string());
        match err {
            ClientError::Api { kind, message, .. } => {
                assert!(kind.is_none());
                assert_eq!(message, "Bad Gateway");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
