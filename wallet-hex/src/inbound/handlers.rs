//! HTTP request handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use wallet_types::{
    AppError, BalanceResponse, CallbackAck, CreatePaymentRequest, DepositRequest,
    GatewayCallbackRequest, LedgerRepository, PageQuery, PaymentId, PaymentMethod, UserId,
    WithdrawRequest,
};

use crate::{PaymentService, WalletService};

/// Application state shared across handlers.
pub struct AppState<R: LedgerRepository> {
    pub wallets: WalletService<R>,
    pub payments: PaymentService<R>,
}

/// Wrapper to implement IntoResponse for AppError (orphan rule workaround).
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::InvalidAmount(_)
            | AppError::InsufficientBalance { .. }
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPaymentStatus { .. } => StatusCode::CONFLICT,
            AppError::PaymentNotFound(_) | AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Gateway(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = serde_json::json!({
            "error": self.0.to_string(),
            "kind": self.0.kind(),
            "code": status.as_u16()
        });

        (status, Json(body)).into_response()
    }
}

fn parse_user_id(raw: &str) -> Result<UserId, ApiError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid user ID".into()).into())
}

fn parse_payment_id(raw: &str) -> Result<PaymentId, ApiError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid payment ID".into()).into())
}

/// Health check endpoint.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet
// ─────────────────────────────────────────────────────────────────────────────

/// Get (or lazily create) a user's wallet.
#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_wallet<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let wallet = state.wallets.get_or_create_wallet(user_id).await?;
    Ok(Json(wallet))
}

#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn get_balance<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let balance = state.wallets.get_balance(user_id).await?;
    Ok(Json(BalanceResponse { user_id, balance }))
}

/// Deposit money into a wallet.
#[tracing::instrument(skip(state), fields(user_id = %user_id, amount = req.amount))]
pub async fn deposit<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<String>,
    Json(req): Json<DepositRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let description = req.description.unwrap_or_else(|| "Wallet deposit".into());
    let tx = state
        .wallets
        .deposit(user_id, req.amount, description)
        .await?;
    Ok(Json(tx))
}

/// Withdraw money from a wallet.
#[tracing::instrument(skip(state), fields(user_id = %user_id, amount = req.amount))]
pub async fn withdraw<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<String>,
    Json(req): Json<WithdrawRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let description = req
        .description
        .unwrap_or_else(|| "Wallet withdrawal".into());
    let tx = state
        .wallets
        .withdraw(user_id, req.amount, description)
        .await?;
    Ok(Json(tx))
}

/// List wallet transactions, newest first.
#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn list_transactions<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let transactions = state
        .wallets
        .list_transactions(user_id, page.into())
        .await?;
    Ok(Json(transactions))
}

// ─────────────────────────────────────────────────────────────────────────────
// Payments
// ─────────────────────────────────────────────────────────────────────────────

/// List a user's payments, newest first.
#[tracing::instrument(skip(state), fields(user_id = %user_id))]
pub async fn list_user_payments<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(user_id): Path<String>,
    Query(page): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_user_id(&user_id)?;
    let payments = state
        .payments
        .get_payments_by_user(user_id, page.into())
        .await?;
    Ok(Json(payments))
}

/// Create a payment. Wallet payments settle immediately.
#[tracing::instrument(skip(state), fields(user_id = %req.user_id, method = %req.method, amount = req.amount))]
pub async fn create_payment<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Json(req): Json<CreatePaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state
        .payments
        .create_payment(req.user_id, req.amount, req.method, req.booking_id)
        .await?;
    Ok((StatusCode::CREATED, Json(payment)))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn get_payment<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let payment = state.payments.get_payment(payment_id).await?;
    Ok(Json(payment))
}

/// Start gateway checkout for a pending payment.
#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn checkout<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let checkout = state.payments.create_gateway_payment(payment_id).await?;
    Ok(Json(checkout))
}

#[tracing::instrument(skip(state), fields(payment_id = %id))]
pub async fn refund<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let payment_id = parse_payment_id(&id)?;
    let payment = state.payments.refund_payment(payment_id).await?;
    Ok(Json(payment))
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway callbacks
// ─────────────────────────────────────────────────────────────────────────────

/// Gateway callback. Unknown references are acknowledged so the provider
/// stops retrying.
#[tracing::instrument(skip(state), fields(provider = %provider, external_id = %req.external_id, success = req.success))]
pub async fn gateway_callback<R: LedgerRepository>(
    State(state): State<Arc<AppState<R>>>,
    Path(provider): Path<String>,
    Json(req): Json<GatewayCallbackRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let method: PaymentMethod = provider
        .parse()
        .ok()
        .filter(PaymentMethod::is_external)
        .ok_or_else(|| AppError::NotFound(format!("Unknown gateway {}", provider)))?;

    match state
        .payments
        .process_external_callback(&req.external_id, req.success)
        .await
    {
        Ok(payment) => {
            if payment.method != method {
                tracing::warn!(
                    payment_id = %payment.id,
                    expected = %payment.method,
                    "callback arrived on another gateway's route"
                );
            }
        }
        Err(AppError::PaymentNotFound(_)) => {
            tracing::warn!("callback for unknown external reference");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(Json(CallbackAck { received: true }))
}
