//! Data Transfer Objects (DTOs) for requests and responses.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{BookingId, PaymentId, PaymentMethod, UserId};

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// A normalized limit/offset window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Page {
    /// Clamps `limit` into `1..=MAX_PAGE_LIMIT` and `offset` to be non-negative.
    pub fn new(limit: i64, offset: i64) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset: offset.max(0),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

/// Query string for list endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Maximum number of items (1-100, default 20)
    #[param(example = 20)]
    pub limit: Option<i64>,
    /// Number of items to skip
    #[param(example = 0)]
    pub offset: Option<i64>,
}

impl From<PageQuery> for Page {
    fn from(q: PageQuery) -> Self {
        Page::new(q.limit.unwrap_or(DEFAULT_PAGE_LIMIT), q.offset.unwrap_or(0))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Wallet DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to deposit money into a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DepositRequest {
    /// Amount to deposit in minor currency units
    #[schema(example = 1000)]
    pub amount: i64,
    /// Optional description for the ledger entry
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "top-up")]
    pub description: Option<String>,
}

/// Request to withdraw money from a wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WithdrawRequest {
    /// Amount to withdraw in minor currency units
    #[schema(example = 500)]
    pub amount: i64,
    /// Optional description for the ledger entry
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Current balance of a user's wallet.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BalanceResponse {
    pub user_id: UserId,
    /// Balance in minor currency units
    #[schema(example = 1000)]
    pub balance: i64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Payment DTOs
// ─────────────────────────────────────────────────────────────────────────────

/// Request to create a payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePaymentRequest {
    /// Paying user
    pub user_id: UserId,
    /// Amount in minor currency units
    #[schema(example = 300)]
    pub amount: i64,
    pub method: PaymentMethod,
    /// Booking the payment is for, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_id: Option<BookingId>,
}

/// Gateway checkout details for a pending payment.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CheckoutResponse {
    pub payment_id: PaymentId,
    pub method: PaymentMethod,
    /// Reference the gateway will quote in its callback
    #[schema(example = "ga_9fK2mQ7xLp0aZc4RtY8bNw1e")]
    pub external_id: String,
    /// Where to send the payer
    #[schema(example = "https://checkout.gateway-a.test/pay/ga_9fK2mQ7xLp0aZc4RtY8bNw1e?amount=300")]
    pub redirect_url: String,
}

/// Callback body posted by a gateway.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GatewayCallbackRequest {
    /// Reference issued at checkout
    #[schema(example = "ga_9fK2mQ7xLp0aZc4RtY8bNw1e")]
    pub external_id: String,
    /// Whether the payer completed the payment
    pub success: bool,
}

/// Acknowledgement returned to a gateway.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CallbackAck {
    pub received: bool,
}
