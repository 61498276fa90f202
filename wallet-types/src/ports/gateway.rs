//! External payment gateway port.
//!
//! Implementations register a payment with a provider and hand back the
//! reference the provider will quote in its callback.

use crate::domain::{Payment, PaymentMethod};

/// Error type for gateway operations.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("No gateway for payment method {0}")]
    Unsupported(PaymentMethod),

    #[error("Gateway unavailable: {0}")]
    Unavailable(String),
}

/// What a gateway returns when a payment is registered with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayRedirect {
    /// Opaque reference the gateway quotes back in its callback
    pub external_id: String,
    /// Where the payer completes the payment
    pub redirect_url: String,
}

/// Port trait for external payment providers.
#[async_trait::async_trait]
pub trait PaymentGateway: Send + Sync {
    /// The payment method this gateway settles.
    fn method(&self) -> PaymentMethod;

    /// Registers the payment with the provider.
    async fn create_redirect(&self, payment: &Payment) -> Result<GatewayRedirect, GatewayError>;
}
