//! Payment domain model and its status machine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::amount::Amount;
use super::ids::{BookingId, PaymentId, UserId};
use crate::error::DomainError;

/// How a payment is funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Debited from the payer's wallet synchronously
    Wallet,
    /// External provider A, settled by callback
    GatewayA,
    /// External provider B, settled by callback
    GatewayB,
}

impl PaymentMethod {
    pub fn is_external(&self) -> bool {
        !matches!(self, PaymentMethod::Wallet)
    }
}

impl AsRef<str> for PaymentMethod {
    fn as_ref(&self) -> &str {
        match self {
            Self::Wallet => "wallet",
            Self::GatewayA => "gateway_a",
            Self::GatewayB => "gateway_b",
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "wallet" => Ok(Self::Wallet),
            "gateway_a" => Ok(Self::GatewayA),
            "gateway_b" => Ok(Self::GatewayB),
            other => Err(DomainError::ValidationError(format!(
                "Unknown payment method: {}",
                other
            ))),
        }
    }
}

/// Status of a payment.
///
/// ```text
/// pending --success--> completed --refund--> refunded
///    \--failure--> failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl PaymentStatus {
    /// Returns the statuses reachable in one step from this one.
    pub fn valid_transitions(&self) -> &'static [PaymentStatus] {
        match self {
            Self::Pending => &[Self::Completed, Self::Failed],
            Self::Completed => &[Self::Refunded],
            Self::Failed | Self::Refunded => &[],
        }
    }

    pub fn can_transition_to(&self, next: PaymentStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl AsRef<str> for PaymentStatus {
    fn as_ref(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            other => Err(DomainError::ValidationError(format!(
                "Unknown payment status: {}",
                other
            ))),
        }
    }
}

/// A single attempt to move money via a specific method.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: PaymentId,
    pub user_id: UserId,
    pub booking_id: Option<BookingId>,
    #[schema(value_type = i64, example = 300)]
    pub amount: Amount,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    /// Reference issued to the external gateway
    pub external_id: Option<String>,
    /// Checkout URL the payer is sent to
    pub redirect_url: Option<String>,
    /// Why the payment failed
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    /// Creates a new pending payment.
    pub fn new(
        user_id: UserId,
        amount: Amount,
        method: PaymentMethod,
        booking_id: Option<BookingId>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: PaymentId::new(),
            user_id,
            booking_id,
            amount,
            method,
            status: PaymentStatus::Pending,
            external_id: None,
            redirect_url: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Moves the payment to `next`, enforcing the status machine.
    pub fn transition(&mut self, next: PaymentStatus) -> Result<(), DomainError> {
        if !self.status.can_transition_to(next) {
            return Err(DomainError::InvalidPaymentStatus {
                status: self.status,
                message: format!("cannot move payment from {} to {}", self.status, next),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Completed)
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Failed)?;
        self.error_message = Some(error.into());
        Ok(())
    }

    pub fn refund(&mut self) -> Result<(), DomainError> {
        self.transition(PaymentStatus::Refunded)
    }

    /// Stores the gateway reference. Only a pending payment can be checked out.
    pub fn attach_gateway(
        &mut self,
        external_id: String,
        redirect_url: String,
    ) -> Result<(), DomainError> {
        if self.status != PaymentStatus::Pending {
            return Err(DomainError::InvalidPaymentStatus {
                status: self.status,
                message: "can only check out pending payments".into(),
            });
        }
        self.external_id = Some(external_id);
        self.redirect_url = Some(redirect_url);
        self.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(method: PaymentMethod) -> Payment {
        Payment::new(UserId::new(), Amount::new(300).unwrap(), method, None)
    }

    #[test]
    fn test_new_payment_is_pending() {
        let payment = pending(PaymentMethod::Wallet);
        assert_eq!(payment.status, PaymentStatus::Pending);
        assert!(payment.external_id.is_none());
    }

    #[test]
    fn test_transition_table() {
        use PaymentStatus::*;
        assert!(Pending.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Failed));
        assert!(Completed.can_transition_to(Refunded));
        assert!(!Pending.can_transition_to(Refunded));
        assert!(!Completed.can_transition_to(Failed));
        assert!(!Failed.can_transition_to(Completed));
        assert!(!Refunded.can_transition_to(Completed));
        assert!(Failed.is_terminal());
        assert!(Refunded.is_terminal());
        assert!(!Completed.is_terminal());
    }

    #[test]
    fn test_fail_records_error() {
        let mut payment = pending(PaymentMethod::Wallet);
        payment.fail("insufficient balance").unwrap();
        assert_eq!(payment.status, PaymentStatus::Failed);
        assert_eq!(payment.error_message.as_deref(), Some("insufficient balance"));
    }

    #[test]
    fn test_refund_requires_completed() {
        let mut payment = pending(PaymentMethod::Wallet);
        assert!(matches!(
            payment.refund(),
            Err(DomainError::InvalidPaymentStatus {
                status: PaymentStatus::Pending,
                ..
            })
        ));
        payment.complete().unwrap();
        payment.refund().unwrap();
        assert_eq!(payment.status, PaymentStatus::Refunded);
    }

    #[test]
    fn test_attach_gateway_requires_pending() {
        let mut payment = pending(PaymentMethod::GatewayA);
        payment
            .attach_gateway("ga_1".into(), "https://a.test/ga_1".into())
            .unwrap();
        assert_eq!(payment.external_id.as_deref(), Some("ga_1"));

        payment.complete().unwrap();
        assert!(payment
            .attach_gateway("ga_2".into(), "https://a.test/ga_2".into())
            .is_err());
    }

    #[test]
    fn test_method_parsing() {
        assert_eq!("gateway_b".parse::<PaymentMethod>().unwrap(), PaymentMethod::GatewayB);
        assert!("cash".parse::<PaymentMethod>().is_err());
        assert!(PaymentMethod::GatewayA.is_external());
        assert!(!PaymentMethod::Wallet.is_external());
    }
}
