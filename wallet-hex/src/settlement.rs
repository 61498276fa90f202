//! Payment Settlement Service
//!
//! Drives payments through `pending -> completed | failed` and
//! `completed -> refunded`. Every status change that moves money shares a
//! unit of work with its ledger entry, and re-applying a transition to a
//! payment already in the target state is a successful no-op.

use std::collections::HashMap;
use std::sync::Arc;

use wallet_types::{
    Amount, AppError, BookingId, CheckoutResponse, GatewayError, LedgerRepository, Page, Payment,
    PaymentGateway, PaymentId, PaymentMethod, PaymentStatus, Posting, UnitOfWork, UserId,
};

use crate::ledger::post_entry;

/// Application service for payments.
pub struct PaymentService<R: LedgerRepository> {
    repo: Arc<R>,
    gateways: HashMap<PaymentMethod, Arc<dyn PaymentGateway>>,
}

impl<R: LedgerRepository> PaymentService<R> {
    /// Creates a payment service with no external gateways registered.
    pub fn new(repo: Arc<R>) -> Self {
        Self {
            repo,
            gateways: HashMap::new(),
        }
    }

    /// Registers a gateway for the method it settles.
    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateways.insert(gateway.method(), gateway);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Creation
    // ─────────────────────────────────────────────────────────────────────────────

    /// Records a pending payment. Wallet payments are settled before returning;
    /// a declined wallet settlement yields the failed payment, not an error.
    #[tracing::instrument(skip(self), fields(user_id = %user_id, method = %method))]
    pub async fn create_payment(
        &self,
        user_id: UserId,
        amount: i64,
        method: PaymentMethod,
        booking_id: Option<BookingId>,
    ) -> Result<Payment, AppError> {
        let amount = Amount::new(amount)?;
        let payment = Payment::new(user_id, amount, method, booking_id);
        self.repo.insert_payment(&payment).await?;

        tracing::info!(payment_id = %payment.id, amount = amount.value(), "payment created");

        if method != PaymentMethod::Wallet {
            return Ok(payment);
        }

        match self.process_wallet_payment(payment.id).await {
            Ok(settled) => Ok(settled),
            Err(err) => {
                let reloaded = self.get_payment(payment.id).await?;
                if reloaded.status == PaymentStatus::Failed {
                    Ok(reloaded)
                } else {
                    Err(err)
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Wallet settlement
    // ─────────────────────────────────────────────────────────────────────────────

    /// Charges the payer's wallet for a pending wallet payment.
    ///
    /// A ledger rejection marks the payment failed with the reason and is
    /// returned to the caller.
    #[tracing::instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn process_wallet_payment(&self, payment_id: PaymentId) -> Result<Payment, AppError> {
        let mut uow = self.repo.begin().await?;
        let mut payment = locked_payment(&mut uow, payment_id).await?;

        if payment.method != PaymentMethod::Wallet {
            return Err(AppError::BadRequest(format!(
                "payment {} is settled by {}",
                payment.id, payment.method
            )));
        }
        match payment.status {
            PaymentStatus::Completed => return Ok(payment),
            PaymentStatus::Pending => {}
            status => {
                return Err(AppError::InvalidPaymentStatus {
                    status,
                    message: "can only settle pending payments".into(),
                });
            }
        }

        let posting = match payment.booking_id {
            Some(booking_id) => Posting::booking_charge(payment.amount, booking_id),
            None => Posting::withdraw(payment.amount, format!("Payment {}", payment.id)),
        }
        .for_payment(payment.id);

        match post_entry(&mut uow, payment.user_id, posting).await {
            Ok(_) => {
                payment.complete()?;
                uow.save_payment(&payment).await?;
                uow.commit().await?;

                tracing::info!(payment_id = %payment.id, "wallet payment completed");
                Ok(payment)
            }
            Err(err) => {
                // Roll back the charge attempt before recording the failure.
                drop(uow);
                self.mark_failed(payment_id, &err.to_string()).await?;
                Err(err)
            }
        }
    }

    async fn mark_failed(&self, payment_id: PaymentId, reason: &str) -> Result<(), AppError> {
        let mut uow = self.repo.begin().await?;
        let mut payment = locked_payment(&mut uow, payment_id).await?;
        if payment.status != PaymentStatus::Pending {
            return Ok(());
        }

        payment.fail(reason)?;
        uow.save_payment(&payment).await?;
        uow.commit().await?;

        tracing::warn!(payment_id = %payment_id, reason, "payment failed");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Gateway settlement
    // ─────────────────────────────────────────────────────────────────────────────

    /// Registers a pending gateway payment with its provider and returns where
    /// to send the payer. Repeated calls return the stored reference.
    #[tracing::instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn create_gateway_payment(
        &self,
        payment_id: PaymentId,
    ) -> Result<CheckoutResponse, AppError> {
        let mut uow = self.repo.begin().await?;
        let mut payment = locked_payment(&mut uow, payment_id).await?;

        if !payment.method.is_external() {
            return Err(AppError::BadRequest(
                "wallet payments are settled without a gateway".into(),
            ));
        }
        if payment.status != PaymentStatus::Pending {
            return Err(AppError::InvalidPaymentStatus {
                status: payment.status,
                message: "can only check out pending payments".into(),
            });
        }
        if let Some(checkout) = checkout_of(&payment) {
            return Ok(checkout);
        }

        let gateway = self
            .gateways
            .get(&payment.method)
            .ok_or(GatewayError::Unsupported(payment.method))?;
        let redirect = gateway.create_redirect(&payment).await?;

        payment.attach_gateway(redirect.external_id, redirect.redirect_url)?;
        uow.save_payment(&payment).await?;
        uow.commit().await?;

        tracing::info!(
            payment_id = %payment.id,
            external_id = payment.external_id.as_deref().unwrap_or_default(),
            "gateway checkout created"
        );
        checkout_of(&payment)
            .ok_or_else(|| AppError::Internal("checkout reference was not stored".into()))
    }

    /// Applies a gateway's verdict to the payment it references.
    ///
    /// Success credits the payer's wallet with the payment amount. Replays of
    /// an already applied verdict change nothing.
    #[tracing::instrument(skip(self), fields(external_id = %external_id))]
    pub async fn process_external_callback(
        &self,
        external_id: &str,
        success: bool,
    ) -> Result<Payment, AppError> {
        let mut uow = self.repo.begin().await?;
        let mut payment = uow
            .lock_payment_by_external_id(external_id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(format!("external reference {}", external_id)))?;

        let target = if success {
            PaymentStatus::Completed
        } else {
            PaymentStatus::Failed
        };
        if payment.status == target {
            tracing::info!(payment_id = %payment.id, status = %target, "callback already applied");
            return Ok(payment);
        }
        if payment.status != PaymentStatus::Pending {
            return Err(AppError::InvalidPaymentStatus {
                status: payment.status,
                message: format!("cannot move payment to {}", target),
            });
        }

        if success {
            let posting = Posting::deposit(
                payment.amount,
                format!("Wallet top-up via {}", payment.method),
            )
            .for_booking(payment.booking_id)
            .for_payment(payment.id);
            post_entry(&mut uow, payment.user_id, posting).await?;
            payment.complete()?;
        } else {
            payment.fail("payment declined by gateway")?;
        }

        uow.save_payment(&payment).await?;
        uow.commit().await?;

        tracing::info!(payment_id = %payment.id, status = %payment.status, "callback applied");
        Ok(payment)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Refunds
    // ─────────────────────────────────────────────────────────────────────────────

    /// Refunds a completed payment into the payer's wallet.
    #[tracing::instrument(skip(self), fields(payment_id = %payment_id))]
    pub async fn refund_payment(&self, payment_id: PaymentId) -> Result<Payment, AppError> {
        let mut uow = self.repo.begin().await?;
        let mut payment = locked_payment(&mut uow, payment_id).await?;

        match payment.status {
            PaymentStatus::Refunded => return Ok(payment),
            PaymentStatus::Completed => {}
            status => {
                return Err(AppError::InvalidPaymentStatus {
                    status,
                    message: "can only refund completed payments".into(),
                });
            }
        }

        let posting = Posting::refund(
            payment.amount,
            payment.booking_id,
            format!("Refund for payment {}", payment.id),
        )
        .for_payment(payment.id);
        post_entry(&mut uow, payment.user_id, posting).await?;

        payment.refund()?;
        uow.save_payment(&payment).await?;
        uow.commit().await?;

        tracing::info!(payment_id = %payment.id, amount = payment.amount.value(), "payment refunded");
        Ok(payment)
    }

    // ─────────────────────────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────────────────────────

    /// Gets a payment by ID.
    pub async fn get_payment(&self, payment_id: PaymentId) -> Result<Payment, AppError> {
        self.repo
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))
    }

    /// Lists a user's payments, newest first.
    pub async fn get_payments_by_user(
        &self,
        user_id: UserId,
        page: Page,
    ) -> Result<Vec<Payment>, AppError> {
        Ok(self.repo.list_payments(user_id, page).await?)
    }
}

async fn locked_payment<U: UnitOfWork>(
    uow: &mut U,
    payment_id: PaymentId,
) -> Result<Payment, AppError> {
    uow.lock_payment(payment_id)
        .await?
        .ok_or_else(|| AppError::PaymentNotFound(payment_id.to_string()))
}

fn checkout_of(payment: &Payment) -> Option<CheckoutResponse> {
    Some(CheckoutResponse {
        payment_id: payment.id,
        method: payment.method,
        external_id: payment.external_id.clone()?,
        redirect_url: payment.redirect_url.clone()?,
    })
}
