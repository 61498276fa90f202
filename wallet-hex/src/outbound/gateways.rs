//! Mock external payment gateways.
//!
//! Neither gateway talks to a real provider: each issues a random reference
//! and builds its checkout URL from the configured base URL.

use async_trait::async_trait;
use rand::{Rng, distr::Alphanumeric};

use wallet_types::{Amount, GatewayError, GatewayRedirect, Payment, PaymentGateway, PaymentMethod};

pub const DEFAULT_GATEWAY_A_URL: &str = "https://checkout.gateway-a.test";
pub const DEFAULT_GATEWAY_B_URL: &str = "https://pay.gateway-b.test";

const REFERENCE_LEN: usize = 24;

/// Generates `<prefix>_<random alphanumerics>`.
fn external_reference(prefix: &str) -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(REFERENCE_LEN)
        .map(char::from)
        .collect();
    format!("{}_{}", prefix, suffix)
}

fn normalize_base(url: impl Into<String>) -> String {
    url.into().trim_end_matches('/').to_string()
}

/// Gateway A: path-style checkout links.
#[derive(Debug, Clone)]
pub struct GatewayA {
    checkout_base_url: String,
}

impl GatewayA {
    pub fn new(checkout_base_url: impl Into<String>) -> Self {
        Self {
            checkout_base_url: normalize_base(checkout_base_url),
        }
    }

    pub fn redirect_url(&self, external_id: &str, amount: Amount) -> String {
        format!(
            "{}/pay/{}?amount={}",
            self.checkout_base_url,
            external_id,
            amount.value()
        )
    }
}

impl Default for GatewayA {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_A_URL)
    }
}

#[async_trait]
impl PaymentGateway for GatewayA {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::GatewayA
    }

    async fn create_redirect(&self, payment: &Payment) -> Result<GatewayRedirect, GatewayError> {
        if payment.method != PaymentMethod::GatewayA {
            return Err(GatewayError::Unsupported(payment.method));
        }
        let external_id = external_reference("ga");
        let redirect_url = self.redirect_url(&external_id, payment.amount);
        Ok(GatewayRedirect {
            external_id,
            redirect_url,
        })
    }
}

/// Gateway B: query-style checkout links.
#[derive(Debug, Clone)]
pub struct GatewayB {
    checkout_base_url: String,
}

impl GatewayB {
    pub fn new(checkout_base_url: impl Into<String>) -> Self {
        Self {
            checkout_base_url: normalize_base(checkout_base_url),
        }
    }

    pub fn redirect_url(&self, external_id: &str, amount: Amount) -> String {
        format!(
            "{}/checkout?order={}&amount={}",
            self.checkout_base_url,
            external_id,
            amount.value()
        )
    }
}

impl Default for GatewayB {
    fn default() -> Self {
        Self::new(DEFAULT_GATEWAY_B_URL)
    }
}

#[async_trait]
impl PaymentGateway for GatewayB {
    fn method(&self) -> PaymentMethod {
        PaymentMethod::GatewayB
    }

    async fn create_redirect(&self, payment: &Payment) -> Result<GatewayRedirect, GatewayError> {
        if payment.method != PaymentMethod::GatewayB {
            return Err(GatewayError::Unsupported(payment.method));
        }
        let external_id = external_reference("gb");
        let redirect_url = self.redirect_url(&external_id, payment.amount);
        Ok(GatewayRedirect {
            external_id,
            redirect_url,
        })
    }
}
