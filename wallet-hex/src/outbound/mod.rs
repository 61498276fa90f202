//! Outbound adapters driven by the services.

pub mod gateways;

pub use gateways::{GatewayA, GatewayB};
