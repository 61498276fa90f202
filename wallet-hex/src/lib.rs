//! # Wallet Hex
//!
//! Application services and adapters for the wallet ledger and payment
//! settlement.
//!
//! ## Architecture
//!
//! - `ledger` - Wallet ledger service (every balance change goes through it)
//! - `settlement` - Payment state machine and settlement
//! - `outbound/` - Mock payment gateways
//! - `inbound/` - HTTP adapter (Axum server)
//!
//! The services are generic over `R: LedgerRepository`, allowing
//! different repository implementations to be injected.

pub mod inbound;
pub mod ledger;
pub mod openapi;
pub mod outbound;
pub mod settlement;


pub use inbound::HttpServer;
pub use ledger::WalletService;
pub use outbound::{GatewayA, GatewayB};
pub use settlement::PaymentService;
