//! HTTP Server configuration and startup.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    routing::{get, post},
};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;

use wallet_types::LedgerRepository;

use super::handlers::{self, AppState};
use crate::openapi::ApiDoc;
use crate::{PaymentService, WalletService};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP Server for the Wallet API.
pub struct HttpServer<R: LedgerRepository> {
    state: Arc<AppState<R>>,
    request_timeout: Duration,
}

impl<R: LedgerRepository> HttpServer<R> {
    /// Creates a new HTTP server over the two services.
    pub fn new(wallets: WalletService<R>, payments: PaymentService<R>) -> Self {
        Self {
            state: Arc::new(AppState { wallets, payments }),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bounds every request; a request still running at the deadline is
    /// dropped, which rolls back any open unit of work.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Build HTTP metrics layer (uses globally set MeterProvider)
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(openapi_json))
            .route("/api/users/{user_id}/wallet", get(handlers::get_wallet::<R>))
            .route(
                "/api/users/{user_id}/wallet/balance",
                get(handlers::get_balance::<R>),
            )
            .route(
                "/api/users/{user_id}/wallet/deposit",
                post(handlers::deposit::<R>),
            )
            .route(
                "/api/users/{user_id}/wallet/withdraw",
                post(handlers::withdraw::<R>),
            )
            .route(
                "/api/users/{user_id}/wallet/transactions",
                get(handlers::list_transactions::<R>),
            )
            .route(
                "/api/users/{user_id}/payments",
                get(handlers::list_user_payments::<R>),
            )
            .route("/api/payments", post(handlers::create_payment::<R>))
            .route("/api/payments/{id}", get(handlers::get_payment::<R>))
            .route("/api/payments/{id}/checkout", post(handlers::checkout::<R>))
            .route("/api/payments/{id}/refund", post(handlers::refund::<R>))
            .route(
                "/api/webhooks/{provider}",
                post(handlers::gateway_callback::<R>),
            )
            .layer(metrics)
            .layer(TimeoutLayer::new(self.request_timeout))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Runs the server on the given address with graceful shutdown.
    pub async fn run(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        Ok(())
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown...");
}
