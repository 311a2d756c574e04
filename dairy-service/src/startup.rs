//! Application startup and lifecycle management.

use crate::config::DairyConfig;
use crate::handlers;
use crate::services::{Database, MockNotifier, Notifier, WebhookNotifier};
use axum::{
    Router,
    routing::{get, post},
};
use service_core::error::AppError;
use service_core::middleware::metrics::metrics_middleware;
use service_core::middleware::tracing::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: DairyConfig,
    pub db: Database,
    pub notifier: Arc<dyn Notifier>,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: DairyConfig) -> Result<Self, AppError> {
        let db = Database::new(
            &config.database.url,
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!("Failed to run migrations: {}", e);
            e
        })?;

        let notifier: Arc<dyn Notifier> = if config.notifier.enabled {
            tracing::info!(endpoint = %config.notifier.endpoint, "Webhook notifier initialized");
            Arc::new(WebhookNotifier::new(config.notifier.endpoint.clone()))
        } else {
            tracing::info!("Notifier disabled, using mock notifier");
            Arc::new(MockNotifier::new(true))
        };

        let state = AppState {
            config: config.clone(),
            db,
            notifier,
        };

        let router = Router::new()
            .route("/health", get(handlers::health_check))
            .route("/ready", get(handlers::readiness_check))
            .route("/metrics", get(handlers::metrics_endpoint))
            // Delivery ledger
            .route(
                "/delivery/record",
                post(handlers::deliveries::record_delivery).get(handlers::deliveries::list_deliveries),
            )
            // Billing reconciler
            .route(
                "/bills/generate",
                post(handlers::bills::generate_bills).get(handlers::bills::list_bills),
            )
            // Customer registry
            .route(
                "/customers",
                get(handlers::customers::list_customers).post(handlers::customers::create_customer),
            )
            .route(
                "/customers/:id",
                get(handlers::customers::get_customer)
                    .put(handlers::customers::update_customer)
                    .delete(handlers::customers::deactivate_customer),
            )
            // Aggregation views
            .route("/owner/dashboard", get(handlers::dashboard::dashboard))
            .layer(axum::middleware::from_fn(metrics_middleware))
            .layer(axum::middleware::from_fn(request_id_middleware))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|value| value.to_str().ok())
                        .unwrap_or("-");

                    tracing::info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = %request.method(),
                        uri = %request.uri(),
                    )
                }),
            )
            .layer(CorsLayer::permissive())
            .with_state(state);

        // Bind listener (port 0 = random port for testing)
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("dairy-service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router).await
    }
}
