use crate::config::ReceiptConfig;
use crate::handlers;
use crate::services::{
    load_currencies, DocumentConverter, LocalStorage, RetentionScheduler, Storage,
    WkhtmltopdfConverter,
};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use receipt_form::Currency;
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware,
    tracing::{make_request_span, request_id_middleware},
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

/// Multipart or JSON framing around an uploaded image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: ReceiptConfig,
    pub receipts: Arc<dyn Storage>,
    pub uploads: Arc<dyn Storage>,
    pub converter: Arc<dyn DocumentConverter>,
    pub retention: RetentionScheduler,
    pub currencies: Arc<Vec<Currency>>,
}

impl AppState {
    pub async fn new(
        config: ReceiptConfig,
        converter: Arc<dyn DocumentConverter>,
    ) -> Result<Self, AppError> {
        let receipts: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&config.storage.output_path)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize receipt storage at {}: {}",
                        config.storage.output_path,
                        e
                    );
                    e
                })?,
        );
        let uploads: Arc<dyn Storage> = Arc::new(
            LocalStorage::new(&config.storage.upload_path)
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize upload storage at {}: {}",
                        config.storage.upload_path,
                        e
                    );
                    e
                })?,
        );

        let retention = RetentionScheduler::new(receipts.clone(), config.retention.window());
        let currencies = Arc::new(load_currencies(&config.currencies_path));

        Ok(Self {
            config,
            receipts,
            uploads,
            converter,
            retention,
            currencies,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.upload.max_bytes + MULTIPART_OVERHEAD;
    let upload_dir = ServeDir::new(&state.config.storage.upload_path);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/api/receipt-id", get(handlers::new_receipt_id))
        .route("/api/currencies", get(handlers::list_currencies))
        .route(
            "/logos",
            post(handlers::upload_logo).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/receipts",
            post(handlers::generate_receipt).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/receipts/:file_id", get(handlers::download_receipt))
        .route("/settings/export", post(handlers::export_settings))
        .route("/settings/import", post(handlers::import_settings))
        .nest_service("/uploads", upload_dir)
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
    state: AppState,
}

impl Application {
    /// Build the service with the configured `wkhtmltopdf` converter.
    pub async fn build(config: ReceiptConfig) -> Result<Self, AppError> {
        let converter = WkhtmltopdfConverter::new(
            &config.renderer.binary,
            Duration::from_secs(config.renderer.timeout_secs),
            config.storage.work_path(),
        )
        .await?;
        Self::build_with_converter(config, Arc::new(converter)).await
    }

    pub async fn build_with_converter(
        config: ReceiptConfig,
        converter: Arc<dyn DocumentConverter>,
    ) -> Result<Self, AppError> {
        let state = AppState::new(config.clone(), converter).await?;
        let app = build_router(state.clone());

        let addr: SocketAddr = format!("{}:{}", config.common.host, config.common.port)
            .parse()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid listen address: {}", e)))?;
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
            state,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
