//! HTTP Server configuration and startup.

use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::get,
};
use catalog_repo::ApiKeyStore;
use tower_http::trace::TraceLayer;

use catalog_types::CatalogRepository;

use super::auth::auth_middleware;
use super::handlers::{self, AppState};
use crate::CatalogService;

/// HTTP Server for the Catalog API.
pub struct HttpServer<R: CatalogRepository> {
    state: Arc<AppState<R>>,
}

impl<R: CatalogRepository> HttpServer<R> {
    /// Creates a new HTTP server with the given service and key store.
    pub fn new(service: CatalogService<R>, api_keys: ApiKeyStore) -> Self {
        Self {
            state: Arc::new(AppState { service, api_keys }),
        }
    }

    /// Builds the Axum router with all routes.
    pub fn router(&self) -> Router {
        // Uses the globally set MeterProvider; a no-op one when OTel is off
        let metrics = axum_otel_metrics::HttpMetricsLayerBuilder::new().build();

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api-docs/openapi.json", get(handlers::openapi_json))
            .route(
                "/api/v1/books",
                get(handlers::list_books::<R>).post(handlers::create_book::<R>),
            )
            .route(
                "/api/v1/books/{id}",
                get(handlers::get_book::<R>)
                    .put(handlers::update_book::<R>)
                    .delete(handlers::delete_book::<R>),
            )
            .route(
                "/api/v1/authors",
                get(handlers::list_authors::<R>).post(handlers::create_author::<R>),
            )
            .route(
                "/api/v1/authors/{id}",
                get(handlers::get_author::<R>)
                    .put(handlers::update_author::<R>)
                    .delete(handlers::delete_author::<R>),
            )
            .route("/api/v1/rates", get(handlers::get_rates::<R>))
            .layer(metrics)
            .layer(middleware::from_fn_with_state(
                self.state.clone(),
                auth_middleware::<R>,
            ))
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

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
