//! HTTP server setup and request handling.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (tracing, request timeout, request ID)
//! - Map pipeline results to HTTP statuses:
//!   list → 200, empty → 204, Timeout → 504, CircuitOpen → 503, other → 500
//! - Observability (metrics, request IDs)

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::catalog::InMemoryCatalog;
use crate::config::ServiceConfig;
use crate::http::request::{RequestIdLayer, REQUEST_ID_HEADER};
use crate::observability::metrics;
use crate::recommend::{HttpRecommendationClient, RecommendError, RecommendationPipeline};

/// The concrete pipeline the service runs in production.
pub type ServicePipeline = RecommendationPipeline<HttpRecommendationClient, InMemoryCatalog>;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ServicePipeline>,
}

/// HTTP server for the recommendation service.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration and pipeline.
    pub fn new(config: &ServiceConfig, pipeline: Arc<ServicePipeline>) -> Self {
        let state = AppState { pipeline };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/books/{isbn}/related-books", get(related_books_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Liveness probe.
async fn health_handler() -> StatusCode {
    StatusCode::OK
}

/// `GET /books/{isbn}/related-books`
async fn related_books_handler(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
    headers: HeaderMap,
) -> Response {
    let start = Instant::now();
    let request_id = headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    if isbn.trim().is_empty() {
        metrics::record_request("GET", 400, start);
        return (StatusCode::BAD_REQUEST, "isbn must not be blank").into_response();
    }

    tracing::debug!(request_id = %request_id, isbn = %isbn, "fetching related books");

    let (status, response) = match state.pipeline.related_books(&isbn).await {
        Ok(books) if books.is_empty() => {
            tracing::debug!(request_id = %request_id, isbn = %isbn, "no recommendations");
            (StatusCode::NO_CONTENT, StatusCode::NO_CONTENT.into_response())
        }
        Ok(books) => {
            tracing::debug!(
                request_id = %request_id,
                isbn = %isbn,
                count = books.len(),
                latency = ?start.elapsed(),
                "returning recommendations"
            );
            (StatusCode::OK, (StatusCode::OK, Json(books)).into_response())
        }
        Err(RecommendError::Timeout) => {
            tracing::error!(request_id = %request_id, isbn = %isbn, "recommendation fetch timed out");
            (
                StatusCode::GATEWAY_TIMEOUT,
                StatusCode::GATEWAY_TIMEOUT.into_response(),
            )
        }
        Err(RecommendError::CircuitOpen) => {
            tracing::warn!(request_id = %request_id, isbn = %isbn, "circuit open, failing fast");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                StatusCode::SERVICE_UNAVAILABLE.into_response(),
            )
        }
        Err(RecommendError::Upstream(reason)) => {
            tracing::error!(request_id = %request_id, isbn = %isbn, error = %reason, "recommendation fetch failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            )
        }
    };

    metrics::record_request("GET", status.as_u16(), start);
    response
}
