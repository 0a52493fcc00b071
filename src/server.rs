//! HTTP API surface
//!
//! Thin JSON wrapper over the extraction pipeline: one `POST /extract`
//! endpoint plus a health check. Each request wraps the pipeline call in a
//! wall-clock timeout; a timed-out call is abandoned and its browser process
//! reaped on drop, since no operation in the pipeline is resumable.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::config::Config;
use crate::extract::{ExtractionResult, Extractor};
use crate::{Error, Result};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The pipeline behind the endpoint
    pub extractor: Arc<Extractor>,
    /// Wall-clock deadline per extract call
    pub request_timeout: Duration,
}

/// Extraction request body
#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    /// Listing URL to extract from
    pub url: String,
    /// Number of most-recent articles for the multi-result variant
    #[serde(default)]
    pub max_posts: Option<usize>,
}

/// Extraction response body
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub url: String,
    pub detail_url: String,
    pub text: String,
    pub image_url: Option<String>,
    pub image_base64: Option<String>,
}

impl From<ExtractionResult> for ExtractResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            url: result.source_url,
            detail_url: result.detail_url,
            text: result.text,
            image_url: result.image_url,
            image_base64: result.image_base64,
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health response body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub healthy: bool,
    pub version: String,
}

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/extract", post(extract))
        .with_state(state)
}

/// Health check endpoint
async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        healthy: true,
        version: crate::VERSION.to_string(),
    })
}

/// Extraction endpoint
async fn extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> impl IntoResponse {
    if request.url.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!(ErrorResponse {
                error: "url must not be empty".to_string(),
            })),
        );
    }

    info!("Extract request for {} (max_posts={:?})", request.url, request.max_posts);

    let outcome = match request.max_posts {
        Some(max_posts) if max_posts > 1 => tokio::time::timeout(
            state.request_timeout,
            state.extractor.extract_many(&request.url, max_posts),
        )
        .await
        .map(|result| result.map(MultiOrSingle::Multi)),
        _ => tokio::time::timeout(state.request_timeout, state.extractor.extract(&request.url))
            .await
            .map(|result| result.map(MultiOrSingle::Single)),
    };

    match outcome {
        Ok(Ok(MultiOrSingle::Single(result))) => (
            StatusCode::OK,
            Json(serde_json::json!(ExtractResponse::from(result))),
        ),
        Ok(Ok(MultiOrSingle::Multi(results))) => {
            let responses: Vec<ExtractResponse> =
                results.into_iter().map(ExtractResponse::from).collect();
            (StatusCode::OK, Json(serde_json::json!(responses)))
        }
        Ok(Err(e)) => {
            error!("Extraction failed for {}: {}", request.url, e);
            (
                StatusCode::from(&e),
                Json(serde_json::json!(ErrorResponse {
                    error: e.to_string(),
                })),
            )
        }
        Err(_) => {
            error!("Extraction exceeded wall-clock deadline for {}", request.url);
            (
                StatusCode::GATEWAY_TIMEOUT,
                Json(serde_json::json!(ErrorResponse {
                    error: format!(
                        "extraction exceeded {}s wall-clock deadline",
                        state.request_timeout.as_secs()
                    ),
                })),
            )
        }
    }
}

enum MultiOrSingle {
    Single(ExtractionResult),
    Multi(Vec<ExtractionResult>),
}

/// Run the HTTP server until shutdown
pub async fn serve(config: Config) -> Result<()> {
    let extractor = Arc::new(Extractor::from_config(&config)?);

    let state = AppState {
        extractor,
        request_timeout: Duration::from_secs(config.request_timeout),
    };

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| Error::internal(format!("HTTP server error: {}", e)))?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on SIGINT/SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("install SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM signal");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT signal");
            }
        }
    }

    #[cfg(windows)]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("Received Ctrl+C signal");
    }
}
