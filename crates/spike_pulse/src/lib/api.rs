//! HTTP API
//!
//! Endpoints:
//! - POST /generate-insight - Telemetry snapshot in, coaching insight out
//! - POST /analyze-emotion - Text emotion passthrough
//! - GET /health - Health check

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::{
    emotion::{analyze_or_neutral, EmotionAnalyzer},
    types::{EmotionReading, EmotionRequest, InsightResult, TelemetrySnapshot},
    Error, InsightModel, InsightService, VERSION,
};

pub struct AppState<M, E>
where
    M: InsightModel + Send + Sync + 'static,
    E: EmotionAnalyzer + Send + Sync + 'static,
{
    pub insights: InsightService<M>,
    pub emotion: E,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error body, `{"detail": "..."}`.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    Internal(Error),
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        ApiError::Internal(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            ApiError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

pub fn create_router<M, E>(state: AppState<M, E>, cors: CorsLayer) -> Router
where
    M: InsightModel + Send + Sync + 'static,
    E: EmotionAnalyzer + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/generate-insight", post(generate_insight::<M, E>))
        .route("/analyze-emotion", post(analyze_emotion::<M, E>))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// `*` anywhere in the list allows every origin.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.iter().any(|o| o.trim() == "*") {
        return layer.allow_origin(Any);
    }

    let origins = origins
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .filter_map(|o| {
            HeaderValue::from_str(o)
                .inspect_err(|e| tracing::warn!(origin = o, error = %e, "Ignoring invalid CORS origin"))
                .ok()
        })
        .collect::<Vec<_>>();

    layer.allow_origin(AllowOrigin::list(origins))
}

#[tracing::instrument(skip_all, fields(addr = ?listener.local_addr().ok()))]
pub async fn serve(listener: TcpListener, router: Router) -> std::io::Result<()> {
    tracing::info!("Listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
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
    tracing::info!("Shutdown signal received");
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: VERSION,
    })
}

async fn generate_insight<M, E>(
    State(state): State<Arc<AppState<M, E>>>,
    Json(snapshot): Json<TelemetrySnapshot>,
) -> Result<Json<InsightResult>, ApiError>
where
    M: InsightModel + Send + Sync + 'static,
    E: EmotionAnalyzer + Send + Sync + 'static,
{
    let result = state.insights.generate(snapshot).await?;
    Ok(Json(result))
}

async fn analyze_emotion<M, E>(
    State(state): State<Arc<AppState<M, E>>>,
    Json(request): Json<EmotionRequest>,
) -> Result<Json<EmotionReading>, ApiError>
where
    M: InsightModel + Send + Sync + 'static,
    E: EmotionAnalyzer + Send + Sync + 'static,
{
    if request.text.trim().is_empty() {
        return Err(ApiError::BadRequest("Text is required"));
    }
    Ok(Json(analyze_or_neutral(&state.emotion, &request.text).await))
}
