//! REST API Server for the fund query router
//!
//! Exposes the dispatcher via HTTP endpoints
//! Integrates with the fund screener frontend

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, info_span, warn, Instrument};

use crate::dispatcher::Dispatcher;
use crate::error::RouterError;
use crate::models::Question;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub images: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
}

impl IntoResponse for RouterError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), "Request failed: {}", self);
        } else {
            info!(status = status.as_u16(), "Request rejected: {}", self);
        }

        let body = ErrorBody {
            error: self.label().to_string(),
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub dispatcher: Arc<Dispatcher>,
    pub request_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct ApiOptions {
    pub request_timeout: Duration,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ApiOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(crate::config::DEFAULT_REQUEST_TIMEOUT_SECS),
            cors_allowed_origins: vec![],
        }
    }
}

/// =============================
/// Health Endpoints
/// =============================

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Fund query router is running",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "healthy"
    }))
}

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    let knowledge = state.dispatcher.knowledge();

    Json(serde_json::json!({
        "status": "healthy",
        "files_configured": knowledge.is_fully_configured(),
        "routing_mode": state.dispatcher.mode(),
        "data_sources": {
            "documents": knowledge.vector_store_id().is_some(),
            "csv_returns": knowledge.returns().is_some(),
            "csv_metadata": knowledge.metadata().is_some(),
        },
        "fingerprints": {
            "returns": knowledge.returns_fingerprint(),
            "metadata": knowledge.metadata_fingerprint(),
        },
        "capabilities": [
            "Document search and analysis",
            "Fund metadata queries",
            "Financial metrics calculations",
            "Hybrid analysis (documents + calculations)"
        ],
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Ask Endpoint
/// =============================

async fn ask(
    State(state): State<ApiState>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, RouterError> {
    let Json(req) = payload.map_err(|e| RouterError::ValidationError(e.body_text()))?;
    let question = Question::new(req.question)?;

    let span = info_span!("ask", request_id = %uuid::Uuid::new_v4());
    let timeout = state.request_timeout;

    async move {
        info!(question = %question.preview(), "Received question");

        let routed = tokio::time::timeout(timeout, state.dispatcher.answer(&question))
            .await
            .map_err(|_| {
                warn!(secs = timeout.as_secs(), "Question timed out");
                RouterError::TimeoutError {
                    secs: timeout.as_secs(),
                }
            })??;

        info!(
            intent = %routed.intent,
            strategy = %routed.strategy,
            images = routed.answer.images.len(),
            "Question answered"
        );

        Ok::<_, RouterError>(Json(AskResponse {
            answer: routed.answer.text,
            images: routed.answer.images,
        }))
    }
    .instrument(span)
    .await
}

/// =============================
/// Router
/// =============================

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

pub fn create_router(dispatcher: Arc<Dispatcher>, options: ApiOptions) -> Router {
    let state = ApiState {
        dispatcher,
        request_timeout: options.request_timeout,
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/ask", post(ask))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&options.cors_allowed_origins))
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    dispatcher: Arc<Dispatcher>,
    options: ApiOptions,
    address: &str,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(dispatcher, options);

    let listener = tokio::net::TcpListener::bind(address).await?;

    info!("API Server listening on http://{}", address);

    axum::serve(listener, router).await?;

    Ok(())
}
