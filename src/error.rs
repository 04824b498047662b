//! Error types for the fund query router

use axum::http::StatusCode;
use thiserror::Error;

use crate::knowledge::KnowledgeComponent;
use crate::responses::BackendError;
use crate::strategy::StrategyKind;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, RouterError>;

#[derive(Error, Debug)]
pub enum RouterError {

    // =============================
    // Routing Errors
    // =============================

    #[error("{strategy} is unavailable: {component} is not configured")]
    NotConfiguredError {
        strategy: StrategyKind,
        component: KnowledgeComponent,
    },

    #[error("{strategy} call failed: {source}")]
    UpstreamCallError {
        strategy: StrategyKind,
        #[source]
        source: BackendError,
    },

    #[error("Invalid question: {0}")]
    ValidationError(String),

    #[error("Upstream call timed out after {secs}s")]
    TimeoutError { secs: u64 },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl RouterError {
    /// Transport status the API boundary reports for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotConfiguredError { .. } => StatusCode::SERVICE_UNAVAILABLE,
            Self::UpstreamCallError { .. } => StatusCode::BAD_GATEWAY,
            Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::TimeoutError { .. } => StatusCode::GATEWAY_TIMEOUT,
            Self::ConfigError(_) | Self::SerializationError(_) | Self::IoError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable label used as the `error` field of API bodies
    pub fn label(&self) -> &'static str {
        match self {
            Self::NotConfiguredError { .. } => "service_unavailable",
            Self::UpstreamCallError { .. } => "upstream_call_failed",
            Self::ValidationError(_) => "validation_failed",
            Self::TimeoutError { .. } => "upstream_timeout",
            Self::ConfigError(_) => "configuration_error",
            Self::SerializationError(_) | Self::IoError(_) => "internal_error",
        }
    }
}
