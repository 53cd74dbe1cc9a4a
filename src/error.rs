use axum::{
    response::{IntoResponse, Response},
    Json,
    http::StatusCode,
};
use serde::Serialize;
use std::fmt;

#[derive(Serialize)]
pub struct ErrorResponse {
    error: String,
}

/// Which outbound collaborator a transport failure happened against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upstream {
    Scraper,
    Model,
}

impl fmt::Display for Upstream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Upstream::Scraper => f.write_str("scrape website"),
            Upstream::Model => f.write_str("reach AI service"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} is not configured")]
    MissingConfig(&'static str),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to {upstream}: {message}")]
    Transport { upstream: Upstream, message: String },

    #[error("Failed to scrape website ({status})")]
    ScrapeFailed { status: u16 },

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("AI credits exhausted. Please add funds.")]
    QuotaExhausted,

    /// The detail is for logs only; callers get the fixed message.
    #[error("AI did not return structured data")]
    SchemaViolation(String),

    #[error("AI analysis failed ({status})")]
    ExtractionFailed { status: u16 },

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn transport(upstream: Upstream, err: impl fmt::Display) -> Self {
        AppError::Transport {
            upstream,
            message: err.to_string(),
        }
    }

    /// HTTP status the caller sees for this failure.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::MissingConfig(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Transport { .. }
            | AppError::ScrapeFailed { .. }
            | AppError::SchemaViolation(_)
            | AppError::ExtractionFailed { .. } => StatusCode::BAD_GATEWAY,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::QuotaExhausted => StatusCode::PAYMENT_REQUIRED,
            AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "invalid_input",
            AppError::MissingConfig(_) | AppError::ConfigError(_) => "config",
            AppError::Transport { .. } => "transport_failure",
            AppError::ScrapeFailed { .. } => "scrape_failure",
            AppError::RateLimited => "rate_limited",
            AppError::QuotaExhausted => "quota_exhausted",
            AppError::SchemaViolation(_) => "schema_violation",
            AppError::ExtractionFailed { .. } => "extraction_failure",
            AppError::Unexpected(_) => "unexpected",
        }
    }

    /// True for failures of the page fetch stages, before extraction.
    pub fn is_upstream_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::Transport {
                upstream: Upstream::Scraper,
                ..
            } | AppError::ScrapeFailed { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
