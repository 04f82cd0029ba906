use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Failure talking to a third-party API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Too many requests. Please try again later.")]
    RateLimited,
    #[error("Unable to connect to {0}")]
    Unreachable(&'static str),
    #[error("{0}")]
    Failed(String),
}

/// Every failure that can leave a handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("Token expired. Please login again.")]
    TokenExpired,
    #[error("{0}")]
    NotFound(&'static str),
    #[error("Insufficient credits")]
    InsufficientCredit { balance: i64 },
    #[error("{0}")]
    Conflict(String),
    #[error("Payment already processed")]
    AlreadySettled,
    #[error("Plan not found: {0}")]
    UnknownPlan(String),
    #[error("Payment not completed. Credits not added")]
    PaymentIncomplete,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error("{0}")]
    ServiceMisconfigured(&'static str),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) | AppError::UnknownPlan(_) | AppError::PaymentIncomplete => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) | AppError::TokenExpired => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientCredit { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict(_) | AppError::AlreadySettled => StatusCode::CONFLICT,
            AppError::Upstream(UpstreamError::RateLimited) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceMisconfigured(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_balance: Option<i64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Internal(e) => {
                error!(error = ?e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let credit_balance = match self {
            AppError::InsufficientCredit { balance } => Some(balance),
            _ => None,
        };
        let body = ErrorBody {
            success: false,
            message,
            credit_balance,
        };
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

/// `Json` whose rejection speaks the same envelope as every other error.
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
