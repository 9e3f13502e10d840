use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use quoter_catalog::PricingError;

#[derive(Debug)]
pub enum AppError {
    /// 401 with the given reason
    AuthenticationError(String),
    /// 400 with the given reason
    ValidationError(String),
    /// 400 `{"error": "Validation failed", "message": ...}`
    RejectedInput(String),
    RateLimited,
    /// 500 with a public error label; `detail` is only logged
    OperationFailed { error: &'static str, detail: String },
    InternalServerError(String),
    Anyhow(anyhow::Error),
}

impl AppError {
    pub fn failed(error: &'static str, detail: impl std::fmt::Display) -> Self {
        AppError::OperationFailed { error, detail: detail.to_string() }
    }

    /// Engine errors as the calculate endpoint reports them
    pub fn from_pricing(err: PricingError) -> Self {
        match err {
            PricingError::Validation(e) => AppError::RejectedInput(e.to_string()),
            PricingError::UnknownCategory(_) => AppError::ValidationError(err.to_string()),
            PricingError::NonFinite(_) => AppError::failed("Calculation failed", err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, json!({ "error": msg })),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            AppError::RejectedInput(msg) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Validation failed", "message": msg }),
            ),
            AppError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                json!({ "error": "Rate limit exceeded" }),
            ),
            AppError::OperationFailed { error, detail } => {
                tracing::error!("{}: {}", error, detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": error, "message": "Internal server error" }),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": "Internal Server Error" }))
            }
        };

        (status, Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Anyhow(err.into())
    }
}
