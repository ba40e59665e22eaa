use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use stockfolio_core::portfolio::PortfolioError;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    Portfolio(PortfolioError),
}

impl From<PortfolioError> for ApiError {
    fn from(error: PortfolioError) -> Self {
        Self::Portfolio(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Authentication required".to_string(),
            ),
            ApiError::Portfolio(error) => {
                let status = match &error {
                    PortfolioError::NotFound | PortfolioError::LotNotFound => {
                        StatusCode::NOT_FOUND
                    }
                    PortfolioError::DuplicateName | PortfolioError::RefreshInProgress => {
                        StatusCode::CONFLICT
                    }
                    PortfolioError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                    PortfolioError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, error.to_string())
            }
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {}", message);
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
