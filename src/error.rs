use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Malformed address: {0}")]
    MalformedAddress(String),

    #[error("Network unavailable: {0}")]
    NetworkUnavailable(String),

    #[error("Unsupported network: {0}")]
    UnsupportedNetwork(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code, shared by HTTP bodies and wallet failure reports.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::InvalidAddress(_) => "INVALID_ADDRESS",
            AppError::MalformedAddress(_) => "MALFORMED_ADDRESS",
            AppError::NetworkUnavailable(_) => "NETWORK_UNAVAILABLE",
            AppError::UnsupportedNetwork(_) => "UNSUPPORTED_NETWORK",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::InvalidAddress(_)
            | AppError::MalformedAddress(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Handlers answer unsupported networks with an empty 200 body; this
            // arm only covers callers that surface the error directly.
            AppError::NotFound(_) | AppError::UnsupportedNetwork(_) => StatusCode::NOT_FOUND,
            AppError::NetworkUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_address_errors_map_to_bad_request() {
        // Ensures per-wallet address errors surface as 400 when returned directly
        let response = AppError::MalformedAddress("cosmos1xyz".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = AppError::InvalidAddress("0x12".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn unsupported_network_is_a_not_found_error_body() {
        let response = AppError::UnsupportedNetwork("solana".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "UNSUPPORTED_NETWORK");
        assert!(body["error"].get("details").is_none());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            AppError::NetworkUnavailable("timeout".to_string()).code(),
            "NETWORK_UNAVAILABLE"
        );
        assert_eq!(
            AppError::UnsupportedNetwork("solana".to_string()).code(),
            "UNSUPPORTED_NETWORK"
        );
    }
}
