use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum SnowgateError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("{0}")]
    BadRequest(String),

    #[error("image {0} not found")]
    ImageNotFound(i64),

    #[error("file {0} not found")]
    FileNotFound(String),

    #[error("multipart error: {0}")]
    Multipart(#[from] MultipartError),

    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("password hash error: {0}")]
    PasswordHash(String),
}

impl IntoResponse for SnowgateError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            SnowgateError::Unauthorized => {
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication required.".to_string(),
                };
                (StatusCode::UNAUTHORIZED, body)
            }
            SnowgateError::BadRequest(message) => {
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message,
                };
                (StatusCode::BAD_REQUEST, body)
            }
            SnowgateError::ImageNotFound(id) => {
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: format!("Image {} not found.", id),
                };
                (StatusCode::NOT_FOUND, body)
            }
            SnowgateError::FileNotFound(_) => {
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: "File not found.".to_string(),
                };
                (StatusCode::NOT_FOUND, body)
            }
            SnowgateError::Multipart(err) => {
                let body = ApiErrorBody {
                    code: "BAD_REQUEST".to_string(),
                    message: format!("Malformed upload: {}", err),
                };
                (StatusCode::BAD_REQUEST, body)
            }
            SnowgateError::Database(_) | SnowgateError::Io(_) | SnowgateError::PasswordHash(_) => {
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
