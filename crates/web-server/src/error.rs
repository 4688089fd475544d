use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] database::DbError),
    #[error("Invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("Invalid form body: {0}")]
    InvalidForm(#[from] FormRejection),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
}

/// The body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Converts our custom `AppError` into an HTTP response.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, error) = match self {
            AppError::Database(db_err) => {
                let diagnostics = db_err.diagnostics();
                tracing::error!(
                    error = %db_err,
                    code = ?diagnostics.code,
                    errno = ?diagnostics.errno,
                    "Database error."
                );
                // Prefer the server's own message over the driver's wrapper text.
                let error = diagnostics.sql_message.unwrap_or_else(|| db_err.to_string());
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Server error".to_string(),
                    Some(error),
                )
            }
            AppError::InvalidBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body".to_string(),
                Some(rejection.body_text()),
            ),
            AppError::InvalidForm(rejection) => (
                StatusCode::BAD_REQUEST,
                "Invalid request body".to_string(),
                Some(rejection.body_text()),
            ),
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, message, None),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
        };

        (status, Json(ErrorBody { message, error })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn database_errors_become_server_error() {
        let response =
            AppError::Database(database::DbError::Query(sqlx_pool_closed())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Server error");
        assert_eq!(body["error"], database::sqlx::Error::PoolClosed.to_string());
    }

    #[tokio::test]
    async fn not_found_has_no_error_field() {
        let response = AppError::NotFound("Item not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Item not found");
        assert!(body.get("error").is_none());
    }

    fn sqlx_pool_closed() -> database::sqlx::Error {
        database::sqlx::Error::PoolClosed
    }
}
