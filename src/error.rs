use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("Time slot is fully booked")]
    CapacityExceeded,
    #[error("{0}")]
    Conflict(String),
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Infrastructure failure: {0}")]
    Infrastructure(String),
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::CapacityExceeded | Error::Conflict(_) => StatusCode::CONFLICT,
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::Infrastructure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<diesel::result::Error> for Error {
    fn from(err: diesel::result::Error) -> Self {
        Error::Infrastructure(format!("database: {err}"))
    }
}

impl From<diesel::r2d2::PoolError> for Error {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        Error::Infrastructure(format!("connection pool: {err}"))
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            Error::Infrastructure(detail) => {
                error!(%detail, "Request failed");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use test_case::test_case;

    #[test_case(Error::Unauthorized, StatusCode::UNAUTHORIZED, "Unauthorized")]
    #[test_case(Error::NotFound("Booking not found".into()), StatusCode::NOT_FOUND, "Booking not found")]
    #[test_case(Error::Validation("date is required".into()), StatusCode::BAD_REQUEST, "date is required")]
    #[test_case(Error::CapacityExceeded, StatusCode::CONFLICT, "Time slot is fully booked")]
    #[test_case(Error::MethodNotAllowed, StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")]
    #[test_case(Error::Infrastructure("password authentication failed".into()), StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")]
    #[tokio::test]
    async fn test_error_response(err: Error, status: StatusCode, message: &str) {
        let response = err.into_response();
        assert_eq!(response.status(), status);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({ "error": message }));
    }
}
