//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for [`hotelier_core::Error`] so that route
//! handlers can return `Result<T, AppError>` and use `?` on core results.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::middleware::request_id::current_request_id;

/// Wrapper so we can implement `IntoResponse` for an external type.
pub struct AppError {
    inner: hotelier_core::Error,
    request_id: Option<String>,
}

impl AppError {
    pub fn new(inner: hotelier_core::Error) -> Self {
        Self {
            inner,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, id: String) -> Self {
        self.request_id = Some(id);
        self
    }

    pub fn inner(&self) -> &hotelier_core::Error {
        &self.inner
    }
}

impl From<hotelier_core::Error> for AppError {
    fn from(e: hotelier_core::Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.inner.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let request_id = self.request_id.or_else(current_request_id);

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                error = %self.inner,
                request_id = request_id.as_deref().unwrap_or("-"),
                "Server error in API handler"
            );
        } else {
            tracing::debug!(status = %status, error = %self.inner, "Request rejected");
        }

        // 5xx details stay in the log.
        let body = json!({
            "error": self.inner.public_message(),
            "code": self.inner.code(),
            "request_id": request_id,
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn not_found_produces_404() {
        let err = AppError::new(hotelier_core::Error::not_found("hotel", 7));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn forbidden_produces_403() {
        let err = AppError::new(hotelier_core::Error::Forbidden("not yours".into()));
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn storage_produces_503() {
        let err = AppError::new(hotelier_core::Error::storage("disk full"));
        assert_eq!(err.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn validation_body_carries_message() {
        let err = AppError::new(hotelier_core::Error::validation("lat out of range"))
            .with_request_id("req-1".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], "validation_error");
        assert_eq!(body["request_id"], "req-1");
        assert!(body["error"].as_str().unwrap().contains("lat out of range"));
    }

    #[tokio::test]
    async fn server_error_body_is_generic() {
        let err = AppError::new(hotelier_core::Error::database("no such table: secrets"));
        let body = body_json(err.into_response()).await;
        assert_eq!(body["code"], "database_error");
        assert!(!body["error"].as_str().unwrap().contains("secrets"));
        assert!(body["request_id"].is_null());
    }
}
