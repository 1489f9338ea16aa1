// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::AuthError;
use crate::database::StoreError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 405 Method Not Allowed
    MethodNotAllowed(String),

    // 422 Unprocessable Entity
    UnprocessableEntity(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),

    // Any other status produced outside the handlers, e.g. 413 from the body limit
    Rejected(u16, String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::MethodNotAllowed(_) => 405,
            ApiError::UnprocessableEntity(_) => 422,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
            ApiError::Rejected(status, _) => *status,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::MethodNotAllowed(msg) => msg,
            ApiError::UnprocessableEntity(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
            ApiError::Rejected(_, msg) => msg,
        }
    }

    /// Convert to the uniform JSON error body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "error": self.status_code(),
            "message": self.message()
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn method_not_allowed() -> Self {
        ApiError::MethodNotAllowed("Method not allowed".to_string())
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        ApiError::UnprocessableEntity(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// The generic 404 used for unknown paths and unknown drink ids
    pub fn resource_not_found() -> Self {
        ApiError::not_found("Resource not found")
    }

    /// Uniform error for a status the framework produced on its own
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or("Request failed").to_string();
        match status {
            StatusCode::BAD_REQUEST => ApiError::BadRequest(reason),
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(reason),
            StatusCode::NOT_FOUND => ApiError::resource_not_found(),
            StatusCode::METHOD_NOT_ALLOWED => ApiError::method_not_allowed(),
            StatusCode::UNPROCESSABLE_ENTITY => ApiError::UnprocessableEntity(reason),
            StatusCode::INTERNAL_SERVER_ERROR => {
                ApiError::internal_server_error("Internal Server Error")
            }
            StatusCode::SERVICE_UNAVAILABLE => ApiError::ServiceUnavailable(reason),
            other => ApiError::Rejected(other.as_u16(), reason),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        if let AuthError::KeySetUnavailable(reason) = &err {
            tracing::error!("Signing keys unavailable: {}", reason);
            return ApiError::service_unavailable("Unable to verify credentials at this time");
        }
        tracing::warn!(code = err.code(), "Authorization failed: {}", err);
        ApiError::unauthorized(err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateTitle(title) => {
                ApiError::unprocessable(format!("A drink titled '{}' already exists", title))
            }
            StoreError::CorruptRecipe { id, source } => {
                tracing::error!("Stored recipe for drink {} is not valid JSON: {}", id, source);
                ApiError::internal_server_error("Internal Server Error")
            }
            StoreError::Unavailable(e) => {
                tracing::error!("Database unavailable: {}", e);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            StoreError::Sqlx(e) => {
                // Don't expose internal SQL errors to clients
                tracing::error!("SQLx error: {}", e);
                ApiError::internal_server_error("Internal Server Error")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn render(err: ApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn renders_uniform_error_body() {
        let (status, body) = render(ApiError::unprocessable("Unprocessable")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body, json!({"success": false, "error": 422, "message": "Unprocessable"}));
    }

    #[tokio::test]
    async fn auth_errors_become_401_with_description() {
        let (status, body) = render(AuthError::PermissionNotFound.into()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], 401);
        assert_eq!(body["message"], "Permission not found.");
    }

    #[tokio::test]
    async fn duplicate_title_is_unprocessable() {
        let (status, body) = render(StoreError::DuplicateTitle("water".into()).into()).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn framework_statuses_keep_their_code() {
        let (status, body) = render(ApiError::from_status(StatusCode::PAYLOAD_TOO_LARGE)).await;
        assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body,
            json!({"success": false, "error": 413, "message": "Payload Too Large"})
        );

        let (_, body) = render(ApiError::from_status(StatusCode::METHOD_NOT_ALLOWED)).await;
        assert_eq!(body["message"], "Method not allowed");
    }

    #[tokio::test]
    async fn sqlx_errors_hide_details() {
        let (status, body) = render(StoreError::Sqlx(sqlx::Error::RowNotFound).into()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal Server Error");
    }
}
