pub mod auth;
pub mod response;

pub use auth::{extract_bearer_token, requires_auth, AuthUser, PermissionGuard};
pub use response::{json_error_fallback, not_found, panic_response, ApiResponse, ApiResult};
