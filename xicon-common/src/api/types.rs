//! Shared API request/response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error body returned by every failing route
///
/// # Examples
///
/// ```
/// use xicon_common::api::types::ErrorResponse;
///
/// let body = serde_json::to_string(&ErrorResponse::new("Unauthorized")).unwrap();
/// assert_eq!(body, r#"{"error":"Unauthorized"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

/// POST /api/auth/login body
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Session handed back on successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub token: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Generic success acknowledgement (`{"success": true}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Response to a public submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub message: String,
    pub id: i64,
}
