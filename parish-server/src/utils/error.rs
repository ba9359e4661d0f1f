//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`ok`] - 成功响应
//!
//! # 错误码规范
//!
//! | 前缀 | 分类 | 示例 |
//! |------|------|------|
//! | E0xxx | 业务错误 | E0002 验证失败, E0003 不存在 |
//! | E2xxx | 权限错误 | E2001 无权限 |
//! | E3xxx | 认证令牌错误 | E3001 未登录, E3002 无效令牌 |
//! | E9xxx | 系统错误 | E9001 内部错误, E9002 存储错误 |

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::ApiResponse;
use tracing::error;

use crate::directory::DirectoryError;
use crate::photos::PhotoError;

/// 应用错误枚举
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 认证错误 (4xx) ==========
    #[error("Authentication required")]
    /// 未登录 (401)
    Unauthorized,

    #[error("Token expired")]
    /// 令牌过期 (401)
    TokenExpired,

    #[error("Invalid token")]
    /// 无效令牌 (401)
    InvalidToken,

    #[error("Permission denied: {0}")]
    /// 无权限 (403)
    Forbidden(String),

    // ========== 业务逻辑错误 (4xx) ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Validation failed: {message}")]
    /// 验证失败 (400), 附带出错字段
    Validation { message: String, fields: Vec<String> },

    #[error("Invalid request: {0}")]
    /// 无效请求 (400)
    Invalid(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Storage error: {0}")]
    /// 持久化错误 (500)
    Storage(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

#[derive(Serialize)]
struct FieldErrors {
    fields: Vec<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "E3001", "Please login first"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "E3002", "Invalid token"),
            AppError::TokenExpired => (StatusCode::UNAUTHORIZED, "E3003", "Token expired"),

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.as_str()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.as_str()),

            // Validation (400)
            AppError::Validation { message, fields } => {
                let body = ApiResponse::error_with_data(
                    "E0002",
                    message.clone(),
                    FieldErrors {
                        fields: fields.clone(),
                    },
                );
                return (StatusCode::BAD_REQUEST, Json(body)).into_response();
            }

            // Invalid request (400)
            AppError::Invalid(msg) => (StatusCode::BAD_REQUEST, "E0006", msg.as_str()),

            // Storage errors (500)
            AppError::Storage(msg) => {
                error!(target: "storage", error = %msg, "Storage error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Storage error")
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error",
                )
            }
        };

        let body = Json(ApiResponse::<()>::error(code, message));
        (status, body).into_response()
    }
}

// ========== Conversions ==========

impl From<DirectoryError> for AppError {
    fn from(e: DirectoryError) -> Self {
        match e {
            DirectoryError::Validation { fields, message } => {
                AppError::Validation { message, fields }
            }
            DirectoryError::NotFound(id) => AppError::NotFound(format!("Member {id}")),
            DirectoryError::Persistence(e) => AppError::Storage(e.to_string()),
        }
    }
}

impl From<PhotoError> for AppError {
    fn from(e: PhotoError) -> Self {
        match e {
            PhotoError::Empty | PhotoError::TooLarge(_) | PhotoError::UnsupportedFormat(_) => {
                AppError::Validation {
                    message: e.to_string(),
                    fields: vec!["photo".to_string()],
                }
            }
            PhotoError::InvalidReference(_) => AppError::Invalid(e.to_string()),
            PhotoError::Io(e) => AppError::Storage(e.to_string()),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::Invalid(format!("Multipart error: {}", e))
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(e: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("Blocking task failed: {}", e))
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound(resource.into())
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    /// Unified message for a wrong admin password
    pub fn invalid_credentials() -> Self {
        Self::Invalid("Invalid password".to_string())
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse::ok(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::PersistenceError;

    #[test]
    fn test_directory_errors_map_to_status() {
        let cases = [
            (
                AppError::from(DirectoryError::Validation {
                    fields: vec!["name".into()],
                    message: "name must not be empty".into(),
                }),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(DirectoryError::NotFound(9)),
                StatusCode::NOT_FOUND,
            ),
            (
                AppError::from(DirectoryError::Persistence(PersistenceError::Backend(
                    "boom".into(),
                ))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_photo_format_error_names_photo_field() {
        match AppError::from(PhotoError::UnsupportedFormat("gif".into())) {
            AppError::Validation { fields, .. } => assert_eq!(fields, vec!["photo".to_string()]),
            other => panic!("unexpected {other:?}"),
        }
    }
}
