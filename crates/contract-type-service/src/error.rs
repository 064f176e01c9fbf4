//! API 错误类型定义
//!
//! API 层是唯一把内部错误翻译为 HTTP 状态码的地方：
//! 业务预期内的情况（不存在、重复）映射为 404 / 400，其余一律 500 并携带底层错误信息。

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use forge_shared::error::ForgeError;

use crate::dto::response::ErrorResponse;

/// API 错误类型
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Contract type '{0}' not found")]
    NotFound(String),
    #[error("Contract type '{0}' already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AlreadyExists(_) | Self::Validation(_) | Self::InvalidArgument(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于日志）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidArgument(_) => "INVALID_ARGUMENT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 插入失败的翻译
    ///
    /// 预检查与插入之间并非原子，并发的重复插入由存储层唯一约束兜底，
    /// 这里把约束冲突同样映射为重复错误。
    pub fn from_insert_failure(err: ForgeError, type_code: &str) -> Self {
        if err.is_unique_violation() {
            Self::AlreadyExists(type_code.to_string())
        } else {
            err.into()
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            Self::Database(e) => {
                tracing::error!(error = %e, code = self.error_code(), "数据库操作失败")
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, code = self.error_code(), "内部错误")
            }
            other => tracing::warn!(
                status = status.as_u16(),
                code = other.error_code(),
                error = %other,
                "请求处理失败"
            ),
        }

        (status, axum::Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

impl From<ForgeError> for ApiError {
    fn from(err: ForgeError) -> Self {
        match err {
            ForgeError::Database(e) => Self::Database(e),
            ForgeError::InvalidArgument { message, .. } => Self::InvalidArgument(message),
            ForgeError::Internal(message) => Self::Internal(message),
        }
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 请求体解析失败（JSON 格式错误、缺少字段等）
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}
