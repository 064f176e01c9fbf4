//! 统一错误处理模块
//!
//! 定义数据访问层共享的错误类型，使用 thiserror 提供良好的错误信息。
//! 存储层错误原样透传，不做重试或本地恢复。

use thiserror::Error;

/// 系统错误类型
#[derive(Debug, Error)]
pub enum ForgeError {
    // ==================== 数据库错误 ====================
    #[error("{0}")]
    Database(#[from] sqlx::Error),

    // ==================== 参数错误 ====================
    #[error("{message}")]
    InvalidArgument { field: String, message: String },

    // ==================== 通用错误 ====================
    #[error("内部错误: {0}")]
    Internal(String),
}

/// 错误结果类型别名
pub type Result<T> = std::result::Result<T, ForgeError>;

impl ForgeError {
    pub fn invalid_argument(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            message: message.into(),
        }
    }

    /// 获取错误码
    pub fn code(&self) -> &'static str {
        match self {
            Self::Database(_) => "DATABASE_ERROR",
            Self::InvalidArgument { .. } => "INVALID_ARGUMENT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 是否为存储层唯一约束冲突
    pub fn is_unique_violation(&self) -> bool {
        match self {
            Self::Database(e) => is_unique_violation(e),
            _ => false,
        }
    }
}

/// 判断 sqlx 错误是否来自唯一约束
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}
