//! 应用状态定义
//!
//! 包含 Axum 路由共享的应用状态

use forge_shared::database::Database;

/// Axum 应用共享状态
///
/// `Database` 内部是连接池句柄或直连参数，clone 开销很小
#[derive(Clone)]
pub struct AppState {
    /// 数据库访问入口
    pub db: Database,
    /// 运行环境（development / testing / production）
    pub environment: String,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(db: Database, environment: impl Into<String>) -> Self {
        Self {
            db,
            environment: environment.into(),
        }
    }
}
