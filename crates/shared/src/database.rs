//! 数据库连接管理模块
//!
//! 提供 PostgreSQL 连接来源（连接池或按需直连）以及事务作用域。
//!
//! ## 事务作用域
//!
//! [`Database::transaction`] 取得一条连接并开启事务，把 `&mut PgConnection` 交给调用方的
//! 闭包执行：
//!
//! - 闭包返回 `Ok` 时提交事务；
//! - 闭包返回 `Err` 时回滚事务，并原样返回同一个错误；
//! - 无论提交、回滚还是提交/回滚本身失败，连接都会在离开作用域前归还连接池（或关闭）。
//!
//! 两次调用 `transaction` 得到的是两条独立连接上的两个独立事务，彼此没有嵌套关系。
//! 需要在同一事务中执行多个操作时，应在同一个闭包内复用传入的连接。

use std::time::Duration;

use futures::future::BoxFuture;
use sqlx::postgres::{PgConnectOptions, PgConnection, PgPool, PgPoolOptions};
use sqlx::Connection;
use tracing::{error, info, instrument, warn};

use crate::config::DatabaseConfig;
use crate::error::Result;
use crate::observability::metrics;

/// 连接来源
#[derive(Clone)]
enum ConnectionSource {
    /// 有界连接池，连接用完后归还
    Pool(PgPool),
    /// 每个作用域新建连接，用完后关闭
    Direct(PgConnectOptions),
}

/// 数据库句柄
///
/// 由服务的组装根显式构造并注入到应用状态中，不存在进程级隐式单例。
#[derive(Clone)]
pub struct Database {
    source: ConnectionSource,
}

impl Database {
    /// 创建连接池并立即建立最小连接数
    #[instrument(skip(config), fields(url = %config.display_url()))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let pool = pool_options(config)
            .connect_with(config.connect_options())
            .await?;

        info!(
            min_connections = config.min_connections,
            max_connections = config.max_connections,
            "Database connection pool created"
        );

        Ok(Self {
            source: ConnectionSource::Pool(pool),
        })
    }

    /// 创建延迟建连的连接池，首次使用时才真正连接
    pub fn connect_lazy(config: &DatabaseConfig) -> Self {
        let pool = pool_options(config).connect_lazy_with(config.connect_options());
        Self {
            source: ConnectionSource::Pool(pool),
        }
    }

    /// 不使用连接池，每个事务作用域单独建连
    pub fn direct(config: &DatabaseConfig) -> Self {
        Self {
            source: ConnectionSource::Direct(config.connect_options()),
        }
    }

    /// 按配置选择连接池或直连
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        if config.pooled {
            Self::connect(config).await
        } else {
            info!(url = %config.display_url(), "Using direct connections (pool disabled)");
            Ok(Self::direct(config))
        }
    }

    pub fn is_pooled(&self) -> bool {
        matches!(self.source, ConnectionSource::Pool(_))
    }

    /// 在事务作用域内执行 `scope`
    ///
    /// 闭包收到的连接只在本次作用域内有效；闭包内的所有写操作要么一起提交，要么一起回滚。
    /// 闭包返回的错误不会被包装或吞掉。
    pub async fn transaction<F, T, E>(&self, scope: F) -> std::result::Result<T, E>
    where
        F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, std::result::Result<T, E>>
            + Send,
        T: Send,
        E: From<sqlx::Error> + std::fmt::Display + Send,
    {
        match &self.source {
            ConnectionSource::Pool(pool) => {
                // PoolConnection 被 drop 时自动归还连接池
                let mut conn = pool.acquire().await?;
                run_scoped(&mut *conn, scope).await
            }
            ConnectionSource::Direct(options) => {
                let mut conn = PgConnection::connect_with(options).await?;
                let outcome = run_scoped(&mut conn, scope).await;
                if let Err(e) = conn.close().await {
                    warn!(error = %e, "Failed to close direct database connection");
                }
                outcome
            }
        }
    }

    /// 健康检查
    pub async fn health_check(&self) -> Result<()> {
        self.transaction(|conn| {
            Box::pin(async move {
                sqlx::query("SELECT 1").execute(conn).await?;
                Ok(())
            })
        })
        .await
    }

    /// 关闭连接池中的全部连接
    ///
    /// 在进程退出前调用；直连模式下没有需要回收的连接。
    pub async fn close(&self) {
        if let ConnectionSource::Pool(pool) = &self.source {
            pool.close().await;
            info!("Database connection pool closed");
        }
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
        .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
}

/// 在给定连接上开启事务并执行作用域闭包
async fn run_scoped<F, T, E>(conn: &mut PgConnection, scope: F) -> std::result::Result<T, E>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, std::result::Result<T, E>> + Send,
    T: Send,
    E: From<sqlx::Error> + std::fmt::Display + Send,
{
    let mut tx = conn.begin().await?;

    match scope(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            metrics::record_db_transaction("commit");
            Ok(value)
        }
        Err(err) => {
            warn!(error = %err, "Transaction scope failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                error!(error = %rollback_err, "Rollback failed");
            }
            metrics::record_db_transaction("rollback");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ForgeError;

    fn unreachable_config() -> DatabaseConfig {
        DatabaseConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            password: "unused".to_string(),
            connect_timeout_seconds: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_direct_is_not_pooled() {
        let db = Database::direct(&unreachable_config());
        assert!(!db.is_pooled());
    }

    #[tokio::test]
    async fn test_lazy_pool_is_pooled() {
        let db = Database::connect_lazy(&unreachable_config());
        assert!(db.is_pooled());
        db.close().await;
    }

    #[tokio::test]
    async fn test_connect_failure_propagates_without_running_scope() {
        let db = Database::direct(&unreachable_config());
        let mut ran = false;

        let result: Result<()> = db
            .transaction(|_conn| {
                ran = true;
                Box::pin(async move { Ok(()) })
            })
            .await;

        assert!(matches!(result, Err(ForgeError::Database(_))));
        assert!(!ran);
    }

    #[tokio::test]
    async fn test_health_check_fails_when_unreachable() {
        let db = Database::direct(&unreachable_config());
        assert!(db.health_check().await.is_err());
    }

    #[tokio::test]
    #[ignore = "需要 PostgreSQL 数据库连接"]
    async fn test_database_connection() {
        let config = DatabaseConfig {
            password: std::env::var("POSTGRES_PASSWORD").unwrap_or_default(),
            ..Default::default()
        };
        let db = Database::connect(&config).await.unwrap();
        db.health_check().await.unwrap();
        db.close().await;
    }
}
