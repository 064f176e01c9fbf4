//! 合同类型仓储
//!
//! 提供 `contract_types` 表的类型化 CRUD。仓储持有一条借用的连接以及 `auto_commit` 开关：
//!
//! - `auto_commit = true`：每次写操作在自己的事务里执行并立即提交。若连接本身已处于
//!   事务作用域中，该事务退化为保存点，外层作用域依旧决定最终提交或回滚。
//! - `auto_commit = false`：写操作直接在连接上执行，提交交给外层事务作用域。
//!
//! 存储层错误（约束冲突、连接中断等）原样向上传播，仓储不做重试。

use chrono::{DateTime, Utc};
use forge_shared::error::Result;
use sqlx::postgres::{PgArguments, PgConnection, PgQueryResult};
use sqlx::query::Query;
use sqlx::{Connection, Postgres};
use tracing::debug;

use crate::models::ContractType;

const SELECT_ALL: &str = r#"
    SELECT id, type_code, type_name, description,
           default_workflow, is_active, sort_order,
           created_at, updated_at
    FROM contract_types
    ORDER BY sort_order, type_code
"#;

const SELECT_ACTIVE: &str = r#"
    SELECT id, type_code, type_name, description,
           default_workflow, is_active, sort_order,
           created_at, updated_at
    FROM contract_types
    WHERE is_active = TRUE
    ORDER BY sort_order, type_code
"#;

const SELECT_BY_CODE: &str = r#"
    SELECT id, type_code, type_name, description,
           default_workflow, is_active, sort_order,
           created_at, updated_at
    FROM contract_types
    WHERE type_code = $1
"#;

const SELECT_BY_ID: &str = r#"
    SELECT id, type_code, type_name, description,
           default_workflow, is_active, sort_order,
           created_at, updated_at
    FROM contract_types
    WHERE id = $1
"#;

/// 合同类型数据访问对象
pub struct ContractTypeDao<'c> {
    conn: &'c mut PgConnection,
    auto_commit: bool,
}

impl<'c> ContractTypeDao<'c> {
    /// 创建自动提交的仓储，适用于只读或独立写入的场景
    pub fn new(conn: &'c mut PgConnection) -> Self {
        Self::with_auto_commit(conn, true)
    }

    /// 显式指定提交策略
    pub fn with_auto_commit(conn: &'c mut PgConnection, auto_commit: bool) -> Self {
        Self { conn, auto_commit }
    }

    pub fn auto_commit(&self) -> bool {
        self.auto_commit
    }

    /// 获取全部合同类型，按 `(sort_order, type_code)` 排序
    ///
    /// `active_only` 为 true 时仅返回启用的类型。
    pub async fn get_all(&mut self, active_only: bool) -> Result<Vec<ContractType>> {
        let sql = if active_only { SELECT_ACTIVE } else { SELECT_ALL };

        let types = sqlx::query_as::<_, ContractType>(sql)
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(types)
    }

    /// 按业务代码查询，不存在时返回 `None`
    pub async fn get_by_code(&mut self, type_code: &str) -> Result<Option<ContractType>> {
        let contract_type = sqlx::query_as::<_, ContractType>(SELECT_BY_CODE)
            .bind(type_code)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(contract_type)
    }

    /// 按主键查询，不存在时返回 `None`
    pub async fn get_by_id(&mut self, id: i64) -> Result<Option<ContractType>> {
        let contract_type = sqlx::query_as::<_, ContractType>(SELECT_BY_ID)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        Ok(contract_type)
    }

    /// 新建合同类型
    ///
    /// 存储层分配的 `id`、`created_at`、`updated_at` 会回写到返回的实体上。
    pub async fn create(&mut self, mut record: ContractType) -> Result<ContractType> {
        let query = sqlx::query_as::<_, (i64, DateTime<Utc>, DateTime<Utc>)>(
            r#"
            INSERT INTO contract_types
                (type_code, type_name, description, default_workflow, is_active, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at, updated_at
            "#,
        )
        .bind(&record.type_code)
        .bind(&record.type_name)
        .bind(&record.description)
        .bind(&record.default_workflow)
        .bind(record.is_active)
        .bind(record.sort_order);

        let (id, created_at, updated_at) = if self.auto_commit {
            let mut tx = self.conn.begin().await?;
            let row = query.fetch_one(&mut *tx).await?;
            tx.commit().await?;
            row
        } else {
            query.fetch_one(&mut *self.conn).await?
        };

        record.id = Some(id);
        record.created_at = Some(created_at);
        record.updated_at = Some(updated_at);

        debug!(
            id,
            type_code = %record.type_code,
            auto_commit = self.auto_commit,
            "Contract type inserted"
        );

        Ok(record)
    }

    /// 全量更新可变字段并刷新 `updated_at`
    ///
    /// 实体必须带有 `id`，否则在访问存储前返回参数错误。
    /// 返回是否有行被更新（`id` 已不存在时为 false）。
    pub async fn update(&mut self, record: &ContractType) -> Result<bool> {
        let id = record.require_id()?;

        let query = sqlx::query(
            r#"
            UPDATE contract_types
            SET type_code = $1,
                type_name = $2,
                description = $3,
                default_workflow = $4,
                is_active = $5,
                sort_order = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $7
            "#,
        )
        .bind(&record.type_code)
        .bind(&record.type_name)
        .bind(&record.description)
        .bind(&record.default_workflow)
        .bind(record.is_active)
        .bind(record.sort_order)
        .bind(id);

        let affected = self.execute(query).await?.rows_affected();
        debug!(id, affected, "Contract type updated");

        Ok(affected > 0)
    }

    /// 物理删除，返回是否有行被删除
    pub async fn delete(&mut self, id: i64) -> Result<bool> {
        let query = sqlx::query("DELETE FROM contract_types WHERE id = $1").bind(id);

        let affected = self.execute(query).await?.rows_affected();
        debug!(id, affected, "Contract type deleted");

        Ok(affected > 0)
    }

    /// 停用（软删除）：仅将 `is_active` 置为 false 并刷新 `updated_at`
    pub async fn deactivate(&mut self, id: i64) -> Result<bool> {
        let query = sqlx::query(
            r#"
            UPDATE contract_types
            SET is_active = FALSE,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = $1
            "#,
        )
        .bind(id);

        let affected = self.execute(query).await?.rows_affected();
        debug!(id, affected, "Contract type deactivated");

        Ok(affected > 0)
    }

    /// 按提交策略执行一条写语句
    async fn execute(&mut self, query: Query<'_, Postgres, PgArguments>) -> Result<PgQueryResult> {
        if self.auto_commit {
            let mut tx = self.conn.begin().await?;
            let result = query.execute(&mut *tx).await?;
            tx.commit().await?;
            Ok(result)
        } else {
            Ok(query.execute(&mut *self.conn).await?)
        }
    }
}
