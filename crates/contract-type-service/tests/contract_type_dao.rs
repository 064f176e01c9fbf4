//! 合同类型仓储集成测试
//!
//! 需要可访问的 PostgreSQL，连接参数读取 POSTGRES_HOST / POSTGRES_PORT / POSTGRES_DB /
//! POSTGRES_USER / POSTGRES_PASSWORD。运行方式：`cargo test -- --ignored`

use axum::http::StatusCode;
use contract_type_service::{ApiError, ContractType, ContractTypeDao, DefaultWorkflow};
use forge_shared::{config::AppConfig, database::Database, error::ForgeError};
use sqlx::{Connection, PgConnection};

const SCHEMA: &str = include_str!("../migrations/0001_contract_types.sql");

async fn setup() -> (Database, PgConnection) {
    let mut config = AppConfig::default();
    config.apply_overrides(|key| std::env::var(key).ok());

    let mut conn = PgConnection::connect_with(&config.database.connect_options())
        .await
        .expect("连接测试数据库失败");
    sqlx::raw_sql(SCHEMA)
        .execute(&mut conn)
        .await
        .expect("初始化表结构失败");

    let db = Database::connect(&config.database)
        .await
        .expect("创建连接池失败");

    (db, conn)
}

/// 生成不会与其他测试冲突的类型代码
fn unique_code(prefix: &str) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}", prefix, &suffix[..12])
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_created_record_is_resolvable_by_id() {
    let (_db, mut conn) = setup().await;
    let code = unique_code("SALES");

    let mut dao = ContractTypeDao::new(&mut conn);
    let created = dao
        .create(
            ContractType::new(&code, "销售合同")
                .with_default_workflow(DefaultWorkflow::Quick.as_str()),
        )
        .await
        .unwrap();

    let id = created.id.expect("创建后应回写 id");
    assert!(created.created_at.is_some());

    let fetched = dao.get_by_id(id).await.unwrap().expect("应能按 id 查到");
    assert_eq!(fetched.type_code, code);
    assert_eq!(fetched.type_name, "销售合同");
    assert_eq!(fetched.default_workflow.as_deref(), Some("quick_approval"));

    let by_code = dao.get_by_code(&code).await.unwrap().expect("应能按代码查到");
    assert_eq!(by_code.id, Some(id));

    assert!(dao.delete(id).await.unwrap());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_get_by_code_absent_is_none() {
    let (_db, mut conn) = setup().await;
    let mut dao = ContractTypeDao::new(&mut conn);
    assert!(dao.auto_commit());

    let result = dao.get_by_code(&unique_code("NOPE")).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_update_without_id_never_reaches_storage() {
    let (_db, mut conn) = setup().await;
    let mut dao = ContractTypeDao::new(&mut conn);

    let err = dao
        .update(&ContractType::new("ANY", "任意"))
        .await
        .unwrap_err();
    assert!(matches!(err, ForgeError::InvalidArgument { .. }));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_update_replaces_mutable_fields() {
    let (_db, mut conn) = setup().await;
    let code = unique_code("PURCHASE");

    let mut dao = ContractTypeDao::new(&mut conn);
    let mut record = dao
        .create(ContractType::new(&code, "采购合同").with_description("旧描述"))
        .await
        .unwrap();
    let id = record.id.unwrap();

    record.type_name = "采购合同（新）".to_string();
    record.description = None;
    record.sort_order = 7;
    assert!(dao.update(&record).await.unwrap());

    let fetched = dao.get_by_id(id).await.unwrap().unwrap();
    assert_eq!(fetched.type_name, "采购合同（新）");
    assert!(fetched.description.is_none());
    assert_eq!(fetched.sort_order, 7);
    assert!(fetched.updated_at >= record.updated_at);

    assert!(dao.delete(id).await.unwrap());
    // 已不存在的 id 更新返回 false
    assert!(!dao.update(&record).await.unwrap());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_deactivate_hides_from_active_listing() {
    let (_db, mut conn) = setup().await;
    let code = unique_code("LEASE");

    let mut dao = ContractTypeDao::new(&mut conn);
    let id = dao
        .create(ContractType::new(&code, "租赁合同"))
        .await
        .unwrap()
        .id
        .unwrap();

    assert!(dao.deactivate(id).await.unwrap());

    let active = dao.get_all(true).await.unwrap();
    assert!(active.iter().all(|t| t.id != Some(id)));

    let all = dao.get_all(false).await.unwrap();
    let hidden = all.iter().find(|t| t.id == Some(id)).expect("停用后仍应可见");
    assert!(!hidden.is_active);

    assert!(dao.delete(id).await.unwrap());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_delete_then_absent() {
    let (_db, mut conn) = setup().await;
    let code = unique_code("SERVICE");

    let mut dao = ContractTypeDao::new(&mut conn);
    let id = dao
        .create(ContractType::new(&code, "服务合同"))
        .await
        .unwrap()
        .id
        .unwrap();

    assert!(dao.delete(id).await.unwrap());
    assert!(dao.get_by_id(id).await.unwrap().is_none());
    assert!(!dao.delete(id).await.unwrap());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_get_all_is_idempotent_and_ordered() {
    let (_db, mut conn) = setup().await;
    let mut dao = ContractTypeDao::new(&mut conn);

    let first = dao.get_all(false).await.unwrap();
    let second = dao.get_all(false).await.unwrap();
    assert_eq!(first, second);

    // type_code 的次序取决于数据库排序规则，这里只校验主排序键
    assert!(first.windows(2).all(|w| w[0].sort_order <= w[1].sort_order));
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_failed_scope_rolls_back_writes() {
    let (db, mut conn) = setup().await;
    let code = unique_code("ROLLBACK");

    let scope_code = code.clone();
    let result: Result<(), ForgeError> = db
        .transaction(|conn| {
            Box::pin(async move {
                let mut dao = ContractTypeDao::with_auto_commit(conn, false);
                dao.create(ContractType::new(&scope_code, "回滚测试")).await?;
                Err(ForgeError::Internal("写入之后失败".to_string()))
            })
        })
        .await;

    assert!(matches!(result, Err(ForgeError::Internal(_))));

    let mut dao = ContractTypeDao::new(&mut conn);
    assert!(dao.get_by_code(&code).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_auto_commit_write_inside_failed_scope_is_rolled_back() {
    let (db, mut conn) = setup().await;
    let code = unique_code("SAVEPOINT");

    let scope_code = code.clone();
    let result: Result<(), ForgeError> = db
        .transaction(|conn| {
            Box::pin(async move {
                // 作用域内的自动提交退化为保存点，外层回滚依旧生效
                let mut dao = ContractTypeDao::new(conn);
                dao.create(ContractType::new(&scope_code, "保存点测试")).await?;
                Err(ForgeError::Internal("写入之后失败".to_string()))
            })
        })
        .await;

    assert!(result.is_err());

    let mut dao = ContractTypeDao::new(&mut conn);
    assert!(dao.get_by_code(&code).await.unwrap().is_none());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_successful_scope_commits() {
    let (db, mut conn) = setup().await;
    let code = unique_code("COMMIT");

    let scope_code = code.clone();
    let created = db
        .transaction(|conn| {
            Box::pin(async move {
                let mut dao = ContractTypeDao::with_auto_commit(conn, false);
                dao.create(ContractType::new(&scope_code, "提交测试")).await
            })
        })
        .await
        .unwrap();

    let mut dao = ContractTypeDao::new(&mut conn);
    let fetched = dao.get_by_code(&code).await.unwrap().expect("提交后应可见");
    assert_eq!(fetched.id, created.id);

    assert!(dao.delete(created.id.unwrap()).await.unwrap());
}

#[tokio::test]
#[ignore = "需要 PostgreSQL 数据库连接"]
async fn test_duplicate_code_violates_unique_constraint() {
    let (_db, mut conn) = setup().await;
    let code = unique_code("DUP");

    let mut dao = ContractTypeDao::new(&mut conn);
    let id = dao
        .create(ContractType::new(&code, "重复测试"))
        .await
        .unwrap()
        .id
        .unwrap();

    let err = dao
        .create(ContractType::new(&code, "重复测试"))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation());

    // 唯一约束冲突映射为 400 的重复错误，而不是 500
    let api_err = ApiError::from_insert_failure(err, &code);
    assert!(matches!(api_err, ApiError::AlreadyExists(_)));
    assert_eq!(api_err.status_code(), StatusCode::BAD_REQUEST);
    let message = api_err.to_string();
    assert!(message.contains(&code));
    assert!(message.contains("already exists"));

    assert!(dao.delete(id).await.unwrap());
}
