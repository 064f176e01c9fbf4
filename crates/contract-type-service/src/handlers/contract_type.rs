//! 合同类型 API 处理器
//!
//! 每个请求独占一个事务作用域：查询使用自动提交的仓储，
//! 创建使用非自动提交的仓储，由作用域统一提交或回滚。

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use validator::Validate;

use crate::{
    dto::{ApiResponse, CreateContractTypeRequest},
    error::ApiError,
    models::ContractType,
    repository::ContractTypeDao,
    state::AppState,
};

/// 获取全部启用的合同类型
///
/// GET /api/contract-type/all
pub async fn list_contract_types(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<ContractType>>>, ApiError> {
    let types = state
        .db
        .transaction(|conn| {
            Box::pin(async move {
                let mut dao = ContractTypeDao::new(conn);
                Ok::<_, ApiError>(dao.get_all(true).await?)
            })
        })
        .await?;

    Ok(Json(ApiResponse::list(types)))
}

/// 按代码获取合同类型
///
/// GET /api/contract-type/{type_code}
pub async fn get_contract_type(
    State(state): State<AppState>,
    Path(type_code): Path<String>,
) -> Result<Json<ApiResponse<ContractType>>, ApiError> {
    let lookup = type_code.clone();
    let found = state
        .db
        .transaction(|conn| {
            Box::pin(async move {
                let mut dao = ContractTypeDao::new(conn);
                Ok::<_, ApiError>(dao.get_by_code(&lookup).await?)
            })
        })
        .await?;

    let contract_type = found.ok_or(ApiError::NotFound(type_code))?;

    Ok(Json(ApiResponse::success(contract_type)))
}

/// 创建合同类型
///
/// POST /api/contract-type/
///
/// 代码已存在时返回 400，作用域回滚，不产生任何写入。
pub async fn create_contract_type(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<CreateContractTypeRequest>, ApiError>,
) -> Result<(StatusCode, Json<ApiResponse<ContractType>>), ApiError> {
    req.validate()?;

    let record = ContractType::from(req);

    let created = state
        .db
        .transaction(|conn| {
            Box::pin(async move {
                let mut dao = ContractTypeDao::with_auto_commit(conn, false);

                if dao.get_by_code(&record.type_code).await?.is_some() {
                    return Err(ApiError::AlreadyExists(record.type_code));
                }

                let type_code = record.type_code.clone();
                dao.create(record)
                    .await
                    .map_err(|e| ApiError::from_insert_failure(e, &type_code))
            })
        })
        .await?;

    info!(id = ?created.id, type_code = %created.type_code, "Contract type created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            created,
            "Contract type created successfully",
        )),
    ))
}
