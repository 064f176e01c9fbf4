//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use forge_shared::{config::CorsConfig, observability::middleware as obs_middleware};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::{handlers, state::AppState};

/// 合同类型路由
///
/// 创建接口同时接受带与不带尾部斜杠的路径
pub fn contract_type_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contract-type/all",
            get(handlers::contract_type::list_contract_types),
        )
        .route(
            "/contract-type/",
            post(handlers::contract_type::create_contract_type),
        )
        .route(
            "/contract-type",
            post(handlers::contract_type::create_contract_type),
        )
        .route(
            "/contract-type/{type_code}",
            get(handlers::contract_type::get_contract_type),
        )
}

fn info_routes() -> Router<AppState> {
    Router::new().route("/info", get(handlers::system::api_info))
}

/// 组装 /api 前缀下的全部路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(contract_type_routes())
        .merge(info_routes())
}

/// 构建 CORS 层
///
/// 配置中包含 `*` 时放开所有来源；否则只接受可解析的来源，非法条目跳过并告警。
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if config.allows_any() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    layer.allow_origin(origins).allow_credentials(true)
}

/// 构建完整应用路由
///
/// 中间件执行顺序（外层先执行）：CORS → request_id → http_tracing → handler
pub fn build_router(state: AppState, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .nest("/api", api_routes())
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .layer(cors_layer(cors))
        .with_state(state)
}
