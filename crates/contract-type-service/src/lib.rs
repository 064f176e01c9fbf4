//! 合同类型服务
//!
//! 为合同处理自动化系统提供合同类型（销售、采购等合同分类）的 REST API。
//!
//! ## 模块结构
//!
//! - `models`: 合同类型实体
//! - `repository`: 基于借用连接的数据访问对象
//! - `dto`: 请求与响应信封
//! - `error`: API 错误与 HTTP 状态码映射
//! - `handlers`: HTTP 请求处理器
//! - `routes`: 路由与中间件装配
//! - `state`: 应用状态
//!
//! ## 技术栈
//!
//! - Web 框架：Axum
//! - 数据访问：sqlx (PostgreSQL)
//! - 数据验证：validator

pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod routes;
pub mod state;

pub use dto::{ApiResponse, CreateContractTypeRequest};
pub use error::ApiError;
pub use models::{ContractType, DefaultWorkflow};
pub use repository::ContractTypeDao;
pub use state::AppState;
