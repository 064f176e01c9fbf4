//! HTTP 请求处理器模块

pub mod contract_type;
pub mod system;
