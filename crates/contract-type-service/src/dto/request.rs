//! 请求 DTO 定义

use serde::Deserialize;
use validator::Validate;

use crate::models::{ContractType, DefaultWorkflow};

fn default_workflow() -> String {
    DefaultWorkflow::default().as_str().to_string()
}

/// 创建合同类型请求
#[derive(Debug, Deserialize, Validate)]
pub struct CreateContractTypeRequest {
    #[validate(length(min = 1, max = 50, message = "合同类型代码长度必须在1-50个字符之间"))]
    pub type_code: String,
    #[validate(length(min = 1, max = 100, message = "合同类型名称长度必须在1-100个字符之间"))]
    pub type_name: String,
    pub description: Option<String>,
    #[serde(default = "default_workflow")]
    pub default_workflow: String,
}

impl From<CreateContractTypeRequest> for ContractType {
    fn from(req: CreateContractTypeRequest) -> Self {
        let contract_type = ContractType::new(req.type_code, req.type_name)
            .with_default_workflow(req.default_workflow);
        match req.description {
            Some(description) => contract_type.with_description(description),
            None => contract_type,
        }
    }
}
