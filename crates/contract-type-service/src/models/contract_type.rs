//! 合同类型实体
//!
//! 对应数据库表 `contract_types`。`id`、`created_at`、`updated_at` 由存储层分配，
//! 新建尚未入库的实体这三个字段为 `None`。

use std::fmt;

use chrono::{DateTime, Utc};
use forge_shared::error::{ForgeError, Result};
use serde::{Deserialize, Serialize};

/// 预置的工作流标识
///
/// 合同类型的 `default_workflow` 字段仍接受任意字符串，这里只列出内置流程。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DefaultWorkflow {
    /// 标准合同处理流程
    #[default]
    #[serde(rename = "standard_contract_processing")]
    Standard,
    /// 快速审批流程
    #[serde(rename = "quick_approval")]
    Quick,
    /// 严格审批流程
    #[serde(rename = "strict_approval")]
    Strict,
}

impl DefaultWorkflow {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard_contract_processing",
            Self::Quick => "quick_approval",
            Self::Strict => "strict_approval",
        }
    }
}

impl fmt::Display for DefaultWorkflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 合同类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct ContractType {
    /// 主键，由存储层分配，创建后不可变
    pub id: Option<i64>,
    /// 业务唯一键
    pub type_code: String,
    /// 展示名称
    pub type_name: String,
    pub description: Option<String>,
    /// 外部工作流定义的标识，本服务不校验其存在性
    pub default_workflow: Option<String>,
    /// false 表示已停用（软删除），默认列表中不返回
    pub is_active: bool,
    /// 仅用于展示排序
    pub sort_order: i32,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ContractType {
    /// 创建尚未入库的合同类型，默认启用、排序为 0
    pub fn new(type_code: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            id: None,
            type_code: type_code.into(),
            type_name: type_name.into(),
            description: None,
            default_workflow: None,
            is_active: true,
            sort_order: 0,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default_workflow(mut self, workflow: impl Into<String>) -> Self {
        self.default_workflow = Some(workflow.into());
        self
    }

    pub fn with_sort_order(mut self, sort_order: i32) -> Self {
        self.sort_order = sort_order;
        self
    }

    /// 返回主键；未入库的实体返回参数错误
    pub fn require_id(&self) -> Result<i64> {
        self.id.ok_or_else(|| {
            ForgeError::invalid_argument("id", "Contract type ID is required for update")
        })
    }
}

impl fmt::Display for ContractType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id {
            Some(id) => write!(
                f,
                "ContractType(id={}, code='{}', name='{}')",
                id, self.type_code, self.type_name
            ),
            None => write!(
                f,
                "ContractType(id=None, code='{}', name='{}')",
                self.type_code, self.type_name
            ),
        }
    }
}
