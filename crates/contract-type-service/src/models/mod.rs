//! 实体模型模块

pub mod contract_type;

pub use contract_type::{ContractType, DefaultWorkflow};
