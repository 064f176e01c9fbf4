//! 数据库仓储层
//!
//! 封装 `contract_types` 表的 SQL 操作。
//!
//! ## 设计原则
//!
//! - 仓储只负责数据持久化，不包含业务逻辑
//! - 仓储借用调用方提供的连接，不自行获取或释放连接
//! - 是否由仓储自行提交由 `auto_commit` 决定；在事务作用域内写入时应关闭它，交由作用域统一提交

mod contract_type_repo;

pub use contract_type_repo::ContractTypeDao;
