//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 数据库配置
///
/// 连接参数对连接管理器而言是不透明值，只在构造 `PgConnectOptions` 时使用。
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    /// 是否使用连接池；关闭时每个事务作用域单独建立并关闭连接
    pub pooled: bool,
    pub min_connections: u32,
    pub max_connections: u32,
    pub connect_timeout_seconds: u64,
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            database: "contract_forge".to_string(),
            user: "admin".to_string(),
            password: String::new(),
            pooled: true,
            min_connections: 1,
            max_connections: 10,
            connect_timeout_seconds: 30,
            idle_timeout_seconds: 600,
        }
    }
}

impl DatabaseConfig {
    /// 构造 PostgreSQL 连接参数
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }

    /// 用于日志输出的连接串，密码以 `****` 遮蔽
    pub fn display_url(&self) -> String {
        format!(
            "postgres://{}:****@{}:{}/{}",
            self.user, self.host, self.port, self.database
        )
    }
}

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// 跨域配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// 允许的来源列表，`*` 表示全部放行
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl CorsConfig {
    pub fn allows_any(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// 应用配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub observability: ObservabilityConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_name: "contract-forge".to_string(),
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            cors: CorsConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. config/default.toml（默认配置）
    /// 2. config/{environment}.toml（环境特定配置）
    /// 3. config/{service_name}.toml（服务特定配置）
    /// 4. 环境变量（FORGE__ 前缀，如 FORGE__DATABASE__HOST -> database.host）
    /// 5. 部署沿用的 ENVIRONMENT / POSTGRES_* / API_* / LOG_LEVEL / LOG_DIR 环境变量
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        Self::load_with(service_name, |key| std::env::var(key).ok())
    }

    /// 与 [`AppConfig::load`] 相同，但 FORGE_ENV、CONFIG_DIR 与部署变量通过 `lookup` 读取
    ///
    /// 环境名取 FORGE_ENV，其次 ENVIRONMENT，缺省为 development。
    pub fn load_with<F>(service_name: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = lookup("FORGE_ENV")
            .or_else(|| lookup("ENVIRONMENT"))
            .map(|e| e.to_lowercase())
            .unwrap_or_else(|| "development".to_string());

        let config_dir = lookup("CONFIG_DIR").unwrap_or_else(|| "config".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(Path::new(&config_dir).join("default.toml")).required(false))
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", env))).required(false),
            )
            .add_source(
                File::from(Path::new(&config_dir).join(format!("{}.toml", service_name)))
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("FORGE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors.allowed_origins")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;
        config.apply_overrides(lookup);

        Ok(config)
    }

    /// 应用部署环境中约定俗成的变量名
    ///
    /// `lookup` 抽象了环境变量读取，便于测试注入。无法解析的端口值会被忽略。
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(environment) = lookup("ENVIRONMENT") {
            self.environment = environment.to_lowercase();
        }
        if let Some(host) = lookup("POSTGRES_HOST") {
            self.database.host = host;
        }
        if let Some(port) = lookup("POSTGRES_PORT").and_then(|v| v.parse().ok()) {
            self.database.port = port;
        }
        if let Some(db) = lookup("POSTGRES_DB") {
            self.database.database = db;
        }
        if let Some(user) = lookup("POSTGRES_USER") {
            self.database.user = user;
        }
        if let Some(password) = lookup("POSTGRES_PASSWORD") {
            self.database.password = password;
        }
        if let Some(host) = lookup("API_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("API_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.observability.log_level = level.to_lowercase();
        }
        if let Some(dir) = lookup("LOG_DIR") {
            self.observability.log_dir = Some(dir);
        }
    }

    /// 校验配置，返回全部问题描述；为空表示通过
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.database.password.is_empty() {
            errors.push("database.password 未设置".to_string());
        }

        if self.database.min_connections > self.database.max_connections {
            errors.push(format!(
                "database.min_connections ({}) 大于 max_connections ({})",
                self.database.min_connections, self.database.max_connections
            ));
        }

        if self.is_production() && self.cors.allows_any() {
            errors.push("生产环境不允许 cors.allowed_origins 使用通配符".to_string());
        }

        errors
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    pub fn is_testing(&self) -> bool {
        self.environment.eq_ignore_ascii_case("testing")
    }
}
