//! 日志订阅器初始化
//!
//! 基于 tracing-subscriber 组装过滤器与输出层，支持人类可读和 JSON 两种格式。
//! 配置了日志目录时，另外通过 tracing-appender 按天滚动写入应用日志与错误日志。

use std::path::Path;

use anyhow::Result;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::LevelFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use super::ObservabilityConfig;

/// 挂在 Registry 上的装箱输出层
pub type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 构建环境过滤器：RUST_LOG 优先，其次是配置的日志级别，最后回退到 info
pub fn build_env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// 构建文件输出层
///
/// - `app.<日期>.log`：与控制台相同的过滤级别
/// - `error.<日期>.log`：仅 ERROR
///
/// 写入在后台线程完成，返回的 guard 被 drop 时刷新缓冲。
pub fn build_file_layers(
    log_dir: impl AsRef<Path>,
    log_level: &str,
) -> Result<(Vec<BoxedLayer>, Vec<WorkerGuard>)> {
    let log_dir = log_dir.as_ref();
    std::fs::create_dir_all(log_dir)?;

    let app_appender = daily_appender(log_dir, "app")?;
    let error_appender = daily_appender(log_dir, "error")?;

    let (app_writer, app_guard) = tracing_appender::non_blocking(app_appender);
    let (error_writer, error_guard) = tracing_appender::non_blocking(error_appender);

    let layers = vec![
        fmt::layer()
            .with_writer(app_writer)
            .with_ansi(false)
            .with_target(true)
            .with_filter(build_env_filter(log_level))
            .boxed(),
        fmt::layer()
            .with_writer(error_writer)
            .with_ansi(false)
            .with_target(true)
            .with_filter(LevelFilter::ERROR)
            .boxed(),
    ];

    Ok((layers, vec![app_guard, error_guard]))
}

fn daily_appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender> {
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(prefix)
        .filename_suffix("log")
        .build(log_dir)?;
    Ok(appender)
}

/// 初始化全局日志订阅器
///
/// 重复初始化会返回错误，调用方只应在进程入口调用一次。
/// 返回文件写入线程的 guard，需持有到进程退出。
pub fn init(config: &ObservabilityConfig) -> Result<Vec<WorkerGuard>> {
    let console_layer = if config.json_logs {
        fmt::layer()
            .json()
            .with_span_events(FmtSpan::CLOSE)
            .with_target(true)
            .with_thread_ids(true)
            .with_filter(build_env_filter(&config.log_level))
            .boxed()
    } else {
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(true)
            .with_filter(build_env_filter(&config.log_level))
            .boxed()
    };

    let mut layers: Vec<BoxedLayer> = vec![console_layer];
    let mut guards = Vec::new();

    if let Some(dir) = &config.log_dir {
        let (file_layers, file_guards) = build_file_layers(dir, &config.log_level)?;
        layers.extend(file_layers);
        guards.extend(file_guards);
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(guards)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_log(dir: &Path, prefix: &str) -> String {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(prefix))
            .map(|entry| std::fs::read_to_string(entry.path()).unwrap())
            .collect()
    }

    #[test]
    fn test_invalid_level_falls_back() {
        // 无效级别不应 panic
        let filter = build_env_filter("not a level !!");
        let _ = filter.to_string();
    }

    #[test]
    fn test_second_init_is_rejected() {
        let config = ObservabilityConfig::default();
        let first = init(&config);
        let second = init(&config);
        // 同一进程内至多一次初始化成功
        assert!(first.is_err() || second.is_err());
    }

    #[test]
    fn test_file_layers_split_error_log() {
        let dir = tempfile::tempdir().unwrap();
        let log_dir = dir.path().join("logs");

        let (layers, guards) = build_file_layers(&log_dir, "info").unwrap();
        assert_eq!(guards.len(), 2);

        let subscriber = tracing_subscriber::registry().with(layers);
        ::tracing::subscriber::with_default(subscriber, || {
            ::tracing::info!("contract type listed");
            ::tracing::error!("database unreachable");
        });
        // drop guard 刷新后台写入线程
        drop(guards);

        let app_log = read_log(&log_dir, "app");
        assert!(app_log.contains("contract type listed"));
        assert!(app_log.contains("database unreachable"));

        let error_log = read_log(&log_dir, "error");
        assert!(error_log.contains("database unreachable"));
        assert!(!error_log.contains("contract type listed"));
    }
}
