//! Contract Forge 后端 API 服务入口

use contract_type_service::{routes, state::AppState};
use forge_shared::{config::AppConfig, database::Database, observability};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "contract-forge";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 仅用于本地开发，缺失时忽略
    let _ = dotenvy::dotenv();

    let config = AppConfig::load(SERVICE_NAME)?;

    let obs_config = config
        .observability
        .clone()
        .with_service_name(&config.service_name);
    let _guard = observability::init(&obs_config).await?;

    let problems = config.validate();
    for problem in &problems {
        warn!(problem = %problem, "Configuration problem");
    }
    if config.is_production() && !problems.is_empty() {
        anyhow::bail!("invalid configuration for production: {}", problems.join("; "));
    }

    info!(
        environment = %config.environment,
        database = %config.database.display_url(),
        pooled = config.database.pooled,
        "Starting {} on {}",
        config.service_name,
        config.server_addr()
    );

    let db = Database::from_config(&config.database).await?;

    let state = AppState::new(db.clone(), config.environment.clone());
    let app = routes::build_router(state, &config.cors);

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    // 收到 SIGTERM 或 Ctrl+C 后停止接收新连接，等待已有请求处理完毕
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 信号处理器注册失败时该分支永不完成，另一分支仍可触发关闭。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
