pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod routes;
pub mod seed;
pub mod serializer;
pub mod utils;

use axum::Router;
use migration::{Migrator, NewsletterMigrator};
use tokio::net::TcpListener;
use tokio::signal;

use config::{GamesConfig, NewslettersConfig, SeedConfig};
use database::{close_connection, connect_and_migrate};
use routes::{ApiContext, games::GamesState};
use seed::{SeedOptions, SeedSummary};
use serializer::{RuleTable, Serializer};
use utils::logs::{current_log_level, init_logger};

/// 由实体声明的规则加上命令行附加规则构建规则表，并校验遍历能够终止
pub fn build_serializer(exclude: &[String], max_depth: usize) -> Result<Serializer, String> {
    let raw = entity::serialize_rules()
        .map(str::to_string)
        .chain(exclude.iter().cloned());
    let rules = RuleTable::new(raw).map_err(|e| format!("序列化规则无效: {}", e))?;
    log::debug!(
        "序列化规则 {} 条，最大遍历深度 {}",
        rules.len(),
        rules.traversal_depth()
    );
    Serializer::new(rules, max_depth).map_err(|e| format!("序列化规则无效: {}", e))
}

/// 启动 games 服务
pub async fn run_games(config: GamesConfig) -> Result<(), String> {
    init_logger(config.common.log_level);
    log::info!("日志级别: {:?}", current_log_level());

    let serializer = build_serializer(&config.exclude, config.max_depth)?;
    let url = config.database_url()?;
    let db = connect_and_migrate::<Migrator>(&url)
        .await
        .map_err(|e| format!("数据库初始化失败: {}", e))?;

    let state = GamesState::new(db.clone(), serializer, !config.common.compact_json)
        .map_err(|e| format!("序列化规则无效: {}", e))?;
    let served = serve(routes::games::router(state), &config.address()).await;

    close_connection(db)
        .await
        .map_err(|e| format!("关闭数据库连接失败: {}", e))?;
    served
}

/// 启动 newsletters 服务
pub async fn run_newsletters(config: NewslettersConfig) -> Result<(), String> {
    init_logger(config.common.log_level);
    log::info!("日志级别: {:?}", current_log_level());

    let serializer = build_serializer(&[], serializer::DEFAULT_MAX_DEPTH)?;
    let url = config.database_url()?;
    let db = connect_and_migrate::<NewsletterMigrator>(&url)
        .await
        .map_err(|e| format!("数据库初始化失败: {}", e))?;

    let api = ApiContext::new(db.clone(), serializer, !config.common.compact_json);
    let served = serve(routes::newsletters::router(api), &config.address()).await;

    close_connection(db)
        .await
        .map_err(|e| format!("关闭数据库连接失败: {}", e))?;
    served
}

/// 清空并重新填充 games 数据库
pub async fn run_seed(config: SeedConfig) -> Result<SeedSummary, String> {
    init_logger(config.log_level);

    let url = config.database_url()?;
    let db = connect_and_migrate::<Migrator>(&url)
        .await
        .map_err(|e| format!("数据库初始化失败: {}", e))?;

    let options = SeedOptions {
        users: config.users,
        games: config.games,
        max_reviews_per_user: config.max_reviews_per_user,
    };
    match config.seed {
        Some(seed) => log::info!("使用随机种子 {}", seed),
        None => log::info!("未指定随机种子，结果不可复现"),
    }
    let plan = seed::plan(&options, &mut seed::rng_from_seed(config.seed));

    log::info!("开始填充数据...");
    let summary = seed::apply(&db, plan)
        .await
        .map_err(|e| format!("数据填充失败: {}", e))?;
    log::info!(
        "填充完成: {} 个用户, {} 个游戏, {} 条评测",
        summary.users,
        summary.games,
        summary.reviews
    );

    close_connection(db)
        .await
        .map_err(|e| format!("关闭数据库连接失败: {}", e))?;
    Ok(summary)
}

async fn serve(app: Router, address: &str) -> Result<(), String> {
    let listener = TcpListener::bind(address)
        .await
        .map_err(|e| format!("无法监听 {}: {}", address, e))?;
    log::info!("服务已启动: http://{}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("服务运行出错: {}", e))?;

    log::info!("服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => log::info!("收到 Ctrl+C，准备退出"),
            Err(e) => {
                log::error!("无法监听 Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                log::info!("收到 SIGTERM，准备退出");
            }
            Err(e) => {
                log::error!("无法监听 SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
