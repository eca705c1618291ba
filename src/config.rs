//! 命令行 / 环境变量配置
//!
//! 三个可执行文件各有一个 clap 解析器，共享 [`CommonArgs`]。
//! 未给出数据库 URL 时，使用 review-path 解析出的默认数据文件。

use std::path::PathBuf;

use clap::{Args, Parser};

use crate::database::connection::ensure_db_dir_exists;
use crate::serializer::DEFAULT_MAX_DEPTH;
use crate::utils::logs::LogLevel;

#[derive(Debug, Clone, Args)]
pub struct CommonArgs {
    /// 监听地址
    #[arg(long, env = "GAME_REVIEWS_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// 日志级别（RUST_LOG 优先）
    #[arg(long, env = "GAME_REVIEWS_LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// 输出紧凑 JSON（默认缩进输出）
    #[arg(long, env = "GAME_REVIEWS_COMPACT_JSON")]
    pub compact_json: bool,
}

/// games 服务配置
#[derive(Debug, Clone, Parser)]
#[command(name = "game-reviews", version, about = "Game/Review/User REST API")]
pub struct GamesConfig {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, env = "GAME_REVIEWS_PORT", default_value_t = 5000)]
    pub port: u16,

    /// SQLite 连接 URL，默认使用数据目录下的 data/app.db
    #[arg(long, env = "GAME_REVIEWS_DATABASE_URL")]
    pub database_url: Option<String>,

    /// 序列化最大遍历深度
    #[arg(long, env = "GAME_REVIEWS_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// 额外的序列化排除规则，如 `review.comment`，可重复或逗号分隔
    #[arg(long = "exclude", env = "GAME_REVIEWS_EXCLUDE", value_delimiter = ',')]
    pub exclude: Vec<String>,
}

impl GamesConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.common.host, self.port)
    }

    pub fn database_url(&self) -> Result<String, String> {
        resolve_database_url(self.database_url.as_deref(), review_path::get_games_db_path)
    }
}

/// newsletters 服务配置
#[derive(Debug, Clone, Parser)]
#[command(name = "newsletters", version, about = "Newsletter REST API")]
pub struct NewslettersConfig {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long, env = "NEWSLETTERS_PORT", default_value_t = 5555)]
    pub port: u16,

    /// SQLite 连接 URL，默认使用数据目录下的 data/newsletters.db
    #[arg(long, env = "NEWSLETTERS_DATABASE_URL")]
    pub database_url: Option<String>,
}

impl NewslettersConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.common.host, self.port)
    }

    pub fn database_url(&self) -> Result<String, String> {
        resolve_database_url(
            self.database_url.as_deref(),
            review_path::get_newsletters_db_path,
        )
    }
}

/// 数据填充工具配置
#[derive(Debug, Clone, Parser)]
#[command(name = "seed", version, about = "清空并重新填充 games 数据库")]
pub struct SeedConfig {
    #[arg(long, env = "GAME_REVIEWS_DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, default_value_t = 100)]
    pub users: usize,

    #[arg(long, default_value_t = 100)]
    pub games: usize,

    /// 每个用户最多写几条评测（至少一条）
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub max_reviews_per_user: u32,

    /// 随机种子，给出时结果可复现
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, env = "GAME_REVIEWS_LOG_LEVEL", value_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl SeedConfig {
    pub fn database_url(&self) -> Result<String, String> {
        resolve_database_url(self.database_url.as_deref(), review_path::get_games_db_path)
    }
}

/// 显式给出的 URL 优先；否则解析默认文件路径并确保目录存在
fn resolve_database_url(
    explicit: Option<&str>,
    default_path: fn() -> Result<PathBuf, String>,
) -> Result<String, String> {
    if let Some(url) = explicit.filter(|url| !url.trim().is_empty()) {
        return Ok(url.to_string());
    }

    let db_path = default_path()?;
    ensure_db_dir_exists(&db_path)?;
    log::info!("使用数据库文件: {}", db_path.display());
    review_path::path_to_sqlite_url(&db_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn games_defaults() {
        let config = GamesConfig::try_parse_from(["game-reviews"]).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.exclude.is_empty());
        assert!(!config.common.compact_json);
    }

    #[test]
    fn exclude_accepts_comma_separated_rules() {
        let config = GamesConfig::try_parse_from([
            "game-reviews",
            "--exclude",
            "review.comment,user.created_at",
            "--exclude",
            "game.price",
        ])
        .unwrap();
        assert_eq!(
            config.exclude,
            vec!["review.comment", "user.created_at", "game.price"]
        );
    }

    #[test]
    fn explicit_database_url_wins() {
        let config = NewslettersConfig::try_parse_from([
            "newsletters",
            "--database-url",
            "sqlite::memory:",
            "--port",
            "6000",
        ])
        .unwrap();
        assert_eq!(config.database_url().unwrap(), "sqlite::memory:");
        assert_eq!(config.address(), "127.0.0.1:6000");
    }

    #[test]
    fn seed_requires_at_least_one_review() {
        assert!(SeedConfig::try_parse_from(["seed", "--max-reviews-per-user", "0"]).is_err());
        let config = SeedConfig::try_parse_from(["seed", "--seed", "42"]).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.users, 100);
    }
}
