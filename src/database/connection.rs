use std::fs;
use std::path::Path;
use std::time::Duration;

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};

/// 确保数据库文件所在目录存在
pub fn ensure_db_dir_exists(db_path: &Path) -> Result<(), String> {
    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).map_err(|e| format!("无法创建数据库目录: {}", e))?;
    }
    Ok(())
}

/// Establish a SeaORM database connection.
pub async fn establish_connection(url: &str) -> Result<DatabaseConnection, DbErr> {
    // 本地 SQLite 使用单连接即可；内存数据库也依赖这一点保持同一份数据
    let mut options = ConnectOptions::new(url.to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(cfg!(debug_assertions))
        .sqlx_logging_level(log::LevelFilter::Debug);

    log::debug!("Database connection string: {}", options.get_url());
    Database::connect(options).await
}

/// 建立连接并执行迁移 `M`
pub async fn connect_and_migrate<M: MigratorTrait>(url: &str) -> Result<DatabaseConnection, DbErr> {
    let conn = establish_connection(url).await?;
    log::info!("数据库连接建立成功");

    log::info!("开始执行数据库迁移...");
    M::up(&conn, None).await?;
    log::info!("数据库迁移完成");

    Ok(conn)
}

/// 关闭数据库连接
pub async fn close_connection(conn: DatabaseConnection) -> Result<(), DbErr> {
    conn.close().await?;
    Ok(())
}
