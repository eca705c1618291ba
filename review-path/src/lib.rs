use std::path::{Path, PathBuf};

/// 数据库相关路径常量
pub const DB_DATA_DIR: &str = "data";
pub const GAMES_DB_FILE_NAME: &str = "app.db";
pub const NEWSLETTERS_DB_FILE_NAME: &str = "newsletters.db";
pub const RESOURCE_DIR: &str = "resources";

/// 判断是否处于便携模式
///
/// 检测逻辑：检查可执行文件同级目录下是否存在 resources/data/<db_file>
pub fn is_portable_mode(db_file: &str) -> bool {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let portable_data_dir = exe_dir.join(RESOURCE_DIR).join(DB_DATA_DIR);
            return portable_data_dir.join(db_file).exists();
        }
    }
    false
}

/// 获取基础数据目录
pub fn get_base_data_dir(db_file: &str) -> Result<PathBuf, String> {
    if is_portable_mode(db_file) {
        let exe_path =
            std::env::current_exe().map_err(|e| format!("无法获取可执行文件路径: {}", e))?;
        let exe_dir = exe_path
            .parent()
            .ok_or_else(|| "无法获取可执行文件父目录".to_string())?;
        Ok(exe_dir.join(RESOURCE_DIR))
    } else {
        get_system_data_dir()
    }
}

/// 获取系统数据目录（跨平台）
fn get_system_data_dir() -> Result<PathBuf, String> {
    use directories::BaseDirs;

    let base_dirs = BaseDirs::new().ok_or_else(|| "无法获取系统目录信息".to_string())?;

    #[cfg(any(target_os = "windows", target_os = "macos"))]
    {
        Ok(base_dirs.data_dir().join("com.game-reviews.dev"))
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        Ok(base_dirs.data_dir().join("game-reviews"))
    }
}

/// 获取游戏/评测/用户数据库文件路径
pub fn get_games_db_path() -> Result<PathBuf, String> {
    Ok(get_base_data_dir(GAMES_DB_FILE_NAME)?
        .join(DB_DATA_DIR)
        .join(GAMES_DB_FILE_NAME))
}

/// 获取 newsletter 数据库文件路径
pub fn get_newsletters_db_path() -> Result<PathBuf, String> {
    Ok(get_base_data_dir(NEWSLETTERS_DB_FILE_NAME)?
        .join(DB_DATA_DIR)
        .join(NEWSLETTERS_DB_FILE_NAME))
}

/// 将文件路径转换为 sqlite 连接 URL（`mode=rwc` 允许首次启动时创建文件）
pub fn path_to_sqlite_url(path: &Path) -> Result<String, String> {
    let db_url = url::Url::from_file_path(path)
        .map_err(|_| format!("Invalid database path: {}", path.display()))?;
    Ok(format!("sqlite:{}?mode=rwc", db_url.path()))
}
