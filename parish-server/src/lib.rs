//! Parish Server - 教区成员名录
//!
//! # 模块结构
//!
//! ```text
//! parish-server/src/
//! ├── core/          # 配置、状态、服务器
//! ├── auth/          # JWT 管理员会话、密码哈希
//! ├── directory/     # 成员名录存储、校验、搜索
//! ├── birthdays.rs   # 近期生日计算
//! ├── photos.rs      # 成员照片存储
//! ├── api/           # HTTP 路由和处理器
//! └── utils/         # 错误、日志
//! ```

pub mod api;
pub mod auth;
pub mod birthdays;
pub mod core;
pub mod directory;
pub mod photos;
pub mod utils;

// Re-export 公共类型
pub use auth::{AdminSession, JwtService};
pub use core::{Config, Server, ServerState};
pub use directory::{DirectoryError, DirectoryStore};
pub use photos::{LocalPhotoStore, PhotoStore};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// 加载 .env 并初始化日志
///
/// 日志级别取自 `LOG_LEVEL`，文件输出取自 `LOG_DIR`，生产环境使用 JSON 格式。
pub fn setup_environment() -> std::io::Result<()> {
    dotenv::dotenv().ok();

    let level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into());
    let log_dir = std::env::var("LOG_DIR").ok().filter(|d| !d.trim().is_empty());
    if let Some(dir) = &log_dir {
        std::fs::create_dir_all(dir)?;
    }
    let json = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");

    init_logger_with_file(Some(&level), json, log_dir.as_deref());
    Ok(())
}

pub fn print_banner() {
    println!(
        r#"
    ____             _      __
   / __ \____ ______(_)____/ /_
  / /_/ / __ `/ ___/ / ___/ __ \
 / ____/ /_/ / /  / (__  ) / / /
/_/    \__,_/_/  /_/____/_/ /_/
    "#
    );
}
