use std::path::PathBuf;

use crate::auth::JwtConfig;
use crate::auth::password::hash_password;

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | data | 工作目录 |
/// | MEMBERS_FILE | {WORK_DIR}/members.json | 成员名录文件 |
/// | PHOTO_DIR | {WORK_DIR}/photos | 照片目录 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | PARISH_NAME | Sunrise Parish | 堂区名称 |
/// | ADMIN_PASSWORD_HASH | - | argon2 PHC 哈希 |
/// | ADMIN_PASSWORD | - | 明文密码，启动时哈希 |
/// | SEARCH_MIN_LENGTH | 0 | 搜索最小字符数 |
/// | BIRTHDAY_HORIZON_DAYS | 30 | 生日提醒天数 |
/// | JWT_SECRET | 随机生成 | 令牌签名密钥 |
/// | JWT_EXPIRATION_MINUTES | 480 | 令牌有效期 |
///
/// 日志相关的 `LOG_LEVEL` / `LOG_DIR` / `ENVIRONMENT` 在配置加载前由
/// [`crate::setup_environment`] 读取。
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/srv/parish HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: String,
    /// 成员名录 JSON 文件
    pub members_file: String,
    /// 照片存储目录
    pub photo_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 显示在名录摘要中的堂区名称
    pub parish_name: String,
    /// 管理员密码哈希；为空时禁止管理员登录
    pub admin_password_hash: Option<String>,
    /// 搜索生效的最小字符数
    pub search_min_length: usize,
    /// 默认生日提醒窗口 (天)
    pub birthday_horizon_days: u32,
    /// JWT 认证配置
    pub jwt: JwtConfig,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "data".into());

        Self {
            members_file: std::env::var("MEMBERS_FILE")
                .unwrap_or_else(|_| format!("{}/members.json", work_dir)),
            photo_dir: std::env::var("PHOTO_DIR")
                .unwrap_or_else(|_| format!("{}/photos", work_dir)),
            work_dir,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            parish_name: std::env::var("PARISH_NAME")
                .unwrap_or_else(|_| "Sunrise Parish".into()),
            admin_password_hash: admin_password_hash_from_env(),
            search_min_length: std::env::var("SEARCH_MIN_LENGTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(0),
            birthday_horizon_days: std::env::var("BIRTHDAY_HORIZON_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            jwt: JwtConfig::from_env(),
        }
    }

    /// 以指定工作目录构造配置，其余取默认值
    ///
    /// 常用于测试场景
    pub fn with_work_dir(work_dir: impl Into<String>, jwt: JwtConfig) -> Self {
        let work_dir = work_dir.into();
        Self {
            members_file: format!("{}/members.json", work_dir),
            photo_dir: format!("{}/photos", work_dir),
            work_dir,
            http_port: 3000,
            parish_name: "Sunrise Parish".into(),
            admin_password_hash: None,
            search_min_length: 0,
            birthday_horizon_days: 30,
            jwt,
        }
    }

    pub fn members_path(&self) -> PathBuf {
        PathBuf::from(&self.members_file)
    }

    pub fn photos_path(&self) -> PathBuf {
        PathBuf::from(&self.photo_dir)
    }

    /// 确保工作目录和照片目录存在
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        if let Some(parent) = self.members_path().parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(&self.photo_dir)
    }
}

/// `ADMIN_PASSWORD_HASH` wins over `ADMIN_PASSWORD`
fn admin_password_hash_from_env() -> Option<String> {
    if let Ok(hash) = std::env::var("ADMIN_PASSWORD_HASH")
        && !hash.trim().is_empty()
    {
        return Some(hash.trim().to_string());
    }

    let password = std::env::var("ADMIN_PASSWORD").ok()?;
    if password.is_empty() {
        return None;
    }
    match hash_password(&password) {
        Ok(hash) => Some(hash),
        Err(e) => {
            tracing::error!(error = %e, "Failed to hash ADMIN_PASSWORD, admin login disabled");
            None
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
