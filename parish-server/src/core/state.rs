//! 服务器状态
//!
//! 请求处理函数通过 `State<ServerState>` 共享的所有服务。克隆代价很低 (全部为 Arc)。

use std::sync::Arc;

use crate::auth::JwtService;
use crate::core::{Config, Result, ServerError};
use crate::directory::DirectoryStore;
use crate::photos::{LocalPhotoStore, PhotoStore};

#[derive(Clone, Debug)]
pub struct ServerState {
    /// 服务器配置
    pub config: Arc<Config>,
    /// 成员名录
    pub store: Arc<DirectoryStore>,
    /// 照片存储
    pub photos: Arc<dyn PhotoStore>,
    /// JWT 认证服务
    pub jwt_service: Arc<JwtService>,
}

impl ServerState {
    /// 创建服务器状态 (手动构造)
    ///
    /// 测试中用于注入内存持久化
    pub fn new(config: Config, store: DirectoryStore, photos: Arc<dyn PhotoStore>) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
            photos,
            jwt_service,
        }
    }

    /// 按配置初始化: 建目录，打开 JSON 名录，并做一次加载校验
    ///
    /// 首次加载会为缺少 id 的旧记录补写 id。
    pub fn initialize(config: &Config) -> Result<Self> {
        config
            .ensure_work_dir_structure()
            .map_err(ServerError::WorkDir)?;

        let store = DirectoryStore::open_json(config.members_path());
        let members = store.load()?;
        tracing::info!(
            members = members.len(),
            location = %config.members_file,
            "Directory loaded"
        );

        let photos: Arc<dyn PhotoStore> = Arc::new(LocalPhotoStore::new(config.photos_path()));

        if config.admin_password_hash.is_none() {
            tracing::warn!("No admin password configured, directory is read-only");
        }

        Ok(Self::new(config.clone(), store, photos))
    }
}
