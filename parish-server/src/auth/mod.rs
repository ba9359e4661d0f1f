//! 认证授权模块
//!
//! - [`JwtService`] - JWT 令牌服务
//! - [`AdminSession`] - 当前管理员会话
//! - [`resolve_session`] - 会话解析中间件
//! - [`require_admin`] - 管理员检查中间件
//! - [`password`] - argon2 密码哈希

pub mod jwt;
pub mod middleware;
pub mod password;

pub use jwt::{AdminSession, Claims, JwtConfig, JwtError, JwtService};
pub use middleware::{require_admin, resolve_session};
