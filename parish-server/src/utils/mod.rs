//! 工具模块 - 通用工具函数和类型
//!
//! - [`AppError`] - 应用错误类型
//! - [`blocking`] - 在阻塞线程池上运行存储操作
//! - 日志

pub mod error;
pub mod logger;

pub use error::{AppError, ok};

/// Application-level Result type
///
/// Used in HTTP handlers and application logic
pub type AppResult<T> = Result<T, AppError>;

/// Run synchronous store/photo I/O on the blocking pool
pub async fn blocking<T, F>(op: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op).await?
}
