//! Member API 模块
//!
//! | 路径 | 方法 | 认证 |
//! |------|------|------|
//! | /api/directory | GET | 无 |
//! | /api/members | GET | 无 |
//! | /api/members/{id} | GET | 无 |
//! | /api/members | POST | 管理员 |
//! | /api/members/{id} | PUT / DELETE | 管理员 |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_admin;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/directory", get(handler::summary))
        .nest("/api/members", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：无需权限检查
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id));

    // 管理路由：需要管理员会话
    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::delete))
        .layer(middleware::from_fn(require_admin));

    read_routes.merge(manage_routes)
}
