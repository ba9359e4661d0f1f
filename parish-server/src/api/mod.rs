//! API 路由模块
//!
//! - [`health`] - 健康检查
//! - [`auth`] - 管理员登录
//! - [`members`] - 成员名录
//! - [`photos`] - 成员照片
//! - [`birthdays`] - 近期生日

pub mod convert;

pub mod auth;
pub mod birthdays;
pub mod health;
pub mod members;
pub mod photos;

use axum::Router;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::auth::resolve_session;
use crate::core::ServerState;

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build a router with all routes registered (no middleware, no state)
pub fn build_router() -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(health::router())
        // Auth API - public login
        .merge(auth::router())
        // Members API - reads public, writes admin
        .merge(members::router())
        // Photos API - serve public, upload admin
        .merge(photos::router())
        // Birthdays API - public
        .merge(birthdays::router())
}

/// Build a fully configured application with all middleware
pub fn build_app(state: &ServerState) -> Router<ServerState> {
    health::mark_start();

    build_router()
        // Session - resolves bearer token into AdminSession before routes run
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            resolve_session,
        ))
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // Trace - Request tracing (logs at INFO level)
        .layer(TraceLayer::new_for_http())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            "x-request-id",
        )))
        // Request ID - outermost, so the trace span sees it
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static("x-request-id"),
            XRequestId,
        ))
}

/// Application with state applied, ready for `axum::serve` or `oneshot`
pub fn app(state: ServerState) -> Router {
    build_app(&state).with_state(state)
}
