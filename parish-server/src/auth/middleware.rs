//! 认证中间件
//!
//! 读操作对所有人开放；写操作需要管理员会话。

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::AppError;
use crate::auth::{AdminSession, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 会话解析中间件 (全局)
///
/// 存在 `Authorization: Bearer <token>` 头时验证 JWT，成功后将
/// [`AdminSession`] 注入请求扩展。没有该头的请求按匿名访客放行。
///
/// | 情况 | 结果 |
/// |------|------|
/// | 无 Authorization 头 | 匿名放行 |
/// | 非 Bearer 头 | 401 InvalidToken |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
pub async fn resolve_session(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // CORS 预检
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let Some(header) = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(next.run(req).await);
    };

    let token = JwtService::extract_from_header(header).ok_or(AppError::InvalidToken)?;

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let session = AdminSession::from(claims);
            req.extensions_mut().insert(session);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

/// 管理员检查中间件
///
/// ```ignore
/// Router::new()
///     .route("/api/members", post(handler::create))
///     .layer(middleware::from_fn(require_admin));
/// ```
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let Some(session) = req.extensions().get::<AdminSession>() else {
        security_log!(
            "WARN",
            "auth_missing",
            uri = format!("{:?}", req.uri())
        );
        return Err(AppError::Unauthorized);
    };

    if !session.is_admin() {
        security_log!(
            "WARN",
            "permission_denied",
            subject = session.subject.clone()
        );
        return Err(AppError::forbidden("Admin session required"));
    }

    Ok(next.run(req).await)
}
