//! Authentication Handlers
//!
//! Exchanges the admin password for a bearer token.

use std::time::Duration;

use axum::{
    Json,
    extract::{Request, State},
};
use serde::{Deserialize, Serialize};
use shared::ApiResponse;

use crate::auth::AdminSession;
use crate::auth::password::verify_password;
use crate::core::ServerState;
use crate::security_log;
use crate::utils::{AppError, AppResult, blocking, ok};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Passwords (before hashing)
const MAX_PASSWORD_LEN: usize = 128;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: &'static str,
    /// Seconds until the token expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct SessionInfo {
    pub is_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<i64>,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<LoginResponse>>> {
    let Some(hash) = state.config.admin_password_hash.clone() else {
        security_log!("WARN", "login_disabled", reason = "no admin password configured");
        return Err(AppError::forbidden("Admin login is disabled"));
    };
    if req.password.len() > MAX_PASSWORD_LEN {
        return Err(AppError::invalid_credentials());
    }

    let verified = blocking(move || {
        verify_password(&req.password, &hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {}", e)))
    });

    // Fixed delay to prevent timing attacks (before checking result)
    let (verified, _) = tokio::join!(
        verified,
        tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS))
    );

    if !verified? {
        security_log!("WARN", "login_failed", reason = "invalid_credentials");
        return Err(AppError::invalid_credentials());
    }

    let token = state
        .jwt_service
        .generate_admin_token()
        .map_err(|e| AppError::internal(format!("Failed to generate token: {}", e)))?;

    security_log!("INFO", "login_success", subject = "admin");

    Ok(ok(LoginResponse {
        token,
        token_type: "Bearer",
        expires_in: state.jwt_service.expires_in_seconds(),
    }))
}

/// GET /api/auth/session
pub async fn session(req: Request) -> Json<ApiResponse<SessionInfo>> {
    let info = match req.extensions().get::<AdminSession>() {
        Some(session) => SessionInfo {
            is_admin: session.is_admin(),
            expires_at: Some(session.expires_at),
        },
        None => SessionInfo {
            is_admin: false,
            expires_at: None,
        },
    };
    ok(info)
}
