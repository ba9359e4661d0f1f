//! JWT 令牌服务
//!
//! 处理管理员会话令牌的生成、验证和解析。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Subject and role carried by every admin token
pub const ADMIN_SUBJECT: &str = "admin";

/// Minimum length accepted for `JWT_SECRET`
pub const MIN_SECRET_LENGTH: usize = 32;

/// 默认令牌有效期 (8 小时)
pub const DEFAULT_EXPIRATION_MINUTES: i64 = 480;

/// 令牌有效期上限 (30 天)
pub const MAX_EXPIRATION_MINUTES: i64 = 30 * 24 * 60;

/// JWT 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// JWT 密钥 (至少 32 字节)
    pub secret: String,
    /// 令牌过期时间 (分钟)
    pub expiration_minutes: i64,
    /// 令牌签发者
    pub issuer: String,
    /// 令牌受众
    pub audience: String,
}

impl JwtConfig {
    /// 从环境变量加载
    ///
    /// `JWT_SECRET` 缺失或过短时生成临时密钥，重启后已签发的令牌全部失效。
    pub fn from_env() -> Self {
        let secret = match std::env::var("JWT_SECRET") {
            Ok(secret) if secret.len() >= MIN_SECRET_LENGTH => secret,
            Ok(_) => {
                tracing::warn!(
                    "JWT_SECRET shorter than {} characters, generating a temporary key",
                    MIN_SECRET_LENGTH
                );
                generate_printable_secret()
            }
            Err(_) => {
                tracing::warn!("JWT_SECRET not set, generating a temporary key");
                generate_printable_secret()
            }
        };

        Self {
            secret,
            expiration_minutes: parse_expiration_minutes(
                std::env::var("JWT_EXPIRATION_MINUTES").ok().as_deref(),
            ),
            issuer: "parish-server".to_string(),
            audience: "parish-admin".to_string(),
        }
    }

    /// 使用固定密钥和默认参数
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiration_minutes: DEFAULT_EXPIRATION_MINUTES,
            issuer: "parish-server".to_string(),
            audience: "parish-admin".to_string(),
        }
    }
}

/// 解析 `JWT_EXPIRATION_MINUTES`，限制在 1 分钟到 [`MAX_EXPIRATION_MINUTES`] 之间
fn parse_expiration_minutes(raw: Option<&str>) -> i64 {
    let Some(minutes) = raw.and_then(|s| s.trim().parse::<i64>().ok()) else {
        return DEFAULT_EXPIRATION_MINUTES;
    };
    let clamped = minutes.clamp(1, MAX_EXPIRATION_MINUTES);
    if clamped != minutes {
        tracing::warn!(
            requested = minutes,
            applied = clamped,
            "JWT_EXPIRATION_MINUTES out of range, clamping"
        );
    }
    clamped
}

/// 生成 64 位可打印随机密钥
pub fn generate_printable_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject
    pub sub: String,
    /// 角色名称
    pub role: String,
    /// 过期时间戳
    pub exp: i64,
    /// 签发时间戳
    pub iat: i64,
    /// 签发者
    pub iss: String,
    /// 受众
    pub aud: String,
}

/// JWT 错误
#[derive(Error, Debug)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    InvalidToken(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .field("expiration_minutes", &self.config.expiration_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 为管理员生成新令牌
    pub fn generate_admin_token(&self) -> Result<String, JwtError> {
        let now = Utc::now();
        let expiration = Duration::try_minutes(self.config.expiration_minutes)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                JwtError::GenerationFailed(format!(
                    "expiration of {} minutes is out of range",
                    self.config.expiration_minutes
                ))
            })?;

        let claims = Claims {
            sub: ADMIN_SUBJECT.to_string(),
            role: ADMIN_SUBJECT.to_string(),
            exp: expiration.timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// 验证并解码令牌
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header.strip_prefix("Bearer ")
    }

    /// 令牌有效期 (秒)
    pub fn expires_in_seconds(&self) -> i64 {
        self.config.expiration_minutes.saturating_mul(60)
    }
}

/// 当前管理员会话 (从 JWT Claims 解析)
///
/// 由会话中间件创建，注入到请求扩展
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub subject: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl AdminSession {
    /// 令牌是否代表管理员
    pub fn is_admin(&self) -> bool {
        self.subject == ADMIN_SUBJECT
    }
}

impl From<Claims> for AdminSession {
    fn from(claims: Claims) -> Self {
        Self {
            subject: claims.sub,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
