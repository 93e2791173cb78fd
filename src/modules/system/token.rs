//! 访问令牌 / 刷新令牌（HS256 JWT）

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::conf::JwtSettings;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("令牌无效或已过期")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("令牌类型错误")]
    WrongType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// 令牌载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    pub username: String,
    /// 租户 schema_name
    pub tenant: String,
    pub token_type: TokenType,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// 令牌签发与校验
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_lifetime: Duration,
    refresh_lifetime: Duration,
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            access_lifetime: Duration::minutes(settings.access_token_lifetime),
            refresh_lifetime: Duration::minutes(settings.refresh_token_lifetime),
        }
    }

    pub fn issue(
        &self,
        user_id: i64,
        username: &str,
        tenant: &str,
        token_type: TokenType,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let lifetime = match token_type {
            TokenType::Access => self.access_lifetime,
            TokenType::Refresh => self.refresh_lifetime,
        };
        let claims = Claims {
            user_id,
            username: username.to_string(),
            tenant: tenant.to_string(),
            token_type,
            jti: uuid::Uuid::new_v4().simple().to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    pub fn issue_pair(
        &self,
        user_id: i64,
        username: &str,
        tenant: &str,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access: self.issue(user_id, username, tenant, TokenType::Access)?,
            refresh: self.issue(user_id, username, tenant, TokenType::Refresh)?,
        })
    }

    /// 校验签名、有效期与令牌类型
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;
        if data.claims.token_type != expected {
            return Err(TokenError::WrongType);
        }
        Ok(data.claims)
    }
}
