//! 会话令牌签发与校验

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use super::model::{SessionClaims, SessionToken};
use crate::config::MAX_SESSION_TTL_MINUTES;
use crate::core::identity::Identity;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("令牌无效: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("令牌缺少主体")]
    MissingSubject,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// HS256 会话密钥
#[derive(Clone)]
pub struct SessionKeys {
    keys: Arc<Keys>,
    ttl: Duration,
}

impl SessionKeys {
    /// 有效期超出 `MAX_SESSION_TTL_MINUTES` 时按上限计
    pub fn new(secret: &str, ttl_minutes: i64) -> Self {
        Self {
            keys: Arc::new(Keys {
                encoding: EncodingKey::from_secret(secret.as_bytes()),
                decoding: DecodingKey::from_secret(secret.as_bytes()),
            }),
            ttl: Duration::minutes(ttl_minutes.clamp(0, MAX_SESSION_TTL_MINUTES)),
        }
    }

    pub fn issue(&self, identity: &Identity, now: DateTime<Utc>) -> Result<SessionToken, SessionError> {
        let expires_at = now + self.ttl;
        let claims = SessionClaims {
            sub: identity.subject.clone(),
            email: identity.email.clone(),
            name: identity.name.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.keys.encoding)?;

        Ok(SessionToken { token, expires_at })
    }

    pub fn verify(&self, token: &str) -> Result<Identity, SessionError> {
        let validation = Validation::new(Algorithm::HS256);
        let claims = decode::<SessionClaims>(token, &self.keys.decoding, &validation)?.claims;

        if claims.sub.trim().is_empty() {
            return Err(SessionError::MissingSubject);
        }

        Ok(Identity {
            subject: claims.sub,
            email: claims.email,
            name: claims.name,
        })
    }
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_minutes", &self.ttl.num_minutes())
            .finish_non_exhaustive()
    }
}
