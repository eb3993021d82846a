use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: Uuid,   // user ID
    pub exp: usize,  // expiration time
    pub iat: usize,  // issued at
    pub iss: String, // issuer
}

/// Signing material, built once at startup and shared read-only.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    expires_in_seconds: i64,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            expires_in_seconds: cfg.expires_in_seconds,
        }
    }

    /// Signs a token for `user_id` that expires `expiration_seconds` from now.
    pub fn issue_token(&self, user_id: Uuid, expiration_seconds: i64) -> Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now
            .checked_add(TimeDuration::seconds(expiration_seconds))
            .ok_or(Error::TokenExpiry)?;
        let claims = Claims {
            sub: user_id,
            iat: unix_seconds(now)?,
            exp: unix_seconds(exp)?,
            iss: self.issuer.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user_id, expiration_seconds, "jwt signed");
        Ok(token)
    }

    pub fn issue(&self, user_id: Uuid) -> Result<String> {
        self.issue_token(user_id, self.expires_in_seconds)
    }

    pub fn verify(&self, token: &str) -> Result<Claims> {
        let mut validation = Validation::default();
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

fn unix_seconds(at: OffsetDateTime) -> Result<usize> {
    usize::try_from(at.unix_timestamp()).map_err(|_| Error::TokenExpiry)
}
