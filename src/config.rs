use anyhow::{bail, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub expires_in_seconds: i64,
}

/// Process-wide settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "storefront".into()),
            expires_in_seconds: jwt_expires_in(std::env::var("JWT_EXPIRES_IN").ok().as_deref())?,
        };
        Ok(Self {
            database_url,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            host: std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: parse_or("APP_PORT", 8080),
            jwt,
        })
    }
}

/// Upper bound for token lifetime: one year.
const MAX_JWT_EXPIRES_IN: i64 = 365 * 24 * 60 * 60;

/// Token lifetime in seconds, 300 when unset. Anything set must parse and lie
/// in `1..=MAX_JWT_EXPIRES_IN`.
fn jwt_expires_in(raw: Option<&str>) -> anyhow::Result<i64> {
    let Some(raw) = raw else {
        return Ok(300);
    };
    let secs: i64 = raw
        .trim()
        .parse()
        .with_context(|| format!("JWT_EXPIRES_IN is not a number: {raw:?}"))?;
    if !(1..=MAX_JWT_EXPIRES_IN).contains(&secs) {
        bail!("JWT_EXPIRES_IN must be between 1 and {MAX_JWT_EXPIRES_IN} seconds, got {secs}");
    }
    Ok(secs)
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jwt_expires_in_defaults_and_bounds() {
        assert_eq!(jwt_expires_in(None).unwrap(), 300);
        assert_eq!(jwt_expires_in(Some("3600")).unwrap(), 3600);
        assert_eq!(jwt_expires_in(Some(" 60 ")).unwrap(), 60);

        for bad in ["0", "-5", "abc", "", "9223372036854775807"] {
            assert!(jwt_expires_in(Some(bad)).is_err(), "{bad} should be rejected");
        }
        assert!(jwt_expires_in(Some(MAX_JWT_EXPIRES_IN.to_string().as_str())).is_ok());
        assert!(jwt_expires_in(Some((MAX_JWT_EXPIRES_IN + 1).to_string().as_str())).is_err());
    }
}
