use tracing::{info, warn};

use crate::auth::jwt::JwtKeys;
use crate::error::{Error, Result};
use crate::repository::UserRepository;

/// Email + password login. An unknown email surfaces as `NotFound` and a bad
/// password as `InvalidCredentials`; callers decide how much of that to expose.
pub async fn authenticate(
    users: &dyn UserRepository,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<String> {
    if email.trim().is_empty() || password.trim().is_empty() {
        return Err(Error::invalid_argument("email and password are required"));
    }

    let user = users.find_by_email(email).await?;

    let candidate = password.to_owned();
    let (user, matches) = tokio::task::spawn_blocking(move || {
        let matches = user.check_password(&candidate);
        (user, matches)
    })
    .await
    .map_err(|e| Error::Hashing(e.to_string()))?;

    if !matches {
        warn!(user_id = %user.id, "login invalid password");
        return Err(Error::InvalidCredentials);
    }

    let token = keys.issue(user.id)?;
    info!(user_id = %user.id, "token issued");
    Ok(token)
}
