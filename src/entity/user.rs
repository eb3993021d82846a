use sqlx::FromRow;
use time::OffsetDateTime;

use crate::auth::password::{hash_password, verify_password};
use crate::error::Result;
use crate::id::{new_id, Id};

/// User record, one row of `users`.
///
/// Deliberately not `Serialize`: clients only ever see `UserResponse`.
#[derive(Clone, FromRow)]
pub struct User {
    pub id: Id,
    pub username: String,
    pub email: String,
    pub(crate) password_hash: String,
    pub role: String,
    /// Set by the repository on insert.
    pub created_at: Option<OffsetDateTime>,
    /// Refreshed by the repository on every write.
    pub updated_at: Option<OffsetDateTime>,
}

impl std::fmt::Debug for User {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"[REDACTED]")
            .field("role", &self.role)
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl User {
    /// Builds a user with a fresh id, storing only the password digest.
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: &str,
        role: impl Into<String>,
    ) -> Result<Self> {
        let password_hash = hash_password(password)?;
        Ok(Self {
            id: new_id(),
            username: username.into(),
            email: email.into(),
            password_hash,
            role: role.into(),
            created_at: None,
            updated_at: None,
        })
    }

    pub fn check_password(&self, candidate: &str) -> bool {
        verify_password(&self.password_hash, candidate)
    }
}
