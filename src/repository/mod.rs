//! Persistence contracts for products and users.
//!
//! Both backends (`postgres`, `memory`) run caller input through the helpers
//! below so argument errors are identical whichever store is plugged in.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::entity::{Product, User};
use crate::error::{Error, Result};

pub use memory::{InMemoryProductRepository, InMemoryUserRepository};
pub use postgres::{PgProductRepository, PgUserRepository};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Inserts a validated product.
    async fn create(&self, product: &Product) -> Result<()>;

    async fn find_by_id(&self, id: &str) -> Result<Product>;

    /// One page ordered by creation time; an out-of-range page is empty.
    async fn find_all(&self, page: i64, limit: i64, sort: &str) -> Result<Vec<Product>>;

    /// Full replace of an existing row; refreshes `updated_at` in place.
    async fn update(&self, product: &mut Product) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Normalizes the email in place, enforces uniqueness and stamps timestamps.
    async fn create(&self, user: &mut User) -> Result<()>;

    async fn find_by_email(&self, email: &str) -> Result<User>;

    async fn find_by_id(&self, id: &str) -> Result<User>;

    async fn update(&self, user: &mut User) -> Result<()>;

    async fn delete(&self, id: &str) -> Result<()>;

    async fn exists(&self, email: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Empty means ascending.
    pub fn parse(sort: &str) -> Result<Self> {
        match sort {
            "" | "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(Error::invalid_argument("sort must be 'asc' or 'desc'")),
        }
    }

    pub(crate) fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Validated `find_all` arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: i64,
    pub offset: i64,
    pub sort: SortOrder,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64, sort: &str) -> Result<Self> {
        let sort = SortOrder::parse(sort)?;
        if page <= 0 || limit <= 0 {
            return Err(Error::invalid_argument(
                "page and limit must be greater than 0",
            ));
        }
        // a page past the end is simply empty
        let offset = (page - 1).saturating_mul(limit);
        Ok(Self { limit, offset, sort })
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Normalized email, or `InvalidArgument` when blank.
pub(crate) fn require_email(email: &str) -> Result<String> {
    if email.trim().is_empty() {
        return Err(Error::invalid_argument("email cannot be empty"));
    }
    Ok(normalize_email(email))
}

/// Blank ids are a caller error. Text that is not a UUID cannot match any
/// row, so it resolves to `NotFound` without touching the store.
pub(crate) fn require_id(id: &str) -> Result<Uuid> {
    if id.trim().is_empty() {
        return Err(Error::invalid_argument("id cannot be empty"));
    }
    Uuid::parse_str(id.trim()).map_err(|_| Error::NotFound)
}

/// Pre-insert checks for a user; normalizes the email in place.
pub(crate) fn prepare_new_user(user: &mut User) -> Result<()> {
    user.email = require_email(&user.email)?;
    if user.username.trim().is_empty() {
        return Err(Error::invalid_argument("username cannot be empty"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_request_computes_offset() {
        let req = PageRequest::new(3, 10, "desc").unwrap();
        assert_eq!(req.offset, 20);
        assert_eq!(req.limit, 10);
        assert_eq!(req.sort, SortOrder::Desc);
    }

    #[test]
    fn huge_page_saturates_offset() {
        let req = PageRequest::new(i64::MAX, 2, "asc").unwrap();
        assert_eq!(req.offset, i64::MAX);
        assert_eq!(req.limit, 2);
    }

    #[test]
    fn empty_sort_defaults_to_ascending() {
        assert_eq!(PageRequest::new(1, 1, "").unwrap().sort, SortOrder::Asc);
    }

    #[test]
    fn page_request_rejects_bad_input() {
        for (page, limit) in [(0, 10), (1, 0), (0, 0), (-1, 5)] {
            let err = PageRequest::new(page, limit, "asc").unwrap_err();
            assert_eq!(err.to_string(), "page and limit must be greater than 0");
        }
        let err = PageRequest::new(1, 10, "invalid").unwrap_err();
        assert_eq!(err.to_string(), "sort must be 'asc' or 'desc'");
        assert!(PageRequest::new(1, 10, "ASC").is_err());
    }

    #[test]
    fn ids_are_checked_before_querying() {
        assert!(matches!(require_id(""), Err(Error::InvalidArgument(_))));
        assert!(matches!(require_id("   "), Err(Error::InvalidArgument(_))));
        assert!(matches!(require_id("non-existent-id"), Err(Error::NotFound)));
        let id = Uuid::new_v4();
        assert_eq!(require_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn emails_are_trimmed_and_lowercased() {
        assert_eq!(normalize_email(" Foo@Bar.COM "), "foo@bar.com");
        assert!(matches!(require_email(" \t"), Err(Error::InvalidArgument(_))));
    }
}
