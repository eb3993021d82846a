//! Domain entities and their construction-time invariants.

mod product;
mod user;

pub use product::Product;
pub use user::User;

use thiserror::Error;

/// First violated invariant of an entity.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("product ID is required")]
    IdRequired,
    #[error("invalid product ID")]
    InvalidId,
    #[error("product name is required")]
    NameRequired,
    #[error("product price must be positive")]
    PriceMustBePositive,
}
