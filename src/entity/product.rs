use sqlx::FromRow;
use time::OffsetDateTime;

use super::ValidationError;
use crate::id::{new_id, parse_id, Id};

/// Product record, one row of `products`.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Product {
    pub id: Id,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Product {
    /// Builds a product with a fresh id and timestamps, rejecting it if invalid.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
    ) -> Result<Self, ValidationError> {
        let now = OffsetDateTime::now_utc();
        let product = Self {
            id: new_id(),
            name: name.into(),
            description: description.into(),
            price,
            created_at: now,
            updated_at: now,
        };
        product.validate()?;
        Ok(product)
    }

    /// Checks invariants in order: id present, id well-formed, name, price.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.is_nil() {
            return Err(ValidationError::IdRequired);
        }
        if parse_id(&self.id.to_string()).is_err() {
            return Err(ValidationError::InvalidId);
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::NameRequired);
        }
        if self.price.is_nan() || self.price <= 0.0 {
            return Err(ValidationError::PriceMustBePositive);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn new_product_assigns_id_and_timestamps() {
        let product = Product::new("Test Product", "This is a test product", 10.99).unwrap();
        assert_eq!(product.name, "Test Product");
        assert_eq!(product.description, "This is a test product");
        assert_eq!(product.price, 10.99);
        assert!(!product.id.is_nil());
        assert_eq!(parse_id(&product.id.to_string()).unwrap(), product.id);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn new_products_get_distinct_ids() {
        let a = Product::new("a", "", 1.0).unwrap();
        let b = Product::new("a", "", 1.0).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn empty_description_is_allowed() {
        assert!(Product::new("Widget", "", 1.0).is_ok());
    }

    #[test]
    fn name_is_required_regardless_of_price() {
        for price in [10.0, 0.0, -5.0] {
            assert_eq!(
                Product::new("", "desc", price).unwrap_err(),
                ValidationError::NameRequired
            );
        }
        assert_eq!(
            Product::new("   ", "desc", 1.0).unwrap_err(),
            ValidationError::NameRequired
        );
    }

    #[test]
    fn price_must_be_positive() {
        for price in [0.0, -1.0, -0.01, f64::NAN] {
            assert_eq!(
                Product::new("Widget", "desc", price).unwrap_err(),
                ValidationError::PriceMustBePositive
            );
        }
    }

    #[test]
    fn missing_id_is_reported_first() {
        let mut product = Product::new("Widget", "desc", 1.0).unwrap();
        product.id = Uuid::nil();
        product.name.clear();
        product.price = -1.0;
        assert_eq!(product.validate().unwrap_err(), ValidationError::IdRequired);
    }
}
