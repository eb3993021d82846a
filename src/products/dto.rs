use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::entity::Product;

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
}

/// Absent fields keep their stored value.
#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&Product> for ProductResponse {
    fn from(p: &Product) -> Self {
        Self {
            id: p.id,
            name: p.name.clone(),
            description: p.description.clone(),
            price: p.price,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

/// Raw query string; values that don't parse fall back to defaults.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort: Option<String>,
}

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;

impl ListQuery {
    pub fn page(&self) -> i64 {
        positive_or(self.page.as_deref(), DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        positive_or(self.limit.as_deref(), DEFAULT_LIMIT)
    }

    /// Unknown values are passed through so the repository can reject them.
    pub fn sort(&self) -> &str {
        match self.sort.as_deref() {
            None | Some("") => "asc",
            Some(s) => s,
        }
    }
}

fn positive_or(raw: Option<&str>, default: i64) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_query_defaults_bad_values() {
        let q = ListQuery {
            page: Some("abc".into()),
            limit: Some("-4".into()),
            sort: None,
        };
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
        assert_eq!(q.sort(), "asc");

        let q = ListQuery {
            page: Some("3".into()),
            limit: Some("25".into()),
            sort: Some("desc".into()),
        };
        assert_eq!((q.page(), q.limit(), q.sort()), (3, 25, "desc"));
    }

    #[test]
    fn response_timestamps_are_rfc3339_strings() {
        let product = Product::new("Widget", "desc", 10.99).unwrap();
        let json = serde_json::to_value(ProductResponse::from(&product)).unwrap();
        assert!(json["created_at"].is_string());
        assert_eq!(json["name"], "Widget");
        assert_eq!(json["id"], product.id.to_string());
    }
}
