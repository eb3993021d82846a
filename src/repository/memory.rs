//! In-process stores. Used as the test double for handlers and for running
//! the service without a database.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{
    prepare_new_user, require_email, require_id, PageRequest, ProductRepository, SortOrder,
    UserRepository,
};
use crate::entity::{Product, User};
use crate::error::{Error, Result};

/// Rows are kept in insertion order so equal timestamps sort stably.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProductRepository {
    products: Arc<RwLock<Vec<Product>>>,
}

impl InMemoryProductRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn create(&self, product: &Product) -> Result<()> {
        product.validate()?;
        let mut products = self.products.write().await;
        if products.iter().any(|p| p.id == product.id) {
            return Err(Error::invalid_argument("product already exists"));
        }
        products.push(product.clone());
        info!(product_id = %product.id, "created product");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Product> {
        let id = require_id(id)?;
        let products = self.products.read().await;
        products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn find_all(&self, page: i64, limit: i64, sort: &str) -> Result<Vec<Product>> {
        let req = PageRequest::new(page, limit, sort)?;
        let mut rows = self.products.read().await.clone();
        match req.sort {
            SortOrder::Asc => rows.sort_by(|a, b| a.created_at.cmp(&b.created_at)),
            SortOrder::Desc => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
        Ok(rows
            .into_iter()
            .skip(usize::try_from(req.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(req.limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn update(&self, product: &mut Product) -> Result<()> {
        let mut products = self.products.write().await;
        let slot = products
            .iter_mut()
            .find(|p| p.id == product.id)
            .ok_or(Error::NotFound)?;
        product.validate()?;
        product.updated_at = OffsetDateTime::now_utc();
        *slot = product.clone();
        info!(product_id = %product.id, "updated product");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let mut products = self.products.write().await;
        let before = products.len();
        products.retain(|p| p.id != id);
        if products.len() == before {
            return Err(Error::NotFound);
        }
        info!(product_id = %id, "deleted product");
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: &mut User) -> Result<()> {
        prepare_new_user(user)?;

        // check and insert under one lock, like a unique index would
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(Error::DuplicateEmail);
        }

        let now = OffsetDateTime::now_utc();
        user.created_at.get_or_insert(now);
        user.updated_at = Some(now);
        users.insert(user.id, user.clone());

        info!(user_id = %user.id, "created user");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User> {
        let email = require_email(email)?;
        let users = self.users.read().await;
        users
            .values()
            .find(|u| u.email == email)
            .cloned()
            .ok_or(Error::NotFound)
    }

    async fn find_by_id(&self, id: &str) -> Result<User> {
        let id = require_id(id)?;
        let users = self.users.read().await;
        users.get(&id).cloned().ok_or(Error::NotFound)
    }

    async fn update(&self, user: &mut User) -> Result<()> {
        user.email = require_email(&user.email)?;

        let mut users = self.users.write().await;
        let stored_created_at = users.get(&user.id).ok_or(Error::NotFound)?.created_at;
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(Error::DuplicateEmail);
        }

        if user.created_at.is_none() {
            user.created_at = stored_created_at;
        }
        user.updated_at = Some(OffsetDateTime::now_utc());
        users.insert(user.id, user.clone());

        info!(user_id = %user.id, "updated user");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let mut users = self.users.write().await;
        users.remove(&id).ok_or(Error::NotFound)?;
        info!(user_id = %id, "deleted user");
        Ok(())
    }

    async fn exists(&self, email: &str) -> Result<bool> {
        let email = require_email(email)?;
        let users = self.users.read().await;
        Ok(users.values().any(|u| u.email == email))
    }
}
