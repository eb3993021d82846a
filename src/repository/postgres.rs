use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, info, instrument};

use super::{
    prepare_new_user, require_email, require_id, PageRequest, ProductRepository, UserRepository,
};
use crate::entity::{Product, User};
use crate::error::{Error, Result};

#[derive(Clone)]
pub struct PgProductRepository {
    db: PgPool,
}

impl PgProductRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn create(&self, product: &Product) -> Result<()> {
        product.validate()?;
        sqlx::query(
            r#"
            INSERT INTO products (id, name, description, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.db)
        .await?;
        info!("created product");
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Product> {
        let id = require_id(id)?;
        sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(Error::NotFound)
    }

    async fn find_all(&self, page: i64, limit: i64, sort: &str) -> Result<Vec<Product>> {
        let req = PageRequest::new(page, limit, sort)?;
        // direction comes from the enum, never from caller text
        let sql = format!(
            r#"
            SELECT id, name, description, price, created_at, updated_at
            FROM products
            ORDER BY created_at {}
            LIMIT $1 OFFSET $2
            "#,
            req.sort.as_sql()
        );
        let rows = sqlx::query_as::<_, Product>(&sql)
            .bind(req.limit)
            .bind(req.offset)
            .fetch_all(&self.db)
            .await?;
        debug!(page, limit, count = rows.len(), "listed products");
        Ok(rows)
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn update(&self, product: &mut Product) -> Result<()> {
        self.find_by_id(&product.id.to_string()).await?;
        product.validate()?;
        product.updated_at = OffsetDateTime::now_utc();

        let result = sqlx::query(
            r#"
            UPDATE products
               SET name = $2, description = $3, price = $4, created_at = $5, updated_at = $6
             WHERE id = $1
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        info!("updated product");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        info!(product_id = %id, "deleted product");
        Ok(())
    }
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// The unique index on `users.email` is the backstop for concurrent inserts
/// that both pass the application-level check.
fn map_unique_violation(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => Error::DuplicateEmail,
        _ => Error::Storage(e),
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn create(&self, user: &mut User) -> Result<()> {
        prepare_new_user(user)?;

        match self.find_by_email(&user.email).await {
            Ok(_) => return Err(Error::DuplicateEmail),
            Err(Error::NotFound) => {}
            Err(e) => return Err(e),
        }

        let now = OffsetDateTime::now_utc();
        user.created_at.get_or_insert(now);
        user.updated_at = Some(now);

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.db)
        .await
        .map_err(map_unique_violation)?;
        info!("created user");
        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<User> {
        let email = require_email(email)?;
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(Error::NotFound)
    }

    async fn find_by_id(&self, id: &str) -> Result<User> {
        let id = require_id(id)?;
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(Error::NotFound)
    }

    #[instrument(skip(self, user), fields(user_id = %user.id))]
    async fn update(&self, user: &mut User) -> Result<()> {
        user.email = require_email(&user.email)?;

        let taken: Option<(uuid::Uuid,)> =
            sqlx::query_as("SELECT id FROM users WHERE email = $1 AND id <> $2")
                .bind(&user.email)
                .bind(user.id)
                .fetch_optional(&self.db)
                .await?;
        if taken.is_some() {
            return Err(Error::DuplicateEmail);
        }

        user.updated_at = Some(OffsetDateTime::now_utc());
        let stored_created_at: Option<(OffsetDateTime,)> = sqlx::query_as(
            r#"
            UPDATE users
               SET username = $2, email = $3, password_hash = $4, role = $5,
                   created_at = COALESCE($6, created_at), updated_at = $7
             WHERE id = $1
            RETURNING created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.role)
        .bind(user.created_at)
        .bind(user.updated_at)
        .fetch_optional(&self.db)
        .await
        .map_err(map_unique_violation)?;

        let (created_at,) = stored_created_at.ok_or(Error::NotFound)?;
        user.created_at = Some(created_at);
        info!("updated user");
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let id = require_id(id)?;
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound);
        }
        info!(user_id = %id, "deleted user");
        Ok(())
    }

    async fn exists(&self, email: &str) -> Result<bool> {
        let email = require_email(email)?;
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email)
                .fetch_one(&self.db)
                .await?;
        Ok(exists)
    }
}
