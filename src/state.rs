use std::sync::Arc;

use crate::auth::jwt::JwtKeys;
use crate::config::AppConfig;
use crate::db;
use crate::repository::{
    InMemoryProductRepository, InMemoryUserRepository, PgProductRepository, PgUserRepository,
    ProductRepository, UserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepository>,
    pub users: Arc<dyn UserRepository>,
    pub jwt: Arc<JwtKeys>,
}

impl AppState {
    /// Connects the pool, makes sure the tables exist and wires the Postgres repositories.
    pub async fn init(config: &AppConfig) -> anyhow::Result<Self> {
        let pool = db::connect(&config.database_url, config.db_max_connections).await?;
        db::ensure_schema(&pool).await?;

        Ok(Self::from_parts(
            Arc::new(PgProductRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool)),
            Arc::new(JwtKeys::from_config(&config.jwt)),
        ))
    }

    pub fn from_parts(
        products: Arc<dyn ProductRepository>,
        users: Arc<dyn UserRepository>,
        jwt: Arc<JwtKeys>,
    ) -> Self {
        Self {
            products,
            users,
            jwt,
        }
    }

    /// Database-free state over the in-memory repositories.
    pub fn in_memory(jwt: JwtKeys) -> Self {
        Self::from_parts(
            Arc::new(InMemoryProductRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(jwt),
        )
    }
}
