use std::sync::Arc;

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::config::{AppConfig, StoreBackend};
use crate::users::{memory::InMemoryUserStore, repo::PgUserStore, repo::UserStore};

/// Store handle with an explicit lifecycle: `open` at startup, `close` after
/// the server has drained.
pub struct Database {
    pool: Option<PgPool>,
    store: Arc<dyn UserStore>,
}

impl Database {
    pub async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        match (config.store, &config.database) {
            (StoreBackend::Postgres, Some(db)) => {
                let pool = PgPoolOptions::new()
                    .max_connections(db.max_connections)
                    .connect(&db.url)
                    .await
                    .context("connect to database")?;

                sqlx::migrate!("./migrations")
                    .run(&pool)
                    .await
                    .context("run migrations")?;

                tracing::info!(max_connections = db.max_connections, "postgres store ready");
                Ok(Self {
                    store: Arc::new(PgUserStore::new(pool.clone())),
                    pool: Some(pool),
                })
            }
            (StoreBackend::Postgres, None) => anyhow::bail!("postgres store needs DATABASE_URL"),
            (StoreBackend::Memory, _) => {
                tracing::warn!("using in-memory user store; data is lost on exit");
                Ok(Self {
                    pool: None,
                    store: Arc::new(InMemoryUserStore::new()),
                })
            }
        }
    }

    pub fn store(&self) -> Arc<dyn UserStore> {
        self.store.clone()
    }

    pub async fn close(self) {
        if let Some(pool) = self.pool {
            pool.close().await;
            tracing::info!("postgres pool closed");
        }
    }
}
