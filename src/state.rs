use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{AppConfig, StoreBackend};
use crate::store::{ListingStore, MemoryStore, PgStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserStore>,
    pub listings: Arc<dyn ListingStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        match config.store_backend {
            StoreBackend::Postgres => {
                let store = PgStore::connect(&config).await?;
                if let Err(e) = sqlx::migrate!("./migrations").run(store.pool()).await {
                    warn!(error = %e, "migration failed; continuing");
                }
                let store = Arc::new(store);
                Ok(Self::from_parts(config, store.clone(), store))
            }
            StoreBackend::Memory => {
                warn!("using in-memory store; data is lost on restart");
                Ok(Self::in_memory(config).0)
            }
        }
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        listings: Arc<dyn ListingStore>,
    ) -> Self {
        info!(backend = ?config.store_backend, "record store ready");
        Self {
            config,
            users,
            listings,
        }
    }

    /// State over a fresh in-memory store. The store handle is returned so
    /// callers can inspect it directly.
    pub fn in_memory(config: Arc<AppConfig>) -> (Self, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = Self::from_parts(config, store.clone(), store.clone());
        (state, store)
    }

    #[cfg(test)]
    pub fn fake() -> (Self, Arc<MemoryStore>) {
        Self::in_memory(Arc::new(AppConfig::for_tests()))
    }
}
