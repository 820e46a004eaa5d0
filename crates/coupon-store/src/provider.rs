//! Store manager that dispatches to the configured provider.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use coupon_core::config::StoreConfig;
use coupon_core::error::AppError;
use coupon_core::result::AppResult;
use coupon_core::traits::CoordinationStore;

/// Store manager that wraps the configured coordination store.
///
/// The provider is selected at construction time based on configuration.
#[derive(Debug, Clone)]
pub struct StoreManager {
    /// The inner store provider.
    inner: Arc<dyn CoordinationStore>,
    /// Name of the selected provider.
    provider_name: &'static str,
}

impl StoreManager {
    /// Create a new store manager from configuration.
    pub async fn new(config: &StoreConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            #[cfg(feature = "redis-backend")]
            "redis" => {
                info!("Initializing Redis coordination store");
                let client = crate::redis::RedisClient::connect(&config.redis).await?;
                Ok(Self {
                    inner: Arc::new(crate::redis::RedisStore::new(client)),
                    provider_name: "redis",
                })
            }
            #[cfg(feature = "memory")]
            "memory" => {
                info!("Initializing in-memory coordination store");
                Ok(Self {
                    inner: Arc::new(crate::memory::MemoryStore::new()),
                    provider_name: "memory",
                })
            }
            other => Err(AppError::configuration(format!(
                "Unknown store provider: '{other}'. Supported: memory, redis"
            ))),
        }
    }

    /// Create a store manager from an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn CoordinationStore>) -> Self {
        Self {
            inner: provider,
            provider_name: "custom",
        }
    }

    /// Name of the active provider.
    pub fn provider_name(&self) -> &'static str {
        self.provider_name
    }
}

#[async_trait]
impl CoordinationStore for StoreManager {
    async fn insert_if_absent(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.insert_if_absent(key, member).await
    }

    async fn remove_member(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.remove_member(key, member).await
    }

    async fn is_member(&self, key: &str, member: &str) -> AppResult<bool> {
        self.inner.is_member(key, member).await
    }

    async fn cardinality(&self, key: &str) -> AppResult<u64> {
        self.inner.cardinality(key).await
    }

    async fn increment_bounded(&self, key: &str, bound: u64) -> AppResult<Option<u64>> {
        self.inner.increment_bounded(key, bound).await
    }

    async fn decrement_floored(&self, key: &str) -> AppResult<Option<u64>> {
        self.inner.decrement_floored(key).await
    }

    async fn counter_value(&self, key: &str) -> AppResult<u64> {
        self.inner.counter_value(key).await
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.inner.delete(key).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }
}
