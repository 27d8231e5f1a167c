use crate::models::CatalogService;
use crate::services::postgres::{PostgresClient, PostgresError};
use std::sync::Arc;
use std::time::Duration;

const CATALOG_KEY: &str = "catalog";

/// Read-through cache of the canonical service catalog
///
/// Only the catalog is cached. Candidate lists and scores are always
/// recomputed per request.
pub struct ServiceCatalog {
    postgres: Arc<PostgresClient>,
    cache: moka::future::Cache<&'static str, Arc<Vec<CatalogService>>>,
}

impl ServiceCatalog {
    pub fn new(postgres: Arc<PostgresClient>, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(1)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { postgres, cache }
    }

    /// Current catalog, loading it from the database on a miss
    ///
    /// Load failures are returned to the caller and never cached.
    pub async fn services(&self) -> Result<Arc<Vec<CatalogService>>, Arc<PostgresError>> {
        self.cache
            .try_get_with(CATALOG_KEY, async {
                tracing::debug!("Service catalog cache miss, loading from database");
                self.postgres.list_services().await.map(Arc::new)
            })
            .await
    }
}
