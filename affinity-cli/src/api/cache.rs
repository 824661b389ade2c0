//! Time-bounded memoization of the read-only gateway calls
//!
//! Each call type gets its own `moka` cache. Entries expire `ttl` after they
//! were fetched and each cache holds at most `max_entries` values.

use async_trait::async_trait;
use log::debug;
use moka::future::Cache;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use super::gateway::CrmGateway;
use super::models::{FieldValue, FieldValueScope, ListEntry, Organization};
use super::operations::{Operation, OperationResult};

/// Cache limits
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_entries: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60 * 60),
            max_entries: 1024,
        }
    }
}

/// Hit/miss counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: u64,
}

fn build_cache<K, V>(config: &CacheConfig) -> Cache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    Cache::builder()
        .max_capacity(config.max_entries)
        .time_to_live(config.ttl)
        .build()
}

/// Gateway decorator caching list entries, field values and organizations.
/// Failed reads are not cached; writes always go through.
pub struct CachedGateway<G> {
    inner: G,
    list_entries: Cache<(i64, u32), Vec<ListEntry>>,
    field_values: Cache<FieldValueScope, Vec<FieldValue>>,
    organizations: Cache<i64, Organization>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<G: CrmGateway> CachedGateway<G> {
    pub fn new(inner: G, config: CacheConfig) -> Self {
        Self {
            inner,
            list_entries: build_cache(&config),
            field_values: build_cache(&config),
            organizations: build_cache(&config),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &G {
        &self.inner
    }

    fn record<V>(&self, lookup: &Option<V>) {
        let counter = if lookup.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Forget everything, forcing the next reads to hit the network
    pub async fn clear(&self) {
        self.list_entries.invalidate_all();
        self.field_values.invalidate_all();
        self.organizations.invalidate_all();
        debug!("Cache cleared");
    }

    /// Combined statistics across the three call types
    pub async fn stats(&self) -> CacheStats {
        self.list_entries.run_pending_tasks().await;
        self.field_values.run_pending_tasks().await;
        self.organizations.run_pending_tasks().await;

        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.list_entries.entry_count()
                + self.field_values.entry_count()
                + self.organizations.entry_count(),
        }
    }
}

#[async_trait]
impl<G: CrmGateway> CrmGateway for CachedGateway<G> {
    async fn list_entries(&self, list_id: i64, page_size: u32) -> Option<Vec<ListEntry>> {
        let key = (list_id, page_size);
        let cached = self.list_entries.get(&key).await;
        self.record(&cached);
        if let Some(hit) = cached {
            debug!("Cache hit: list entries {:?}", key);
            return Some(hit);
        }
        let fetched = self.inner.list_entries(list_id, page_size).await?;
        self.list_entries.insert(key, fetched.clone()).await;
        Some(fetched)
    }

    async fn field_values(&self, scope: FieldValueScope) -> Option<Vec<FieldValue>> {
        let cached = self.field_values.get(&scope).await;
        self.record(&cached);
        if let Some(hit) = cached {
            debug!("Cache hit: field values {}", scope);
            return Some(hit);
        }
        let fetched = self.inner.field_values(scope).await?;
        self.field_values.insert(scope, fetched.clone()).await;
        Some(fetched)
    }

    async fn organization(&self, organization_id: i64) -> Option<Organization> {
        let cached = self.organizations.get(&organization_id).await;
        self.record(&cached);
        if let Some(hit) = cached {
            debug!("Cache hit: organization {}", organization_id);
            return Some(hit);
        }
        let fetched = self.inner.organization(organization_id).await?;
        self.organizations
            .insert(organization_id, fetched.clone())
            .await;
        Some(fetched)
    }

    async fn execute(&self, operation: Operation) -> OperationResult {
        self.inner.execute(operation).await
    }

    fn take_errors(&self) -> Vec<String> {
        self.inner.take_errors()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockGateway;
    use serde_json::json;

    fn short_lived(max_entries: u64) -> CacheConfig {
        CacheConfig {
            ttl: Duration::from_millis(50),
            max_entries,
        }
    }

    #[tokio::test]
    async fn test_cached_gateway_single_fetch_within_ttl() {
        let mock = MockGateway::new();
        mock.set_list_entries(vec![json!({"id": 1, "entity_id": 10})]);
        let gateway = CachedGateway::new(mock, CacheConfig::default());

        assert_eq!(gateway.list_entries(5, 250).await.unwrap().len(), 1);
        assert_eq!(gateway.list_entries(5, 250).await.unwrap().len(), 1);
        assert_eq!(gateway.inner().calls_to("list_entries"), 1);

        // Different arguments are a different key
        gateway.list_entries(5, 10).await;
        assert_eq!(gateway.inner().calls_to("list_entries"), 2);
    }

    #[tokio::test]
    async fn test_ttl_expiry_refetches() {
        let mock = MockGateway::new();
        mock.set_list_entries(vec![json!({"id": 1, "entity_id": 10})]);
        let gateway = CachedGateway::new(mock, short_lived(16));

        gateway.list_entries(5, 250).await;
        gateway.list_entries(5, 250).await;
        assert_eq!(gateway.inner().calls_to("list_entries"), 1);

        tokio::time::sleep(Duration::from_millis(150)).await;
        gateway.list_entries(5, 250).await;
        assert_eq!(gateway.inner().calls_to("list_entries"), 2);

        let stats = gateway.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
    }

    #[tokio::test]
    async fn test_capacity_bounds_entries() {
        let gateway = CachedGateway::new(
            MockGateway::new(),
            CacheConfig {
                ttl: Duration::from_secs(60),
                max_entries: 2,
            },
        );

        for id in 1..=8 {
            assert!(gateway.organization(id).await.is_some());
        }
        assert!(gateway.stats().await.entries <= 2);
    }

    #[tokio::test]
    async fn test_cached_gateway_skips_failures() {
        let mock = MockGateway::new();
        mock.fail_reads(true);
        let gateway = CachedGateway::new(mock, CacheConfig::default());

        assert!(gateway.organization(10).await.is_none());
        assert!(gateway.organization(10).await.is_none());
        assert_eq!(gateway.inner().calls_to("organization"), 2);
        assert_eq!(gateway.stats().await.entries, 0);
    }

    #[tokio::test]
    async fn test_cached_gateway_field_values_and_clear() {
        let mock = MockGateway::new();
        mock.add_field_values(10, vec![json!({"id": 1, "field_id": 100, "value": "x"})]);
        let gateway = CachedGateway::new(mock, CacheConfig::default());

        let scope = FieldValueScope::Entity(10);
        gateway.field_values(scope).await;
        gateway.field_values(scope).await;
        assert_eq!(gateway.inner().calls_to("field_values"), 1);
        assert_eq!(gateway.stats().await.hits, 1);

        gateway.clear().await;
        gateway.field_values(scope).await;
        assert_eq!(gateway.inner().calls_to("field_values"), 2);
    }

    #[tokio::test]
    async fn test_cached_gateway_writes_pass_through() {
        let gateway = CachedGateway::new(MockGateway::new(), CacheConfig::default());
        let op = Operation::create_list_entry(1, 2);
        gateway.execute(op.clone()).await;
        gateway.execute(op).await;
        assert_eq!(gateway.inner().calls_to("execute"), 2);
    }
}
