//! Cache tier tests

#[cfg(test)]
mod tests {
    use crate::core::cache::{
        CacheVersions, EntityType, LayeredCache, MemoryNetworkCache, NetworkCache,
    };
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        name: String,
    }

    fn entry(name: &str) -> Entry {
        Entry {
            name: name.to_string(),
        }
    }

    fn layered(network: Arc<MemoryNetworkCache>) -> LayeredCache<Entry> {
        LayeredCache::new(
            "test",
            network,
            100,
            Duration::from_secs(60),
            Duration::from_millis(100),
        )
    }

    #[tokio::test]
    async fn test_set_writes_both_tiers() {
        let network = Arc::new(MemoryNetworkCache::new());
        let cache = layered(network.clone());

        cache.set("a", entry("acme")).await;
        assert!(network.contains_key("test:a"));
        assert_eq!(cache.get("a").await, Some(entry("acme")));
    }

    #[tokio::test]
    async fn test_network_tier_shared_between_instances() {
        let network = Arc::new(MemoryNetworkCache::new());
        let first = layered(network.clone());
        let second = layered(network.clone());

        first.set("a", entry("acme")).await;
        assert_eq!(second.get("a").await, Some(entry("acme")));

        second.invalidate("a").await;
        assert!(!network.contains_key("test:a"));
    }

    #[tokio::test]
    async fn test_invalidation_reaches_other_instance_local_tier() {
        let network = Arc::new(MemoryNetworkCache::new());
        let writer = layered(network.clone());
        let reader = layered(network.clone());

        writer.set("a", entry("old")).await;
        assert_eq!(reader.get("a").await, Some(entry("old")));

        writer.invalidate("a").await;
        assert_eq!(reader.get("a").await, None);

        // The stale local copy is gone even if the network drops afterwards
        network.set_offline(true);
        assert_eq!(reader.get("a").await, None);
    }

    #[tokio::test]
    async fn test_falls_back_to_local_when_offline() {
        let network = Arc::new(MemoryNetworkCache::new());
        let cache = layered(network.clone());

        cache.set("a", entry("acme")).await;
        network.set_offline(true);

        assert_eq!(cache.get("a").await, Some(entry("acme")));

        // Writes still land locally while offline
        cache.set("b", entry("globex")).await;
        assert_eq!(cache.get("b").await, Some(entry("globex")));
    }

    #[tokio::test]
    async fn test_undecodable_network_entry_is_ignored() {
        let network = Arc::new(MemoryNetworkCache::new());
        network.set("test:a", "not json", None).await.unwrap();

        let cache = layered(network);
        assert_eq!(cache.get("a").await, None);
    }

    #[tokio::test]
    async fn test_versions_bump_through_network() {
        let network = Arc::new(MemoryNetworkCache::new());
        let versions = CacheVersions::new(network.clone(), Duration::from_millis(100));

        let before = versions.snapshot().await;
        assert_eq!(versions.bump(EntityType::Role).await, 1);
        let after = versions.snapshot().await;

        assert_ne!(before.cache_key(), after.cache_key());
        assert_eq!(after.role, 1);
        assert_eq!(after.permission, 0);
    }

    #[tokio::test]
    async fn test_versions_visible_to_other_process() {
        let network = Arc::new(MemoryNetworkCache::new());
        let writer = CacheVersions::new(network.clone(), Duration::from_millis(100));
        let reader = CacheVersions::new(network.clone(), Duration::from_millis(100));

        writer.bump(EntityType::PermissionGroup).await;
        writer.bump(EntityType::PermissionGroup).await;

        assert_eq!(reader.current(EntityType::PermissionGroup).await, 2);
    }

    #[tokio::test]
    async fn test_versions_survive_network_outage() {
        let network = Arc::new(MemoryNetworkCache::new());
        let versions = CacheVersions::new(network.clone(), Duration::from_millis(100));

        network.set_offline(true);
        let first = versions.bump(EntityType::Permission).await;
        let second = versions.bump(EntityType::Permission).await;

        assert!(second > first);
        assert_eq!(versions.current(EntityType::Permission).await, second);
    }
}
