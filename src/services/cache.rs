use crate::services::ride_store::{RideStoreClient, RideStoreError};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

const ACTIVE_RIDES_KEY: &str = "rides:active";

/// Short-lived cache of the active ride list
///
/// Holds a single snapshot under a fixed key until its TTL expires.
pub struct RideSnapshotCache {
    snapshots: moka::future::Cache<String, Arc<Vec<Value>>>,
}

impl RideSnapshotCache {
    pub fn new(ttl_secs: u64) -> Self {
        let snapshots = moka::future::CacheBuilder::new(16)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { snapshots }
    }

    /// Return the cached snapshot, or fetch and cache a fresh one
    pub async fn active_rides(
        &self,
        store: &RideStoreClient,
    ) -> Result<Arc<Vec<Value>>, RideStoreError> {
        if let Some(rides) = self.snapshots.get(ACTIVE_RIDES_KEY).await {
            tracing::trace!("Snapshot cache hit: {}", ACTIVE_RIDES_KEY);
            return Ok(rides);
        }

        tracing::trace!("Snapshot cache miss: {}", ACTIVE_RIDES_KEY);
        let rides = Arc::new(store.active_rides().await?);
        self.put(rides.clone()).await;
        Ok(rides)
    }

    /// Replace the current snapshot
    pub async fn put(&self, rides: Arc<Vec<Value>>) {
        self.snapshots.insert(ACTIVE_RIDES_KEY.to_string(), rides).await;
    }

    pub async fn cached(&self) -> Option<Arc<Vec<Value>>> {
        self.snapshots.get(ACTIVE_RIDES_KEY).await
    }

    /// Drop the snapshot so the next call refetches
    pub async fn invalidate(&self) {
        self.snapshots.invalidate(ACTIVE_RIDES_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::ride_store::RideStoreConfig;
    use serde_json::json;

    #[tokio::test]
    async fn test_put_and_invalidate() {
        let cache = RideSnapshotCache::new(60);
        assert!(cache.cached().await.is_none());

        let rides = Arc::new(vec![json!({ "time": "09:00 AM", "distance": 7.0, "totalSeats": 4 })]);
        cache.put(rides.clone()).await;
        assert_eq!(cache.cached().await, Some(rides));

        cache.invalidate().await;
        assert!(cache.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_second_call_served_from_cache() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/databases/campus/collections/rides/documents")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "documents": [{ "time": "09:00 AM", "distance": 7.0, "totalSeats": 2, "filledSeats": 0 }]
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let store = RideStoreClient::new(RideStoreConfig {
            endpoint: server.url(),
            api_key: "key".to_string(),
            project_id: "project".to_string(),
            database_id: "campus".to_string(),
            rides_collection: "rides".to_string(),
            timeout_secs: 5,
        })
        .unwrap();
        let cache = RideSnapshotCache::new(60);

        let first = cache.active_rides(&store).await.unwrap();
        let second = cache.active_rides(&store).await.unwrap();

        mock.assert_async().await;
        assert_eq!(first.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
