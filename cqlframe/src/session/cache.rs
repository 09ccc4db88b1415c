// Copyright (c) 2024-2025 cqlframe Contributors
// SPDX-License-Identifier: Apache-2.0
//
//! Session cache keyed by target node selector

use crate::driver::{ClusterConfig, Connector};
use crate::error::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Per-key creation slot. Concurrent acquirers of one key wait on the same
/// cell; a failed initialization leaves the cell empty.
type Slot<S> = Arc<OnceCell<Arc<S>>>;

/// Canonical cache key for a target selector: absent and empty are the same
pub fn target_key(target: Option<&str>) -> String {
    target.unwrap_or_default().to_string()
}

/// Owns one session per distinct target selector of a data source instance.
///
/// The map lock is held only to look up or insert a key's slot, never across
/// a connection attempt, so creating a session for one target does not block
/// acquisitions of another.
pub struct SessionCache<C: Connector> {
    connector: C,
    cluster: ClusterConfig,
    slots: Mutex<HashMap<String, Slot<C::Session>>>,
}

impl<C: Connector> SessionCache<C> {
    pub fn new(connector: C, cluster: ClusterConfig) -> Self {
        Self {
            connector,
            cluster,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn cluster(&self) -> &ClusterConfig {
        &self.cluster
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Session for `target`, connecting on first use.
    ///
    /// A cached session is returned as is. A failed connection attempt caches
    /// nothing and is reported to the caller; the next call tries again. A
    /// session that finished connecting after [`SessionCache::close_all`]
    /// dropped its slot is discarded, and the caller gets the session owned
    /// by the current slot instead.
    pub async fn acquire(&self, target: Option<&str>) -> Result<Arc<C::Session>> {
        let key = target_key(target);
        loop {
            let slot = {
                let mut slots = self.slots.lock();
                slots.entry(key.clone()).or_default().clone()
            };

            if let Some(session) = slot.get() {
                return Ok(session.clone());
            }

            let session = slot.get_or_try_init(|| self.connect(&key)).await?.clone();
            if self.owns(&key, &slot) {
                return Ok(session);
            }
            log::debug!(
                "Session for target '{}' was established after the cache was closed; discarding it",
                key
            );
        }
    }

    async fn connect(&self, key: &str) -> Result<Arc<C::Session>> {
        let options = self.cluster.session_options(key);
        log::debug!(
            "Creating session to {} for target {}",
            self.cluster.contact_point,
            options.node_filter
        );
        let connect = self.connector.connect(&options);
        let session = match self.cluster.connect_timeout {
            Some(timeout) => tokio::time::timeout(timeout, connect)
                .await
                .map_err(|_| Error::Timeout(timeout))??,
            None => connect.await?,
        };
        log::info!("Session established for target {}", options.node_filter);
        Ok(Arc::new(session))
    }

    /// Whether `slot` is still the cache's slot for `key`
    fn owns(&self, key: &str, slot: &Slot<C::Session>) -> bool {
        self.slots
            .lock()
            .get(key)
            .map(|current| Arc::ptr_eq(current, slot))
            .unwrap_or(false)
    }

    /// Number of established sessions
    pub fn len(&self) -> usize {
        self.slots
            .lock()
            .values()
            .filter(|slot| slot.initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a session for `target` is established
    pub fn contains(&self, target: Option<&str>) -> bool {
        self.slots
            .lock()
            .get(&target_key(target))
            .map(|slot| slot.initialized())
            .unwrap_or(false)
    }

    /// Drop every cached session and return how many were established.
    /// Queries still holding a session keep it alive until they finish.
    /// Connections still in flight are not counted; their sessions are
    /// discarded once established and never enter the cache.
    pub fn close_all(&self) -> usize {
        let drained: Vec<_> = self.slots.lock().drain().collect();
        let closed = drained.iter().filter(|(_, slot)| slot.initialized()).count();
        for (key, slot) in &drained {
            if slot.initialized() {
                log::debug!("Closing session for target '{}'", key);
            }
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::memory::MemoryConnector;
    use crate::driver::NodeFilter;
    use std::time::Duration;

    fn cache() -> SessionCache<MemoryConnector> {
        SessionCache::new(MemoryConnector::new(), ClusterConfig::new("db"))
    }

    #[tokio::test]
    async fn test_absent_and_empty_share_entry() {
        let cache = cache();
        let a = cache.acquire(None).await.unwrap();
        let b = cache.acquire(Some("")).await.unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.connector().connect_count(), 1);
        assert_eq!(a.options().node_filter, NodeFilter::All);
    }

    #[tokio::test]
    async fn test_repeat_acquire_returns_same_session() {
        let cache = cache();
        let first = cache.acquire(Some("10.0.0.2")).await.unwrap();
        let second = cache.acquire(Some("10.0.0.2")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.connector().connect_count(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_targets_get_distinct_sessions() {
        let cache = cache();
        let cluster = cache.acquire(None).await.unwrap();
        let pinned = cache.acquire(Some("10.0.0.3")).await.unwrap();
        assert!(!Arc::ptr_eq(&cluster, &pinned));
        assert_eq!(pinned.options().node_filter, NodeFilter::Only("10.0.0.3".into()));
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_connect_is_not_cached() {
        let cache = cache();
        cache.connector().make_unreachable("10.0.0.9");

        let err = cache.acquire(Some("10.0.0.9")).await.err().unwrap();
        assert!(matches!(err, Error::Connection(_)));
        assert!(!cache.contains(Some("10.0.0.9")));
        assert!(cache.is_empty());

        cache.connector().make_reachable("10.0.0.9");
        let session = cache.acquire(Some("10.0.0.9")).await.unwrap();
        assert_eq!(session.id(), 2);
        assert_eq!(cache.connector().connect_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_target_connects_once() {
        let cache = Arc::new(cache());
        cache.connector().set_connect_delay(Duration::from_millis(50));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move { cache.acquire(Some("n1")).await.unwrap() }));
        }
        let mut sessions = Vec::new();
        for handle in handles {
            sessions.push(handle.await.unwrap());
        }

        assert_eq!(cache.connector().connect_count(), 1);
        assert!(sessions.iter().all(|s| Arc::ptr_eq(s, &sessions[0])));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_targets_keep_their_own_filter() {
        let cache = Arc::new(cache());
        cache.connector().set_connect_delay(Duration::from_millis(20));

        let mut handles = Vec::new();
        for _ in 0..4 {
            for node in ["a", "b", ""] {
                let cache = cache.clone();
                handles.push(tokio::spawn(async move {
                    (node, cache.acquire(Some(node)).await.unwrap())
                }));
            }
        }

        for handle in handles {
            let (node, session) = handle.await.unwrap();
            let expected = if node.is_empty() {
                NodeFilter::All
            } else {
                NodeFilter::Only(node.to_string())
            };
            assert_eq!(session.options().node_filter, expected);
        }
        assert_eq!(cache.connector().connect_count(), 3);
    }

    #[tokio::test]
    async fn test_connect_timeout() {
        let connector = MemoryConnector::new();
        connector.set_connect_delay(Duration::from_millis(200));
        let cluster = ClusterConfig::new("db").with_connect_timeout(Duration::from_millis(10));
        let cache = SessionCache::new(connector, cluster);

        let err = cache.acquire(None).await.err().unwrap();
        assert!(matches!(err, Error::Timeout(_)));
        assert!(cache.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_all_during_connect_keeps_one_session_per_target() {
        let cache = Arc::new(cache());
        cache.connector().set_connect_delay(Duration::from_millis(100));

        let pending = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.acquire(Some("n1")).await.unwrap() })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(cache.close_all(), 0);

        let first = pending.await.unwrap();
        let second = cache.acquire(Some("n1")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.connector().connect_count(), 2);
    }

    #[tokio::test]
    async fn test_close_all_drops_sessions() {
        let cache = cache();
        cache.acquire(None).await.unwrap();
        cache.acquire(Some("n2")).await.unwrap();

        assert_eq!(cache.close_all(), 2);
        assert!(cache.is_empty());

        cache.acquire(None).await.unwrap();
        assert_eq!(cache.connector().connect_count(), 3);
    }
}
