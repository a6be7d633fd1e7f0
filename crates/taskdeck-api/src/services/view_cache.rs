//! In-process cache of rendered read views.
//!
//! Views are keyed by the page path they back (`/`, `/project/{id}`,
//! `/task/{id}`) and stored as serialized JSON. Writes call
//! [`ViewCache::revalidate`] for every path whose content they change; the
//! next read re-renders from the store.
//!
//! A render that was already running when its path was revalidated may
//! have read the old state, so its result is returned to that caller but
//! never stored.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `VIEW_CACHE_ENABLED`: Set to "false" to disable caching (default: true)
//! - `VIEW_CACHE_CAPACITY`: Maximum number of cached views (default: 256)

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use taskdeck_core::{defaults, EventBus, Result, ServerEvent};

/// Path of the project listing view.
pub const LISTING_PATH: &str = "/";

/// Path of a project detail view.
pub fn project_path(id: Uuid) -> String {
    format!("/project/{}", id)
}

/// Path of a task detail view.
pub fn task_path(id: Uuid) -> String {
    format!("/task/{}", id)
}

/// Cache statistics for monitoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub revalidations: u64,
}

/// LRU view cache shared by the services.
#[derive(Clone)]
pub struct ViewCache {
    inner: Arc<ViewCacheInner>,
}

struct ViewCacheInner {
    entries: Mutex<Entries>,
    stats: Mutex<CacheStats>,
    enabled: bool,
    events: Arc<EventBus>,
}

/// Stored views plus the renders currently filling them.
struct Entries {
    views: LruCache<String, Value>,
    /// Ticket of the latest in-flight render per path. Revalidation drops
    /// the ticket so that render's result is discarded.
    pending: HashMap<String, u64>,
    next_ticket: u64,
}

impl Entries {
    fn new(capacity: NonZeroUsize) -> Self {
        Self {
            views: LruCache::new(capacity),
            pending: HashMap::new(),
            next_ticket: 0,
        }
    }

    fn begin_render(&mut self, path: &str) -> u64 {
        self.next_ticket += 1;
        self.pending.insert(path.to_string(), self.next_ticket);
        self.next_ticket
    }

    /// Store `value` if no revalidation happened since `ticket` was issued.
    fn finish_render(&mut self, path: &str, ticket: u64, value: Option<&Value>) -> bool {
        if self.pending.get(path) != Some(&ticket) {
            return false;
        }
        self.pending.remove(path);
        match value {
            Some(value) => {
                self.views.put(path.to_string(), value.clone());
                true
            }
            None => false,
        }
    }
}

impl ViewCache {
    /// Create an enabled cache holding at most `capacity` views.
    pub fn new(capacity: usize, events: Arc<EventBus>) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self::build(Entries::new(capacity), true, events)
    }

    /// Create a cache that never stores anything but still emits revalidations.
    pub fn disabled(events: Arc<EventBus>) -> Self {
        Self::build(Entries::new(NonZeroUsize::MIN), false, events)
    }

    /// Create a cache from environment configuration.
    ///
    /// Reads:
    /// - `VIEW_CACHE_ENABLED` (default: true)
    /// - `VIEW_CACHE_CAPACITY` (default: 256)
    pub fn from_env(events: Arc<EventBus>) -> Self {
        let enabled = std::env::var("VIEW_CACHE_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);
        let capacity: usize = std::env::var("VIEW_CACHE_CAPACITY")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults::VIEW_CACHE_CAPACITY);

        if enabled {
            info!(capacity, "View cache enabled");
            Self::new(capacity, events)
        } else {
            info!("View cache disabled");
            Self::disabled(events)
        }
    }

    fn build(entries: Entries, enabled: bool, events: Arc<EventBus>) -> Self {
        Self {
            inner: Arc::new(ViewCacheInner {
                entries: Mutex::new(entries),
                stats: Mutex::new(CacheStats::default()),
                enabled,
                events,
            }),
        }
    }

    /// Check if caching is enabled.
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled
    }

    /// Return the cached view at `path`, rendering and storing it on a miss.
    ///
    /// Render errors are returned as-is and nothing is cached.
    pub async fn get_or_render<T, F, Fut>(&self, path: &str, render: F) -> Result<Value>
    where
        T: Serialize,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if !self.inner.enabled {
            self.inner.stats.lock().await.misses += 1;
            return Ok(serde_json::to_value(render().await?)?);
        }

        let ticket = {
            let mut entries = self.inner.entries.lock().await;
            let cached = entries.views.get(path).cloned();
            if let Some(hit) = cached {
                drop(entries);
                self.inner.stats.lock().await.hits += 1;
                debug!(subsystem = "view_cache", path, "Cache hit");
                return Ok(hit);
            }
            entries.begin_render(path)
        };
        self.inner.stats.lock().await.misses += 1;

        let rendered: Result<Value> = match render().await {
            Ok(view) => serde_json::to_value(view).map_err(Into::into),
            Err(e) => Err(e),
        };

        let stored = self.inner.entries.lock().await.finish_render(
            path,
            ticket,
            rendered.as_ref().ok(),
        );
        debug!(subsystem = "view_cache", path, stored, "Cache fill");
        rendered
    }

    /// Drop the view at `path` and announce it.
    pub async fn revalidate(&self, path: &str) {
        let dropped = {
            let mut entries = self.inner.entries.lock().await;
            entries.pending.remove(path);
            entries.views.pop(path).is_some()
        };
        self.inner.stats.lock().await.revalidations += 1;
        debug!(subsystem = "view_cache", path, dropped, "View revalidated");
        self.inner.events.emit(ServerEvent::ViewRevalidated {
            path: path.to_string(),
        });
    }

    /// Revalidate several paths, skipping duplicates.
    pub async fn revalidate_all<I>(&self, paths: I)
    where
        I: IntoIterator<Item = String>,
    {
        let mut seen = HashSet::new();
        for path in paths {
            if seen.insert(path.clone()) {
                self.revalidate(&path).await;
            }
        }
    }

    /// Whether a view is currently cached.
    pub async fn contains(&self, path: &str) -> bool {
        self.inner.entries.lock().await.views.contains(path)
    }

    /// Number of cached views.
    pub async fn len(&self) -> usize {
        self.inner.entries.lock().await.views.len()
    }

    /// Snapshot of hit/miss counters.
    pub async fn stats(&self) -> CacheStats {
        *self.inner.stats.lock().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn cache(capacity: usize) -> ViewCache {
        ViewCache::new(capacity, Arc::new(EventBus::new(16)))
    }

    #[tokio::test]
    async fn test_second_read_is_a_hit() {
        let cache = cache(8);
        let renders = AtomicUsize::new(0);

        for _ in 0..2 {
            let value = cache
                .get_or_render("/", || async {
                    renders.fetch_add(1, Ordering::SeqCst);
                    Ok(vec!["a", "b"])
                })
                .await
                .unwrap();
            assert_eq!(value, serde_json::json!(["a", "b"]));
        }

        assert_eq!(renders.load(Ordering::SeqCst), 1);
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_revalidate_drops_entry_and_emits() {
        let events = Arc::new(EventBus::new(16));
        let cache = ViewCache::new(8, events.clone());
        let mut rx = events.subscribe();

        cache.get_or_render("/", || async { Ok(1) }).await.unwrap();
        assert!(cache.contains("/").await);

        cache.revalidate("/").await;
        assert!(!cache.contains("/").await);

        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.event_type, "view.revalidated");
        assert_eq!(
            envelope.payload,
            ServerEvent::ViewRevalidated {
                path: "/".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_render_error_not_cached() {
        let cache = cache(8);
        let result = cache
            .get_or_render::<u32, _, _>("/task/x", || async {
                Err(taskdeck_core::Error::Internal("boom".into()))
            })
            .await;
        assert!(result.is_err());
        assert!(!cache.contains("/task/x").await);
    }

    #[tokio::test]
    async fn test_capacity_evicts_least_recent() {
        let cache = cache(2);
        for path in ["/a", "/b", "/c"] {
            cache.get_or_render(path, || async { Ok(0) }).await.unwrap();
        }
        assert_eq!(cache.len().await, 2);
        assert!(!cache.contains("/a").await);
        assert!(cache.contains("/c").await);
    }

    #[tokio::test]
    async fn test_disabled_cache_always_renders() {
        let cache = ViewCache::disabled(Arc::new(EventBus::new(16)));
        assert!(!cache.is_enabled());
        cache.get_or_render("/", || async { Ok(0) }).await.unwrap();
        assert!(!cache.contains("/").await);
        assert_eq!(cache.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn test_revalidate_all_dedupes() {
        let events = Arc::new(EventBus::new(16));
        let cache = ViewCache::new(8, events.clone());
        let mut rx = events.subscribe();

        cache
            .revalidate_all(vec!["/".to_string(), "/".to_string(), "/x".to_string()])
            .await;

        assert_eq!(rx.recv().await.unwrap().event_type, "view.revalidated");
        assert_eq!(rx.recv().await.unwrap().event_type, "view.revalidated");
        assert!(rx.try_recv().is_err());
        assert_eq!(cache.stats().await.revalidations, 2);
    }

    #[tokio::test]
    async fn test_revalidation_during_render_discards_result() {
        let cache = cache(8);
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let reader = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_render("/", move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok("old")
                    })
                    .await
            })
        };

        started_rx.await.unwrap();
        cache.revalidate("/").await;
        release_tx.send(()).unwrap();

        let in_flight = reader.await.unwrap().unwrap();
        assert_eq!(in_flight, serde_json::json!("old"));
        assert!(!cache.contains("/").await);

        let after = cache
            .get_or_render("/", || async { Ok("new") })
            .await
            .unwrap();
        assert_eq!(after, serde_json::json!("new"));
        assert!(cache.contains("/").await);
    }

    #[tokio::test]
    async fn test_overlapping_renders_store_latest_only() {
        let cache = cache(8);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();
        let (started_tx, started_rx) = tokio::sync::oneshot::channel::<()>();

        let slow = {
            let cache = cache.clone();
            tokio::spawn(async move {
                cache
                    .get_or_render("/", move || async move {
                        let _ = started_tx.send(());
                        let _ = release_rx.await;
                        Ok(1)
                    })
                    .await
            })
        };
        started_rx.await.unwrap();

        let fast = cache.get_or_render("/", || async { Ok(2) }).await.unwrap();
        assert_eq!(fast, serde_json::json!(2));

        release_tx.send(()).unwrap();
        slow.await.unwrap().unwrap();

        let cached = cache
            .get_or_render("/", || async { Ok(3) })
            .await
            .unwrap();
        assert_eq!(cached, serde_json::json!(2));
    }

    #[test]
    fn test_paths() {
        let id = Uuid::nil();
        assert_eq!(project_path(id), format!("/project/{}", id));
        assert_eq!(task_path(id), format!("/task/{}", id));
    }
}
