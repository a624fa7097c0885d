//! LRU memo for projected coordinates.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::types::Point;

/// Cache key: the bit patterns of the raw coordinate pair.
pub type ProjectionKey = (u64, u64);

/// Memo of `(x, y) -> projection(x, y)`.
///
/// Entries are only ever recomputed after eviction, so the memo must be
/// cleared whenever the projection function changes.
pub struct ProjectionCache {
    cache: LruCache<ProjectionKey, Point>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ProjectionCache {
    /// Create a memo holding at most `capacity` entries (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub fn key(x: f64, y: f64) -> ProjectionKey {
        (x.to_bits(), y.to_bits())
    }

    /// Return the memoized projection of `(x, y)`, computing it on a miss.
    pub fn project<F>(&mut self, x: f64, y: f64, projection: F) -> Point
    where
        F: FnOnce(f64, f64) -> (f64, f64),
    {
        let key = Self::key(x, y);
        if let Some(point) = self.cache.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return *point;
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        let point = Point::from(projection(x, y));
        self.cache.put(key, point);
        point
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    /// Get the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Clear all entries from the cache.
    pub fn clear(&mut self) {
        self.cache.clear();
    }
}

impl std::fmt::Debug for ProjectionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectionCache")
            .field("entries", &self.cache.len())
            .field("capacity", &self.cache.cap())
            .field("hits", &self.hits())
            .field("misses", &self.misses())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_memoized() {
        let mut cache = ProjectionCache::new(16);
        let mut calls = 0;

        let p = cache.project(1.0, 2.0, |x, y| {
            calls += 1;
            (x * 10.0, y * 10.0)
        });
        assert_eq!(p, Point::new(10.0, 20.0));

        let p = cache.project(1.0, 2.0, |_, _| {
            calls += 1;
            (0.0, 0.0)
        });
        assert_eq!(p, Point::new(10.0, 20.0));
        assert_eq!(calls, 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_lru_eviction_recomputes() {
        let mut cache = ProjectionCache::new(2);
        cache.project(0.0, 0.0, |x, y| (x, y));
        cache.project(1.0, 0.0, |x, y| (x, y));
        cache.project(2.0, 0.0, |x, y| (x, y));
        assert_eq!(cache.len(), 2);

        // (0, 0) was evicted
        cache.project(0.0, 0.0, |x, y| (x, y));
        assert_eq!(cache.misses(), 4);
    }

    #[test]
    fn test_negative_zero_is_a_distinct_key() {
        assert_ne!(ProjectionCache::key(0.0, 0.0), ProjectionCache::key(-0.0, 0.0));
    }

    #[test]
    fn test_clear() {
        let mut cache = ProjectionCache::new(4);
        cache.project(1.0, 1.0, |x, y| (x, y));
        assert!(!cache.is_empty());
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let mut cache = ProjectionCache::new(0);
        cache.project(1.0, 1.0, |x, y| (x, y));
        assert_eq!(cache.len(), 1);
    }
}
