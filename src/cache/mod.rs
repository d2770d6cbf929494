//! Kernel cache implementation
//!
//! LRU cache for combined kernel values keyed by document ids. Combined
//! kernels over symmetric evaluators are symmetric, so K(a, b) and K(b, a)
//! share one entry.

use lru::LruCache;
use std::num::NonZeroUsize;

/// Unordered document id pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct PairKey(usize, usize);

impl PairKey {
    fn new(a: usize, b: usize) -> Self {
        Self(a.min(b), a.max(b))
    }
}

/// LRU cache for kernel values between documents
pub struct KernelCache {
    cache: LruCache<PairKey, f64>,
    hits: u64,
    misses: u64,
}

impl KernelCache {
    /// Create a new kernel cache holding at most `capacity` values (minimum 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Return K(a, b) from the cache, computing and storing it on a miss
    ///
    /// Failed computations leave the cache unchanged.
    pub fn get_or_insert_with<E, F>(&mut self, a: usize, b: usize, compute: F) -> Result<f64, E>
    where
        F: FnOnce() -> Result<f64, E>,
    {
        let key = PairKey::new(a, b);
        if let Some(&value) = self.cache.get(&key) {
            self.hits += 1;
            return Ok(value);
        }
        self.misses += 1;
        let value = compute()?;
        self.cache.put(key, value);
        Ok(value)
    }

    /// Hit, miss and occupancy counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            size: self.cache.len(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(value: f64) -> impl FnOnce() -> Result<f64, ()> {
        move || Ok(value)
    }

    #[test]
    fn test_pair_key_is_unordered() {
        assert_eq!(PairKey::new(1, 5), PairKey::new(5, 1));
    }

    #[test]
    fn test_get_or_insert_with() {
        let mut cache = KernelCache::new(4);
        let mut calls = 0;

        let first: Result<f64, ()> = cache.get_or_insert_with(2, 7, || {
            calls += 1;
            Ok(1.25)
        });
        assert_eq!(first, Ok(1.25));

        // Symmetric access hits the same entry
        let second: Result<f64, ()> = cache.get_or_insert_with(7, 2, || {
            calls += 1;
            Ok(9.0)
        });
        assert_eq!(second, Ok(1.25));
        assert_eq!(calls, 1);
        assert_eq!(
            cache.stats(),
            CacheStats {
                hits: 1,
                misses: 1,
                size: 1
            }
        );

        // Failed computations are not cached
        let failed: Result<f64, &str> = cache.get_or_insert_with(3, 3, || Err("boom"));
        assert_eq!(failed, Err("boom"));
        assert_eq!(cache.stats().size, 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache = KernelCache::new(2);

        cache.get_or_insert_with(0, 1, fixed(1.0)).unwrap();
        cache.get_or_insert_with(1, 2, fixed(2.0)).unwrap();
        cache.get_or_insert_with(2, 3, fixed(3.0)).unwrap(); // Evicts (0,1)

        assert_eq!(cache.get_or_insert_with(2, 3, fixed(0.0)), Ok(3.0));
        assert_eq!(cache.get_or_insert_with(0, 1, fixed(0.0)), Ok(0.0));
    }

    #[test]
    fn test_zero_capacity_holds_one_value() {
        let mut cache = KernelCache::new(0);

        cache.get_or_insert_with(0, 1, fixed(1.0)).unwrap();
        assert_eq!(cache.get_or_insert_with(1, 0, fixed(0.0)), Ok(1.0));
        assert_eq!(cache.stats().size, 1);
    }
}
