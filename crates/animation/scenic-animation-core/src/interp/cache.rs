use crate::config::Config;
use crate::interp::bezier::Bezier;
use crate::vector::Vector;
use crate::AnimationError;
use log::trace;
use lru::LruCache;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cache key: the four control values (compared bit for bit) plus table size.
#[derive(Debug, Clone)]
pub struct CurveKey<V: Vector> {
    controls: [V; 4],
    subdivisions: usize,
}

impl<V: Vector> CurveKey<V> {
    #[inline]
    pub fn new(begin: V, out: V, r#in: V, end: V, subdivisions: usize) -> Self {
        Self {
            controls: [begin, out, r#in, end],
            subdivisions,
        }
    }
}

impl<V: Vector> Hash for CurveKey<V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.subdivisions);
        for control in &self.controls {
            control.hash_bits(state);
        }
    }
}

impl<V: Vector> PartialEq for CurveKey<V> {
    fn eq(&self, other: &Self) -> bool {
        self.subdivisions == other.subdivisions
            && self
                .controls
                .iter()
                .zip(other.controls.iter())
                .all(|(a, b)| a.bits_eq(b))
    }
}

impl<V: Vector> Eq for CurveKey<V> {}

/// Hit/miss counters for the curve cache
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

impl CacheStats {
    /// Get cache hit rate
    #[inline]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

struct CacheState<V: Vector> {
    entries: LruCache<CurveKey<V>, Arc<Bezier<V>>>,
    bytes: usize,
    stats: CacheStats,
}

/// Shared, byte-budgeted LRU cache of Bezier curves.
///
/// Owned explicitly and handed to interpolators as `Arc<CurveCache<V>>`.
/// A single mutex guards lookups, inserts and evictions; curves are built
/// outside the lock and only published once complete.
pub struct CurveCache<V: Vector> {
    budget_bytes: usize,
    state: Mutex<CacheState<V>>,
}

impl<V: Vector> CurveCache<V> {
    pub fn new(budget_bytes: usize) -> Self {
        Self {
            budget_bytes,
            state: Mutex::new(CacheState {
                entries: LruCache::unbounded(),
                bytes: 0,
                stats: CacheStats::default(),
            }),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.curve_cache_bytes)
    }

    #[inline]
    fn lock(&self) -> MutexGuard<'_, CacheState<V>> {
        // State is only touched with fully built curves; still consistent if poisoned.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Look up a curve, marking it most recently used.
    pub fn get(&self, key: &CurveKey<V>) -> Option<Arc<Bezier<V>>> {
        let mut state = self.lock();
        let cached = state.entries.get(key).cloned();
        match cached {
            Some(curve) => {
                state.stats.hits += 1;
                trace!("curve cache hit ({} entries)", state.entries.len());
                Some(curve)
            }
            None => {
                state.stats.misses += 1;
                None
            }
        }
    }

    /// Publish a fully built curve. If another caller won the race for the
    /// same key, the already published curve is returned instead.
    pub fn insert(&self, key: CurveKey<V>, curve: Arc<Bezier<V>>) -> Arc<Bezier<V>> {
        let mut state = self.lock();
        if let Some(existing) = state.entries.get(&key) {
            return existing.clone();
        }

        let size = curve.approx_bytes();
        if size > self.budget_bytes {
            trace!(
                "curve cache skipped a {}-sample curve ({} bytes over a {} byte budget)",
                curve.subdivisions(),
                size,
                self.budget_bytes
            );
            return curve;
        }

        state.bytes += size;
        state.entries.put(key, curve.clone());

        while state.bytes > self.budget_bytes {
            match state.entries.pop_lru() {
                Some((_, evicted)) => {
                    state.bytes -= evicted.approx_bytes();
                    state.stats.evictions += 1;
                    trace!(
                        "curve cache evicted a {}-sample curve ({} bytes in use)",
                        evicted.subdivisions(),
                        state.bytes
                    );
                }
                None => break,
            }
        }
        curve
    }

    /// Return the cached curve for these controls, building it on a miss.
    pub fn get_or_build(
        &self,
        begin: &V,
        out: &V,
        r#in: &V,
        end: &V,
        subdivisions: usize,
    ) -> Result<Arc<Bezier<V>>, AnimationError> {
        let key = CurveKey::new(
            begin.clone(),
            out.clone(),
            r#in.clone(),
            end.clone(),
            subdivisions,
        );
        if let Some(curve) = self.get(&key) {
            return Ok(curve);
        }

        let curve = Arc::new(Bezier::new(
            begin.clone(),
            out.clone(),
            r#in.clone(),
            end.clone(),
            subdivisions,
        )?);
        Ok(self.insert(key, curve))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes currently accounted to cached curves.
    #[inline]
    pub fn bytes(&self) -> usize {
        self.lock().bytes
    }

    #[inline]
    pub fn budget_bytes(&self) -> usize {
        self.budget_bytes
    }

    #[inline]
    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }

    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.bytes = 0;
    }
}

impl<V: Vector> Default for CurveCache<V> {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl<V: Vector> fmt::Debug for CurveCache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("CurveCache")
            .field("budget_bytes", &self.budget_bytes)
            .field("bytes", &state.bytes)
            .field("len", &state.entries.len())
            .field("stats", &state.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector::{frame_point, FramePoint};

    fn build(cache: &CurveCache<FramePoint>, y: f64) -> Arc<Bezier<FramePoint>> {
        cache
            .get_or_build(
                &frame_point(0.0, 0.0),
                &frame_point(1.0, y),
                &frame_point(2.0, y),
                &frame_point(3.0, 0.0),
                64,
            )
            .unwrap()
    }

    #[test]
    fn equal_controls_share_a_curve() {
        let cache = CurveCache::new(1 << 20);
        let first = build(&cache, 1.0);
        let second = build(&cache, 1.0);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn budget_evicts_least_recently_used() {
        let sample = build(&CurveCache::new(1 << 20), 0.0);
        let per_curve = sample.approx_bytes();

        let cache = CurveCache::new(per_curve * 2);
        let a = build(&cache, 1.0);
        build(&cache, 2.0);
        // touch `a` so `2.0` becomes the oldest
        assert!(Arc::ptr_eq(&a, &build(&cache, 1.0)));
        build(&cache, 3.0);

        assert_eq!(cache.len(), 2);
        assert!(cache.bytes() <= cache.budget_bytes());
        assert_eq!(cache.stats().evictions, 1);
        let a_again = build(&cache, 1.0);
        assert!(Arc::ptr_eq(&a, &a_again));
    }

    #[test]
    fn oversized_curve_is_returned_but_not_kept() {
        let sample = build(&CurveCache::new(1 << 20), 0.0);
        let cache = CurveCache::new(sample.approx_bytes() * 3);
        build(&cache, 1.0);
        build(&cache, 2.0);
        let bytes = cache.bytes();

        let huge = cache
            .get_or_build(
                &frame_point(0.0, 0.0),
                &frame_point(1.0, 9.0),
                &frame_point(2.0, 9.0),
                &frame_point(3.0, 0.0),
                100_000,
            )
            .unwrap();
        assert_eq!(huge.subdivisions(), 100_000);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.bytes(), bytes);
        assert_eq!(cache.stats().evictions, 0);

        let tiny = CurveCache::new(16);
        build(&tiny, 5.0);
        assert!(tiny.is_empty());
        assert_eq!(tiny.bytes(), 0);
    }

    #[test]
    fn insert_keeps_first_published() {
        let cache = CurveCache::new(1 << 20);
        let key = CurveKey::new(0.0, 1.0, 2.0, 3.0, 8);
        let first = Arc::new(Bezier::new(0.0, 1.0, 2.0, 3.0, 8).unwrap());
        let second = Arc::new(Bezier::new(0.0, 1.0, 2.0, 3.0, 8).unwrap());
        let published = cache.insert(key.clone(), first.clone());
        assert!(Arc::ptr_eq(&published, &first));
        let raced = cache.insert(key, second);
        assert!(Arc::ptr_eq(&raced, &first));
    }

    #[test]
    fn clear_resets_usage() {
        let cache = CurveCache::new(1 << 20);
        build(&cache, 1.0);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.bytes(), 0);
    }

    #[test]
    fn shared_across_threads() {
        let cache = Arc::new(CurveCache::<f64>::new(1 << 20));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache
                        .get_or_build(&0.0, &2.0, &8.0, &10.0, 128)
                        .unwrap()
                        .point_at(0.5)
                        .unwrap()
                })
            })
            .collect();
        let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(results.windows(2).all(|w| w[0] == w[1]));
        assert_eq!(cache.len(), 1);
    }
}
