//! Shared value cache for memoizing per-string and per-pair sub-results.
//!
//! A fixed-capacity open-addressed table of 64-bit keys mapped to f32 values.
//! There is no chaining: a colliding store silently overwrites the previous
//! entry, and callers treat the cache as pure memoization that may forget.
//! A readers-writer lock guards the slots; hit/miss counters live on atomics
//! so `load` only ever takes the shared side.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::RwLock;

/// Subsystem tag mixed into the slot index and compared on load, so callers
/// sharing a key cannot read each other's values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u16)]
pub enum CacheId {
    /// Whole-comparison results when the global cache is enabled.
    Compare = 1,
    /// Compressed length of a single string.
    CompressStr = 2,
    /// Compressed length of a concatenated pair.
    CompressPair = 3,
    /// Self-distances of the distance substitution kernel.
    KernDistance = 4,
    /// Kernel self-values used by L2 normalization.
    Norm = 5,
    /// Kernel self-values of the kernel-based distance.
    DistKernel = 6,
}

#[derive(Clone, Copy, Default)]
struct Entry {
    key: u64,
    id: u16,
    val: f32,
}

/// Usage counters reported by [`VCache::stats`].
#[derive(Debug, Clone, Copy)]
pub struct CacheStats {
    pub entries: usize,
    pub used_mb: f64,
    pub total_mb: f64,
    /// Hit rate in percent; 0 when the cache has not been queried.
    pub hit_rate: f64,
}

pub struct VCache {
    slots: RwLock<Vec<Entry>>,
    space: usize,
    size: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl VCache {
    /// Create a cache using roughly `mb` megabytes of entry storage.
    pub fn with_capacity_mb(mb: usize) -> Self {
        let entry_size = std::mem::size_of::<Entry>();
        let space = ((mb << 20) / entry_size).max(1);
        log::info!("initializing cache with {mb} MB ({space} entries)");
        VCache {
            slots: RwLock::new(vec![Entry::default(); space]),
            space,
            size: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    #[inline]
    fn index(&self, key: u64, id: CacheId) -> usize {
        ((key ^ id as u64) % self.space as u64) as usize
    }

    /// Store a value under `key` for the given subsystem. Collisions
    /// overwrite whatever occupied the slot.
    pub fn store(&self, key: u64, value: f32, id: CacheId) {
        let idx = self.index(key, id);
        let mut slots = self.slots.write();
        if slots[idx].key == 0 {
            self.size.fetch_add(1, Ordering::Relaxed);
        }
        slots[idx] = Entry {
            key,
            id: id as u16,
            val: value,
        };
    }

    /// Load the value stored under `key` for the given subsystem, if the
    /// slot still holds it.
    pub fn load(&self, key: u64, id: CacheId) -> Option<f32> {
        let idx = self.index(key, id);
        let slots = self.slots.read();
        let entry = slots[idx];
        if entry.key == key && entry.id == id as u16 {
            self.hits.fetch_add(1, Ordering::Relaxed);
            Some(entry.val)
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            None
        }
    }

    /// Drop every entry without releasing the slot storage.
    pub fn invalidate(&self) {
        let mut slots = self.slots.write();
        for entry in slots.iter_mut() {
            entry.key = 0;
        }
        self.size.store(0, Ordering::Relaxed);
    }

    pub fn stats(&self) -> CacheStats {
        let entry_size = std::mem::size_of::<Entry>() as f64;
        let entries = self.size.load(Ordering::Relaxed);
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        CacheStats {
            entries,
            used_mb: entries as f64 * entry_size / (1024.0 * 1024.0),
            total_mb: self.space as f64 * entry_size / (1024.0 * 1024.0),
            hit_rate: if total <= 0.0 { 0.0 } else { 100.0 * hits / total },
        }
    }

    /// Log a one-line usage summary, in the shape the driver prints after a
    /// run.
    pub fn log_info(&self) {
        let s = self.stats();
        log::info!(
            "cache stats: {:.1} MB used by {} entries, hits {:3.0}%, {:.1} MB total",
            s.used_mb,
            s.entries,
            s.hit_rate,
            s.total_mb
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let cache = VCache::with_capacity_mb(1);
        cache.store(42, 1.5, CacheId::Compare);
        assert_eq!(cache.load(42, CacheId::Compare), Some(1.5));
    }

    #[test]
    fn ids_partition_the_key_space() {
        let cache = VCache::with_capacity_mb(1);
        cache.store(42, 1.0, CacheId::Compare);
        // Same key under a different id neither hits nor corrupts.
        assert_eq!(cache.load(42, CacheId::Norm), None);
        cache.store(42, 2.0, CacheId::Norm);
        assert_eq!(cache.load(42, CacheId::Compare), Some(1.0));
        assert_eq!(cache.load(42, CacheId::Norm), Some(2.0));
    }

    #[test]
    fn collisions_overwrite_silently() {
        let cache = VCache::with_capacity_mb(1);
        let space = cache.space as u64;
        let key1 = 7u64;
        let key2 = key1 + space; // same slot by construction
        cache.store(key1, 1.0, CacheId::Compare);
        cache.store(key2, 2.0, CacheId::Compare);
        assert_eq!(cache.load(key1, CacheId::Compare), None);
        assert_eq!(cache.load(key2, CacheId::Compare), Some(2.0));
    }

    #[test]
    fn invalidate_clears_entries() {
        let cache = VCache::with_capacity_mb(1);
        cache.store(9, 3.0, CacheId::DistKernel);
        cache.invalidate();
        assert_eq!(cache.load(9, CacheId::DistKernel), None);
        assert_eq!(cache.stats().entries, 0);
    }

    #[test]
    fn stats_track_hits_and_misses() {
        let cache = VCache::with_capacity_mb(1);
        cache.store(1, 0.5, CacheId::Compare);
        assert!(cache.load(1, CacheId::Compare).is_some());
        assert!(cache.load(2, CacheId::Compare).is_none());
        let s = cache.stats();
        assert_eq!(s.entries, 1);
        assert!((s.hit_rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn concurrent_store_load() {
        use std::sync::Arc;
        let cache = Arc::new(VCache::with_capacity_mb(1));
        let mut handles = Vec::new();
        for t in 0..4u64 {
            let cache = Arc::clone(&cache);
            handles.push(std::thread::spawn(move || {
                for i in 1..500u64 {
                    let key = t * 1000 + i;
                    cache.store(key, i as f32, CacheId::Compare);
                    // A racing overwrite may evict the entry; a hit must
                    // return the stored value.
                    if let Some(v) = cache.load(key, CacheId::Compare) {
                        assert_eq!(v, i as f32);
                    }
                }
            }));
        }
        for h in handles {
            h.join().unwrap();
        }
    }
}
