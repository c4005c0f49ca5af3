use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::clock::Clock;

/// Reference capacity of the membership cache.
pub const DEFAULT_MAX_SIZE: usize = 10_000;
/// Reference recency window: 5 minutes.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Dedup cache configuration.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub max_size: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            ttl: DEFAULT_TTL,
        }
    }
}

/// State of a cached fingerprint.
///
/// A reservation is pending between the membership check and the stream
/// append of one publish call. It already blocks concurrent publishes of
/// the same fingerprint, and is either confirmed after a successful append
/// or released so a later retry is not treated as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntryState {
    Pending,
    Committed,
}

/// One slot in the insertion-order queue.
#[derive(Debug, Clone)]
struct CacheEntry {
    fingerprint: String,
    inserted_at_ms: u64,
}

#[derive(Default)]
struct CacheInner {
    /// Membership map, authoritative: fingerprint to insertion time and state.
    entries: HashMap<String, (u64, EntryState)>,
    /// FIFO insertion order for expiry and eviction. May carry stale slots
    /// left behind by `release`; they are skipped lazily by checking the
    /// timestamp against the map.
    order: VecDeque<CacheEntry>,
}

/// Bounded membership cache of recently published fingerprints.
///
/// Size-limited with FIFO eviction of the oldest 30% when full, and
/// time-limited by a lazy TTL sweep run at the start of each publish
/// attempt. All operations take one internal lock, so they are atomic with
/// respect to each other under concurrent callers.
pub struct DedupCache {
    inner: Mutex<CacheInner>,
    max_size: usize,
    ttl_ms: u64,
    clock: Arc<dyn Clock>,
}

impl DedupCache {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Mutex::new(CacheInner::default()),
            max_size: config.max_size.max(1),
            ttl_ms: config.ttl.as_millis() as u64,
            clock,
        }
    }

    /// Whether the fingerprint is currently resident (pending or committed).
    pub fn contains(&self, fingerprint: &str) -> bool {
        self.inner.lock().unwrap().entries.contains_key(fingerprint)
    }

    /// Number of resident fingerprints.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record a fingerprint directly, stamped with the current time.
    pub fn insert(&self, fingerprint: &str) {
        let mut inner = self.inner.lock().unwrap();
        if !inner.entries.contains_key(fingerprint) && inner.entries.len() >= self.max_size {
            Self::evict_oldest(&mut inner, self.max_size);
        }
        self.insert_locked(&mut inner, fingerprint, EntryState::Committed);
    }

    /// Atomically reserve a fingerprint if it is not already resident.
    ///
    /// Returns false when the fingerprint is present, whether committed or
    /// reserved by a concurrent publish of the same event. A reservation
    /// never evicts: capacity is enforced at `confirm`, so releasing a
    /// failed publish leaves the cache exactly as it found it.
    pub fn try_reserve(&self, fingerprint: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.contains_key(fingerprint) {
            return false;
        }
        self.insert_locked(&mut inner, fingerprint, EntryState::Pending);
        true
    }

    /// Mark a reservation as committed after a successful append.
    ///
    /// This is the moment the entry really joins the cache, so the
    /// capacity bound is enforced here: if the committed population was at
    /// or above the limit, the oldest 30% are evicted first. The entry
    /// being confirmed is the newest slot and is never among them.
    pub fn confirm(&self, fingerprint: &str) {
        let mut inner = self.inner.lock().unwrap();
        if inner.entries.len() > self.max_size {
            Self::evict_oldest(&mut inner, self.max_size);
        }
        if let Some(entry) = inner.entries.get_mut(fingerprint) {
            entry.1 = EntryState::Committed;
        }
    }

    /// Drop a pending reservation after a failed append.
    ///
    /// Committed entries are untouched; the matching queue slot becomes
    /// stale and is skipped by later sweeps.
    pub fn release(&self, fingerprint: &str) {
        let mut inner = self.inner.lock().unwrap();
        let is_pending = matches!(
            inner.entries.get(fingerprint),
            Some(&(_, EntryState::Pending))
        );
        if is_pending {
            inner.entries.remove(fingerprint);
        }
    }

    /// Remove every entry whose age exceeds the TTL.
    ///
    /// Insertion order is also time order, so sweeping stops at the first
    /// live entry that is still fresh.
    pub fn sweep_expired(&self) {
        let now = self.clock.now_ms();
        let mut inner = self.inner.lock().unwrap();
        loop {
            let remove_entry = match inner.order.front() {
                None => break,
                Some(slot) => match inner.entries.get(&slot.fingerprint) {
                    Some(&(inserted_at_ms, _)) if inserted_at_ms == slot.inserted_at_ms => {
                        if now.saturating_sub(inserted_at_ms) > self.ttl_ms {
                            true
                        } else {
                            break;
                        }
                    }
                    // Stale slot: released or re-inserted since. Discard it.
                    _ => false,
                },
            };
            if let Some(slot) = inner.order.pop_front() {
                if remove_entry {
                    inner.entries.remove(&slot.fingerprint);
                }
            }
        }
    }

    fn insert_locked(&self, inner: &mut CacheInner, fingerprint: &str, state: EntryState) {
        let now = self.clock.now_ms();
        inner
            .entries
            .insert(fingerprint.to_string(), (now, state));
        inner.order.push_back(CacheEntry {
            fingerprint: fingerprint.to_string(),
            inserted_at_ms: now,
        });
    }

    /// Evict the oldest 30% of resident entries in insertion order.
    fn evict_oldest(inner: &mut CacheInner, max_size: usize) {
        let target = (max_size * 3 / 10).max(1);
        let mut evicted = 0;
        while evicted < target {
            let Some(slot) = inner.order.pop_front() else {
                break;
            };
            let live = matches!(
                inner.entries.get(&slot.fingerprint),
                Some(&(inserted_at_ms, _)) if inserted_at_ms == slot.inserted_at_ms
            );
            if live {
                inner.entries.remove(&slot.fingerprint);
                evicted += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn cache_with_clock(max_size: usize, ttl: Duration) -> (DedupCache, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000));
        let cache = DedupCache::new(CacheConfig { max_size, ttl }, clock.clone());
        (cache, clock)
    }

    #[test]
    fn test_insert_and_contains() {
        let (cache, _clock) = cache_with_clock(10, Duration::from_secs(300));

        assert!(!cache.contains("fp-a"));
        cache.insert("fp-a");
        assert!(cache.contains("fp-a"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_sweep_removes_only_expired() {
        let (cache, clock) = cache_with_clock(10, Duration::from_millis(500));

        cache.insert("fp-old");
        clock.advance(400);
        cache.insert("fp-new");

        clock.advance(200); // fp-old is 600ms old, fp-new 200ms
        cache.sweep_expired();

        assert!(!cache.contains("fp-old"));
        assert!(cache.contains("fp-new"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_entry_at_exact_ttl_is_retained() {
        let (cache, clock) = cache_with_clock(10, Duration::from_millis(500));

        cache.insert("fp-a");
        clock.advance(500);
        cache.sweep_expired();

        assert!(cache.contains("fp-a"));
    }

    #[test]
    fn test_capacity_bound_and_fifo_eviction() {
        let (cache, _clock) = cache_with_clock(10, Duration::from_secs(300));

        for i in 0..10 {
            cache.insert(&format!("fp-{i}"));
        }
        assert_eq!(cache.len(), 10);

        cache.insert("fp-10");

        // Oldest 30% (three entries) evicted before the new insertion.
        assert_eq!(cache.len(), 8);
        for i in 0..3 {
            assert!(!cache.contains(&format!("fp-{i}")));
        }
        for i in 3..10 {
            assert!(cache.contains(&format!("fp-{i}")));
        }
        assert!(cache.contains("fp-10"));
    }

    #[test]
    fn test_cache_never_exceeds_max_size() {
        let (cache, _clock) = cache_with_clock(50, Duration::from_secs(300));

        for i in 0..500 {
            cache.insert(&format!("fp-{i}"));
            assert!(cache.len() <= 50);
        }
    }

    #[test]
    fn test_reserve_blocks_second_caller() {
        let (cache, _clock) = cache_with_clock(10, Duration::from_secs(300));

        assert!(cache.try_reserve("fp-a"));
        assert!(!cache.try_reserve("fp-a"));
        assert!(cache.contains("fp-a"));
    }

    #[test]
    fn test_release_frees_reservation() {
        let (cache, _clock) = cache_with_clock(10, Duration::from_secs(300));

        assert!(cache.try_reserve("fp-a"));
        cache.release("fp-a");

        assert!(!cache.contains("fp-a"));
        assert!(cache.try_reserve("fp-a"));
    }

    #[test]
    fn test_released_reservation_leaves_full_cache_unchanged() {
        let (cache, _clock) = cache_with_clock(10, Duration::from_secs(300));
        for i in 0..10 {
            cache.insert(&format!("fp-{i}"));
        }

        // A reservation against a full cache must not evict anything a
        // failed publish cannot restore.
        assert!(cache.try_reserve("fp-new"));
        cache.release("fp-new");

        assert_eq!(cache.len(), 10);
        for i in 0..10 {
            assert!(cache.contains(&format!("fp-{i}")));
        }
    }

    #[test]
    fn test_confirm_at_capacity_evicts_oldest() {
        let (cache, _clock) = cache_with_clock(10, Duration::from_secs(300));
        for i in 0..10 {
            cache.insert(&format!("fp-{i}"));
        }

        assert!(cache.try_reserve("fp-new"));
        cache.confirm("fp-new");

        assert_eq!(cache.len(), 8);
        for i in 0..3 {
            assert!(!cache.contains(&format!("fp-{i}")));
        }
        for i in 3..10 {
            assert!(cache.contains(&format!("fp-{i}")));
        }
        assert!(cache.contains("fp-new"));
    }

    #[test]
    fn test_release_leaves_committed_entries() {
        let (cache, _clock) = cache_with_clock(10, Duration::from_secs(300));

        assert!(cache.try_reserve("fp-a"));
        cache.confirm("fp-a");
        cache.release("fp-a");

        assert!(cache.contains("fp-a"));
    }

    #[test]
    fn test_stale_slots_do_not_corrupt_sweep() {
        let (cache, clock) = cache_with_clock(10, Duration::from_millis(500));

        assert!(cache.try_reserve("fp-a"));
        cache.release("fp-a");
        cache.insert("fp-b");

        clock.advance(600);
        cache.sweep_expired();

        assert!(cache.is_empty());
    }

    #[test]
    fn test_reinsert_refreshes_timestamp() {
        let (cache, clock) = cache_with_clock(10, Duration::from_millis(500));

        cache.insert("fp-a");
        clock.advance(300);
        cache.insert("fp-a");

        // The original stamp is now past the TTL, the refreshed one is not.
        clock.advance(300);
        cache.sweep_expired();

        assert!(cache.contains("fp-a"));
        assert_eq!(cache.len(), 1);
    }
}
