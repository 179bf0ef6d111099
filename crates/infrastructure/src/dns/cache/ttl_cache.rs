use super::clock::{Clock, SystemClock};
use super::metrics::{CacheMetrics, CacheMetricsSnapshot};
use dashmap::DashMap;
use hickory_proto::op::Message;
use hickory_proto::rr::Record;
use jsondns_application::ports::{CacheKey, ReplyCache};
use rustc_hash::FxBuildHasher;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

struct CachedReply {
    message: Message,
    stored_at: Instant,
    expires_at: Instant,
    last_access: AtomicU64,
}

impl CachedReply {
    #[inline]
    fn is_live_at(&self, now: Instant) -> bool {
        now < self.expires_at
    }

    /// The stored reply with every record TTL lowered by its time in cache.
    fn aged_copy(&self, now: Instant) -> Message {
        let age = u32::try_from(now.duration_since(self.stored_at).as_secs()).unwrap_or(u32::MAX);
        let mut message = self.message.clone();
        if age > 0 {
            age_records(message.answers_mut(), age);
            age_records(message.name_servers_mut(), age);
            age_records(message.additionals_mut(), age);
        }
        message
    }
}

fn age_records(records: &mut [Record], age: u32) {
    for record in records {
        let ttl = record.ttl().saturating_sub(age);
        record.set_ttl(ttl);
    }
}

/// Reply cache keyed by question, expiring each entry after its TTL.
///
/// Expiry is checked on every read; a stale entry is never returned even if
/// no sweep has removed it yet. Hits come back with record TTLs reduced by
/// the whole seconds the entry has spent in the cache.
///
/// With `max_entries > 0` an insert into a full cache first drops expired
/// entries and, failing that, the entry read or written least recently.
pub struct TtlCache {
    entries: DashMap<CacheKey, CachedReply, FxBuildHasher>,
    max_entries: usize,
    clock: Arc<dyn Clock>,
    access_seq: AtomicU64,
    metrics: Arc<CacheMetrics>,
}

impl TtlCache {
    pub fn new(max_entries: usize) -> Self {
        Self::with_clock(max_entries, Arc::new(SystemClock))
    }

    pub fn with_clock(max_entries: usize, clock: Arc<dyn Clock>) -> Self {
        info!(
            max_entries,
            bounded = max_entries > 0,
            "Initializing reply cache"
        );

        Self {
            entries: DashMap::with_hasher(FxBuildHasher),
            max_entries,
            clock,
            access_seq: AtomicU64::new(0),
            metrics: Arc::new(CacheMetrics::default()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Time left before `key` expires, `None` when absent or already stale.
    pub fn remaining_ttl(&self, key: &CacheKey) -> Option<Duration> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| entry.is_live_at(now))
            .map(|entry| entry.expires_at - now)
    }

    /// Drops every expired entry and returns how many went.
    pub fn sweep_expired(&self) -> usize {
        let now = self.clock.now();
        let mut removed = 0usize;

        self.entries.retain(|_, entry| {
            let live = entry.is_live_at(now);
            if !live {
                removed += 1;
            }
            live
        });

        if removed > 0 {
            self.metrics
                .expirations
                .fetch_add(removed as u64, AtomicOrdering::Relaxed);
            debug!(removed, remaining = self.entries.len(), "Swept expired replies");
        }
        removed
    }

    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot()
    }

    #[inline]
    fn next_seq(&self) -> u64 {
        self.access_seq.fetch_add(1, AtomicOrdering::Relaxed)
    }

    fn evict_least_recent(&self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|entry| entry.last_access.load(AtomicOrdering::Relaxed))
            .map(|entry| entry.key().clone());

        if let Some(key) = victim {
            if self.entries.remove(&key).is_some() {
                self.metrics.evictions.fetch_add(1, AtomicOrdering::Relaxed);
                debug!(key = %key, "Evicted least recently used reply");
            }
        }
    }

    fn make_room(&self, key: &CacheKey) {
        if self.max_entries == 0
            || self.entries.len() < self.max_entries
            || self.entries.contains_key(key)
        {
            return;
        }

        if self.sweep_expired() == 0 {
            self.evict_least_recent();
        }
    }
}

impl ReplyCache for TtlCache {
    fn get(&self, key: &CacheKey) -> Option<Message> {
        let now = self.clock.now();

        if let Some(entry) = self.entries.get(key) {
            if entry.is_live_at(now) {
                entry
                    .last_access
                    .store(self.next_seq(), AtomicOrdering::Relaxed);
                self.metrics.hits.fetch_add(1, AtomicOrdering::Relaxed);
                return Some(entry.aged_copy(now));
            }
            drop(entry);

            if self
                .entries
                .remove_if(key, |_, entry| !entry.is_live_at(now))
                .is_some()
            {
                self.metrics.expirations.fetch_add(1, AtomicOrdering::Relaxed);
            }
        }

        self.metrics.misses.fetch_add(1, AtomicOrdering::Relaxed);
        None
    }

    fn set(&self, key: CacheKey, reply: Message, ttl_secs: u32) {
        self.make_room(&key);

        let now = self.clock.now();
        let entry = CachedReply {
            message: reply,
            stored_at: now,
            expires_at: now + Duration::from_secs(u64::from(ttl_secs)),
            last_access: AtomicU64::new(self.next_seq()),
        };

        self.entries.insert(key, entry);
        self.metrics.insertions.fetch_add(1, AtomicOrdering::Relaxed);
    }
}
