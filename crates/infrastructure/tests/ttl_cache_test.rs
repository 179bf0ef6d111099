use hickory_proto::op::{Message, MessageType, OpCode, Query};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{Name, RData, Record, RecordType};
use jsondns_application::ports::{CacheKey, ReplyCache};
use jsondns_infrastructure::dns::cache::{ManualClock, TtlCache};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

fn reply(id: u16, name: &str, addr: Ipv4Addr) -> Message {
    let owner = Name::from_str(name).unwrap();
    let mut message = Message::new(id, MessageType::Response, OpCode::Query);
    message.add_query(Query::query(owner.clone(), RecordType::A));
    message.add_answer(Record::from_rdata(owner, 300, RData::A(A(addr))));
    message
}

fn key(domain: &str) -> CacheKey {
    CacheKey::new(domain, "A")
}

fn manual_cache(max_entries: usize) -> (TtlCache, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    (TtlCache::with_clock(max_entries, clock.clone()), clock)
}

// ── expiry ─────────────────────────────────────────────────────────────────

#[test]
fn test_entry_served_until_ttl_elapses() {
    let (cache, clock) = manual_cache(0);
    let stored = reply(1, "example.com.", Ipv4Addr::new(93, 184, 216, 34));
    cache.set(key("example.com"), stored.clone(), 300);

    clock.advance(Duration::from_secs(299));
    let hit = cache.get(&key("example.com")).expect("entry should still be live");
    assert_eq!(hit.answers(), stored.answers());
    assert_eq!(hit.queries(), stored.queries());

    clock.advance(Duration::from_secs(1));
    assert!(cache.get(&key("example.com")).is_none());
}

#[test]
fn test_hit_ttls_count_down_with_time_in_cache() {
    let (cache, clock) = manual_cache(0);
    let mut stored = reply(1, "example.com.", Ipv4Addr::new(93, 184, 216, 34));
    stored.add_name_server(Record::from_rdata(
        Name::from_str("example.com.").unwrap(),
        30,
        RData::A(A(Ipv4Addr::new(10, 0, 0, 53))),
    ));
    cache.set(key("example.com"), stored, 300);

    assert_eq!(cache.get(&key("example.com")).unwrap().answers()[0].ttl(), 300);

    clock.advance(Duration::from_millis(100_500));
    let hit = cache.get(&key("example.com")).unwrap();
    assert_eq!(hit.answers()[0].ttl(), 200);
    assert_eq!(hit.name_servers()[0].ttl(), 0);
}

#[test]
fn test_overwrite_restarts_ttl_countdown() {
    let (cache, clock) = manual_cache(0);
    cache.set(key("example.com"), reply(1, "example.com.", Ipv4Addr::LOCALHOST), 300);

    clock.advance(Duration::from_secs(120));
    cache.set(key("example.com"), reply(2, "example.com.", Ipv4Addr::LOCALHOST), 300);

    let hit = cache.get(&key("example.com")).unwrap();
    assert_eq!(hit.answers()[0].ttl(), 300);
}

#[test]
fn test_ten_second_entry_expires_exactly_at_ten_seconds() {
    let (cache, clock) = manual_cache(0);
    cache.set(key("nottl.example"), reply(1, "nottl.example.", Ipv4Addr::LOCALHOST), 10);

    clock.advance(Duration::from_millis(9_999));
    assert!(cache.get(&key("nottl.example")).is_some());

    clock.advance(Duration::from_millis(1));
    assert!(cache.get(&key("nottl.example")).is_none());
}

#[test]
fn test_zero_ttl_is_never_served() {
    let (cache, _clock) = manual_cache(0);
    cache.set(key("example.com"), reply(1, "example.com.", Ipv4Addr::LOCALHOST), 0);
    assert!(cache.get(&key("example.com")).is_none());
}

#[test]
fn test_get_returns_independent_copy() {
    let (cache, _clock) = manual_cache(0);
    cache.set(key("example.com"), reply(1, "example.com.", Ipv4Addr::LOCALHOST), 60);

    let mut first = cache.get(&key("example.com")).unwrap();
    let mut header = *first.header();
    header.set_id(999);
    first.set_header(header);

    let second = cache.get(&key("example.com")).unwrap();
    assert_eq!(second.id(), 1);
}

#[test]
fn test_overwrite_replaces_reply_and_expiry() {
    let (cache, clock) = manual_cache(0);
    cache.set(key("example.com"), reply(1, "example.com.", Ipv4Addr::new(10, 0, 0, 1)), 5);
    cache.set(key("example.com"), reply(2, "example.com.", Ipv4Addr::new(10, 0, 0, 2)), 60);

    clock.advance(Duration::from_secs(30));
    let hit = cache.get(&key("example.com")).unwrap();
    assert_eq!(hit.id(), 2);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_key_ignores_case_and_trailing_dot() {
    let (cache, _clock) = manual_cache(0);
    cache.set(
        CacheKey::new("Example.COM.", "a"),
        reply(1, "example.com.", Ipv4Addr::LOCALHOST),
        60,
    );

    assert!(cache.get(&CacheKey::new("example.com", "A")).is_some());
}

// ── sweeping and capacity ──────────────────────────────────────────────────

#[test]
fn test_sweep_removes_only_expired() {
    let (cache, clock) = manual_cache(0);
    cache.set(key("short.example"), reply(1, "short.example.", Ipv4Addr::LOCALHOST), 5);
    cache.set(key("long.example"), reply(2, "long.example.", Ipv4Addr::LOCALHOST), 500);

    clock.advance(Duration::from_secs(10));
    assert_eq!(cache.sweep_expired(), 1);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&key("long.example")).is_some());
    assert_eq!(cache.metrics_snapshot().expirations, 1);
}

#[test]
fn test_full_cache_prefers_dropping_expired_entries() {
    let (cache, clock) = manual_cache(2);
    cache.set(key("stale.example"), reply(1, "stale.example.", Ipv4Addr::LOCALHOST), 1);
    cache.set(key("fresh.example"), reply(2, "fresh.example.", Ipv4Addr::LOCALHOST), 600);

    clock.advance(Duration::from_secs(2));
    cache.set(key("new.example"), reply(3, "new.example.", Ipv4Addr::LOCALHOST), 600);

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&key("fresh.example")).is_some());
    assert!(cache.get(&key("new.example")).is_some());
    assert_eq!(cache.metrics_snapshot().evictions, 0);
}

#[test]
fn test_full_cache_evicts_least_recently_used() {
    let (cache, _clock) = manual_cache(2);
    cache.set(key("a.example"), reply(1, "a.example.", Ipv4Addr::LOCALHOST), 600);
    cache.set(key("b.example"), reply(2, "b.example.", Ipv4Addr::LOCALHOST), 600);

    // Touch "a" so "b" becomes the oldest.
    assert!(cache.get(&key("a.example")).is_some());

    cache.set(key("c.example"), reply(3, "c.example.", Ipv4Addr::LOCALHOST), 600);

    assert_eq!(cache.len(), 2);
    assert!(cache.get(&key("a.example")).is_some());
    assert!(cache.get(&key("b.example")).is_none());
    assert!(cache.get(&key("c.example")).is_some());
    assert_eq!(cache.metrics_snapshot().evictions, 1);
}

#[test]
fn test_overwrite_in_full_cache_does_not_evict() {
    let (cache, _clock) = manual_cache(1);
    cache.set(key("a.example"), reply(1, "a.example.", Ipv4Addr::LOCALHOST), 600);
    cache.set(key("a.example"), reply(2, "a.example.", Ipv4Addr::LOCALHOST), 600);

    assert_eq!(cache.len(), 1);
    assert_eq!(cache.metrics_snapshot().evictions, 0);
}

// ── metrics ────────────────────────────────────────────────────────────────

#[test]
fn test_metrics_count_hits_misses_and_insertions() {
    let (cache, _clock) = manual_cache(0);
    cache.set(key("example.com"), reply(1, "example.com.", Ipv4Addr::LOCALHOST), 60);

    cache.get(&key("example.com"));
    cache.get(&key("example.com"));
    cache.get(&key("other.example"));

    let snapshot = cache.metrics_snapshot();
    assert_eq!(snapshot.insertions, 1);
    assert_eq!(snapshot.hits, 2);
    assert_eq!(snapshot.misses, 1);
    assert!((snapshot.hit_rate() - 66.666).abs() < 0.01);
}

#[test]
fn test_concurrent_access_is_safe() {
    let cache = Arc::new(TtlCache::new(0));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let cache = Arc::clone(&cache);
            std::thread::spawn(move || {
                for j in 0..200 {
                    let name = format!("host{}.example", j % 20);
                    cache.set(
                        CacheKey::new(&name, "A"),
                        reply(i, &format!("{}.", name), Ipv4Addr::LOCALHOST),
                        60,
                    );
                    cache.get(&CacheKey::new(&name, "A"));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(cache.len(), 20);
}
