//! Unit tests for the TTL cache.

use super::TtlCache;
use crate::test_support::ManualClock;
use chrono::TimeDelta;
use rstest::{fixture, rstest};
use std::num::NonZeroUsize;
use std::sync::Arc;

struct CacheContext {
    clock: Arc<ManualClock>,
    cache: TtlCache<&'static str, u32, ManualClock>,
}

#[fixture]
fn context() -> CacheContext {
    let clock = Arc::new(ManualClock::monday_morning());
    let capacity = NonZeroUsize::new(2).expect("non-zero capacity");
    let cache = TtlCache::new(TimeDelta::seconds(30), capacity, Arc::clone(&clock));
    CacheContext { clock, cache }
}

#[rstest]
fn live_entries_are_returned(mut context: CacheContext) {
    context.cache.insert("a", 1);
    context.clock.advance(TimeDelta::seconds(29));

    assert_eq!(context.cache.get(&"a"), Some(1));
}

#[rstest]
fn expired_entries_are_removed_on_read(mut context: CacheContext) {
    context.cache.insert("a", 1);
    context.clock.advance(TimeDelta::seconds(30));

    assert_eq!(context.cache.get(&"a"), None);
    assert!(context.cache.is_empty());
}

#[rstest]
fn full_cache_purges_expired_entries_first(mut context: CacheContext) {
    context.cache.insert("old", 1);
    context.clock.advance(TimeDelta::seconds(20));
    context.cache.insert("fresh", 2);
    context.clock.advance(TimeDelta::seconds(15));

    context.cache.insert("new", 3);

    assert_eq!(context.cache.len(), 2);
    assert_eq!(context.cache.get(&"old"), None);
    assert_eq!(context.cache.get(&"fresh"), Some(2));
    assert_eq!(context.cache.get(&"new"), Some(3));
}

#[rstest]
fn full_cache_evicts_entry_closest_to_expiry(mut context: CacheContext) {
    context.cache.insert("first", 1);
    context.clock.advance(TimeDelta::seconds(5));
    context.cache.insert("second", 2);

    context.cache.insert("third", 3);

    assert_eq!(context.cache.get(&"first"), None);
    assert_eq!(context.cache.get(&"second"), Some(2));
    assert_eq!(context.cache.get(&"third"), Some(3));
}

#[rstest]
fn replacing_a_key_does_not_evict(mut context: CacheContext) {
    context.cache.insert("a", 1);
    context.cache.insert("b", 2);

    context.cache.insert("a", 10);

    assert_eq!(context.cache.get(&"a"), Some(10));
    assert_eq!(context.cache.get(&"b"), Some(2));
}

#[rstest]
fn invalidation_removes_selected_entries(mut context: CacheContext) {
    context.cache.insert("a", 1);
    context.cache.insert("b", 2);

    assert_eq!(context.cache.invalidate(&"a"), Some(1));
    assert_eq!(context.cache.get(&"a"), None);

    context.cache.invalidate_where(|_, value| *value == 2);
    assert!(context.cache.is_empty());
}

#[rstest]
fn clear_drops_everything(mut context: CacheContext) {
    context.cache.insert("a", 1);
    context.cache.insert("b", 2);

    context.cache.clear();

    assert!(context.cache.is_empty());
}

#[rstest]
fn fill_started_before_invalidation_is_discarded(mut context: CacheContext) {
    let seen = context.cache.generation();

    context.cache.invalidate(&"a");
    let stored = context.cache.insert_if_unchanged("a", 1, seen);

    assert!(!stored);
    assert_eq!(context.cache.get(&"a"), None);
}

#[rstest]
fn fill_without_intervening_invalidation_is_stored(mut context: CacheContext) {
    let seen = context.cache.generation();

    let stored = context.cache.insert_if_unchanged("a", 2, seen);

    assert!(stored);
    assert_eq!(context.cache.get(&"a"), Some(2));
}
