//! Signature caches owned by the configuration provider.

use std::fmt;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }
}

impl ManualClock {
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[derive(Debug)]
struct Slot<S, T> {
    signature: S,
    value: T,
    checked_at: Instant,
}

/// One cached value, tagged with the signature of the inputs it was built from
/// and the instant that signature was last confirmed.
#[derive(Debug)]
pub struct SignatureCache<S, T> {
    slot: Mutex<Option<Slot<S, T>>>,
}

impl<S, T> Default for SignatureCache<S, T> {
    fn default() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }
}

impl<S, T> SignatureCache<S, T>
where
    S: PartialEq,
    T: Clone,
{
    /// The cached value if its signature was confirmed less than `window` ago.
    pub fn fresh(&self, now: Instant, window: Duration) -> Option<T> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref()
            .filter(|s| now.saturating_duration_since(s.checked_at) < window)
            .map(|s| s.value.clone())
    }

    /// The cached value if it was built from `signature`; re-confirms it at `now`.
    pub fn matching(&self, signature: &S, now: Instant) -> Option<T> {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let hit = slot.as_mut().filter(|s| &s.signature == signature)?;
        hit.checked_at = now;
        Some(hit.value.clone())
    }

    pub fn store(&self, signature: S, value: T, now: Instant) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Slot {
            signature,
            value,
            checked_at: now,
        });
    }

    pub fn clear(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_expires_after_window() {
        let clock = ManualClock::default();
        let cache: SignatureCache<u32, &str> = SignatureCache::default();
        cache.store(1, "a", clock.now());

        assert_eq!(cache.fresh(clock.now(), Duration::from_secs(1)), Some("a"));
        clock.advance(Duration::from_millis(1000));
        assert_eq!(cache.fresh(clock.now(), Duration::from_secs(1)), None);
    }

    #[test]
    fn zero_window_is_never_fresh() {
        let clock = ManualClock::default();
        let cache: SignatureCache<u32, &str> = SignatureCache::default();
        cache.store(1, "a", clock.now());
        assert_eq!(cache.fresh(clock.now(), Duration::ZERO), None);
    }

    #[test]
    fn matching_signature_renews_the_window() {
        let clock = ManualClock::default();
        let cache: SignatureCache<u32, &str> = SignatureCache::default();
        cache.store(7, "v", clock.now());
        clock.advance(Duration::from_secs(5));

        assert_eq!(cache.matching(&8, clock.now()), None);
        assert_eq!(cache.matching(&7, clock.now()), Some("v"));
        assert_eq!(cache.fresh(clock.now(), Duration::from_secs(1)), Some("v"));
    }

    #[test]
    fn clear_drops_the_slot() {
        let clock = ManualClock::default();
        let cache: SignatureCache<u32, &str> = SignatureCache::default();
        cache.store(1, "a", clock.now());
        cache.clear();
        assert_eq!(cache.matching(&1, clock.now()), None);
    }
}
