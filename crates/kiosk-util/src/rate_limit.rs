//! Rate limiting utilities

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Fixed-window request limiter, one window per key.
///
/// kioskd keys it by `ClientId` so a wedged front end cannot hammer the
/// account store with purchase requests.
#[derive(Debug)]
pub struct RateLimiter<K> {
    max_requests: u32,
    window: Duration,
    windows: HashMap<K, Window>,
}

#[derive(Debug)]
struct Window {
    opened_at: Instant,
    used: u32,
}

impl<K: Eq + Hash + Clone> RateLimiter<K> {
    /// Allow `max_requests` per `window` for every key.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            windows: HashMap::new(),
        }
    }

    /// Record a request from `key` and report whether it is allowed.
    pub fn check(&mut self, key: &K) -> bool {
        self.check_at(key, Instant::now())
    }

    fn check_at(&mut self, key: &K, now: Instant) -> bool {
        let window = self.windows.entry(key.clone()).or_insert(Window {
            opened_at: now,
            used: 0,
        });

        if now.duration_since(window.opened_at) >= self.window {
            window.opened_at = now;
            window.used = 0;
        }

        if window.used < self.max_requests {
            window.used += 1;
            true
        } else {
            false
        }
    }

    /// Forget a key, e.g. when its client disconnects
    pub fn remove(&mut self, key: &K) {
        self.windows.remove(key);
    }

    /// Number of keys currently tracked
    pub fn tracked(&self) -> usize {
        self.windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientId;

    #[test]
    fn allows_up_to_limit_then_denies() {
        let mut limiter = RateLimiter::new(3, Duration::from_secs(1));
        let client = ClientId::new();

        assert!(limiter.check(&client));
        assert!(limiter.check(&client));
        assert!(limiter.check(&client));
        assert!(!limiter.check(&client));
    }

    #[test]
    fn keys_are_limited_independently() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(1));
        let a = ClientId::new();
        let b = ClientId::new();

        assert!(limiter.check(&a));
        assert!(!limiter.check(&a));
        assert!(limiter.check(&b));
    }

    #[test]
    fn window_reopens_after_interval() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(1));
        let start = Instant::now();

        assert!(limiter.check_at(&"front", start));
        assert!(!limiter.check_at(&"front", start + Duration::from_millis(500)));
        assert!(limiter.check_at(&"front", start + Duration::from_secs(1)));
    }

    #[test]
    fn remove_forgets_key() {
        let mut limiter = RateLimiter::new(1, Duration::from_secs(60));
        assert!(limiter.check(&7u32));
        assert_eq!(limiter.tracked(), 1);

        limiter.remove(&7u32);
        assert_eq!(limiter.tracked(), 0);
        assert!(limiter.check(&7u32));
    }
}
