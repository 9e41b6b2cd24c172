//! Rate limiting middleware
//!
//! Sliding-window limiter used to throttle sign-in attempts per peer.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Simple rate limiter
pub struct RateLimiter {
    requests: HashMap<String, Vec<Instant>>,
    max_requests: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            requests: HashMap::new(),
            max_requests,
            window,
        }
    }

    /// Records an attempt by `client_id` unless it is over the limit.
    pub fn is_allowed(&mut self, client_id: &str) -> bool {
        self.is_allowed_at(client_id, Instant::now())
    }

    fn is_allowed_at(&mut self, client_id: &str, now: Instant) -> bool {
        let entry = self.requests.entry(client_id.to_string()).or_default();

        entry.retain(|&time| now.duration_since(time) <= self.window);

        if entry.len() < self.max_requests {
            entry.push(now);
            true
        } else {
            false
        }
    }

    /// Applies new limits; recorded attempts are kept.
    pub fn reconfigure(&mut self, max_requests: usize, window: Duration) {
        self.max_requests = max_requests;
        self.window = window;
    }

    /// Drops clients with no attempt inside the window.
    pub fn prune(&mut self) {
        let now = Instant::now();
        let window = self.window;
        self.requests.retain(|_, attempts| {
            attempts.retain(|&time| now.duration_since(time) <= window);
            !attempts.is_empty()
        });
    }
}
