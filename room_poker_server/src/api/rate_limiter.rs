//! Rate limiter for WebSocket message handling.
//!
//! Prevents DoS attacks by limiting the number of messages a client can send
//! within specific time windows.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Rate limiter using a sliding window algorithm
#[derive(Debug)]
pub struct RateLimiter {
    /// Timestamps of recent requests
    timestamps: VecDeque<Instant>,
    /// Maximum number of requests allowed in the window
    max_requests: usize,
    /// Time window for rate limiting
    window: Duration,
}

impl RateLimiter {
    /// Create a new rate limiter
    ///
    /// # Arguments
    ///
    /// * `max_requests` - Maximum number of requests allowed in the time window
    /// * `window` - Time window duration
    ///
    /// # Example
    ///
    /// ```
    /// use room_poker_server::api::rate_limiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// // Allow 10 requests per second
    /// let limiter = RateLimiter::new(10, Duration::from_secs(1));
    /// ```
    pub fn new(max_requests: usize, window: Duration) -> Self {
        Self {
            timestamps: VecDeque::with_capacity(max_requests),
            max_requests,
            window,
        }
    }

    /// Create a rate limiter for burst protection (10 messages per second)
    pub fn burst() -> Self {
        Self::new(10, Duration::from_secs(1))
    }

    /// Create a rate limiter for sustained usage (100 messages per minute)
    pub fn sustained() -> Self {
        Self::new(100, Duration::from_secs(60))
    }

    /// Check if a request should be allowed
    ///
    /// Returns `true` if the request is allowed, `false` if rate limit exceeded.
    ///
    /// # Example
    ///
    /// ```
    /// # use room_poker_server::api::rate_limiter::RateLimiter;
    /// # use std::time::Duration;
    /// let mut limiter = RateLimiter::new(5, Duration::from_secs(1));
    ///
    /// // First 5 requests allowed
    /// for _ in 0..5 {
    ///     assert!(limiter.check());
    /// }
    ///
    /// // 6th request blocked
    /// assert!(!limiter.check());
    /// ```
    pub fn check(&mut self) -> bool {
        let now = Instant::now();

        // Remove timestamps outside the window
        while let Some(ts) = self.timestamps.front() {
            if now.duration_since(*ts) > self.window {
                self.timestamps.pop_front();
            } else {
                break;
            }
        }

        // Check if limit exceeded
        if self.timestamps.len() >= self.max_requests {
            return false;
        }

        // Record this request
        self.timestamps.push_back(now);
        true
    }

    /// Get the number of requests in the current window
    #[allow(dead_code)]
    pub fn current_count(&self) -> usize {
        self.timestamps.len()
    }

    /// Get the number of remaining requests allowed in the current window
    #[allow(dead_code)]
    pub fn remaining(&self) -> usize {
        self.max_requests.saturating_sub(self.timestamps.len())
    }

    /// Get the time until the window resets (when the oldest request expires)
    ///
    /// Returns `None` if there are no requests in the current window.
    #[allow(dead_code)]
    pub fn reset_in(&self) -> Option<Duration> {
        self.timestamps.front().map(|oldest| {
            let elapsed = Instant::now().duration_since(*oldest);
            self.window.saturating_sub(elapsed)
        })
    }

    /// Reset the rate limiter (clear all timestamps)
    #[allow(dead_code)]
    pub fn reset(&mut self) {
        self.timestamps.clear();
    }
}
