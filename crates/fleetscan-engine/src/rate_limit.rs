//! Process-wide token-bucket rate limiter.
//!
//! One instance is shared by every worker of every job, because the
//! constraint being protected is the downstream endpoint, not any single
//! job. `acquire` suspends the caller until a token is available; it
//! never rejects.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Token bucket with capacity `requests_per_minute` refilling
/// continuously at the same rate per 60 seconds.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<Bucket>,
    capacity: f64,
    refill_per_second: f64,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn refill(&mut self, capacity: f64, refill_per_second: f64) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_per_second).min(capacity);
        self.last_refill = now;
    }
}

impl RateLimiter {
    /// Create a limiter allowing `requests_per_minute` sustained
    /// acquisitions, with the same burst capacity.
    pub fn per_minute(requests_per_minute: u32) -> Self {
        let capacity = f64::from(requests_per_minute.max(1));
        Self {
            state: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
            capacity,
            refill_per_second: capacity / 60.0,
        }
    }

    /// Take one token, suspending until one is available.
    ///
    /// The mutex queues waiters in arrival order and is held across the
    /// refill wait, which gives FIFO fairness: no waiter can be starved
    /// by later arrivals.
    pub async fn acquire(&self) {
        let mut bucket = self.state.lock().await;
        bucket.refill(self.capacity, self.refill_per_second);
        if bucket.tokens < 1.0 {
            let deficit = 1.0 - bucket.tokens;
            let wait = Duration::from_secs_f64(deficit / self.refill_per_second);
            tokio::time::sleep(wait).await;
            bucket.refill(self.capacity, self.refill_per_second);
        }
        bucket.tokens = (bucket.tokens - 1.0).max(0.0);
    }
}
