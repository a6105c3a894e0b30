use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep, Duration, Instant};

/// Paces outgoing market data requests.
///
/// Financial Modeling Prep meters calls per API key, so every request made by
/// [`crate::external::financial_modeling::FinancialModelingProvider`] goes
/// through `acquire` first. Two limits apply:
/// * at most `max_in_flight` requests at once
/// * at least `60s / requests_per_minute` between request starts
pub struct RateLimiter {
    in_flight: Arc<Semaphore>,
    next_slot: Mutex<Instant>,
    spacing: Duration,
}

impl RateLimiter {
    pub fn new(max_in_flight: usize, requests_per_minute: u32) -> Self {
        let per_minute = requests_per_minute.max(1) as u64;
        Self {
            in_flight: Arc::new(Semaphore::new(max_in_flight.max(1))),
            next_slot: Mutex::new(Instant::now()),
            spacing: Duration::from_millis(60_000 / per_minute),
        }
    }

    /// Waits for a free slot. The returned guard releases it on drop.
    pub async fn acquire(&self) -> RateLimitGuard {
        // The semaphore is never closed, so acquisition only fails if the
        // limiter itself is gone; fall back to an unthrottled guard then.
        let permit = self.in_flight.clone().acquire_owned().await.ok();

        // Reserve a start time under the lock, sleep outside it.
        let start_at = {
            let mut next = self.next_slot.lock();
            let now = Instant::now();
            let slot = if *next > now { *next } else { now };
            *next = slot + self.spacing;
            slot
        };

        let now = Instant::now();
        if start_at > now {
            sleep(start_at - now).await;
        }

        RateLimitGuard { _permit: permit }
    }

    pub fn available_permits(&self) -> usize {
        self.in_flight.available_permits()
    }
}

pub struct RateLimitGuard {
    _permit: Option<OwnedSemaphorePermit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_request_is_immediate_and_second_is_spaced() {
        // 60 per minute -> one second apart
        let limiter = RateLimiter::new(2, 60);
        let start = Instant::now();

        let first = limiter.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
        drop(first);

        let _second = limiter.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_guard_holds_in_flight_slot() {
        let limiter = RateLimiter::new(1, 6_000);

        let guard = limiter.acquire().await;
        assert_eq!(limiter.available_permits(), 0);
        drop(guard);
        assert_eq!(limiter.available_permits(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_callers_all_complete() {
        let limiter = Arc::new(RateLimiter::new(2, 600));

        let handles: Vec<_> = (0..3)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move {
                    let _guard = limiter.acquire().await;
                    sleep(Duration::from_millis(20)).await;
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(limiter.available_permits(), 2);
    }
}
