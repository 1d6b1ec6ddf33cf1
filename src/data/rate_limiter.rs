use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

use crate::config::DF;

/// Per-minute request-weight budget shared by every REST caller.
/// Cloning shares the same budget.
#[derive(Clone)]
pub struct GlobalRateLimiter {
    inner: Arc<Mutex<InnerLimiter>>,
}

struct InnerLimiter {
    used_weight: u32,
    // Minutes since epoch the budget is currently counting for
    current_minute_idx: u64,
    limit: u32,
}

impl GlobalRateLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            inner: Arc::new(Mutex::new(InnerLimiter {
                used_weight: 0,
                current_minute_idx: Self::get_current_minute_idx(),
                limit,
            })),
        }
    }

    /// Waits until `cost` weight fits in the current minute, then spends it.
    /// A cost larger than the whole budget is clamped so it cannot wait forever.
    pub async fn acquire(&self, cost: u32, context: &str) {
        loop {
            let (wait_duration, stats) = {
                let mut guard = self.inner.lock().await;
                let now_idx = Self::get_current_minute_idx();
                let cost = cost.min(guard.limit);

                // New wall-clock minute resets the budget
                if now_idx > guard.current_minute_idx {
                    guard.used_weight = 0;
                    guard.current_minute_idx = now_idx;
                }

                if guard.used_weight + cost <= guard.limit {
                    guard.used_weight += cost;
                    return;
                }

                let now_secs = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .unwrap_or(Duration::ZERO)
                    .as_secs();

                let wait_secs = 60 - now_secs % 60;

                // Small buffer so we land inside the next minute
                let wait = Duration::from_secs(wait_secs) + Duration::from_millis(100);

                (wait, (guard.used_weight, guard.limit))
            };

            log::warn!(
                "🛑 Rate Limit Saturated for [{}]. Used: {}/{}. Waiting {:.1}s (until :00)...",
                context,
                stats.0,
                stats.1,
                wait_duration.as_secs_f64()
            );

            tokio::time::sleep(wait_duration).await;
        }
    }

    pub async fn used_weight(&self) -> u32 {
        let guard = self.inner.lock().await;
        if Self::get_current_minute_idx() > guard.current_minute_idx {
            0
        } else {
            guard.used_weight
        }
    }

    fn get_current_minute_idx() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or(Duration::ZERO)
            .as_secs()
            / 60
    }
}

impl Default for GlobalRateLimiter {
    fn default() -> Self {
        let limit = crate::config::BINANCE.limits.weight_limit_minute;
        if DF.log_kline_paging {
            log::info!("Rate limiter budget: {} weight/minute", limit);
        }
        Self::new(limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn spends_weight_within_budget() {
        let limiter = GlobalRateLimiter::new(10);
        limiter.acquire(2, "test").await;
        limiter.acquire(3, "test").await;
        let used = limiter.used_weight().await;
        // A minute boundary may have passed between calls
        assert!(used == 5 || used == 3 || used == 0);
    }

    #[tokio::test]
    async fn clones_share_the_budget() {
        let a = GlobalRateLimiter::new(100);
        let b = a.clone();
        a.acquire(1, "a").await;
        b.acquire(1, "b").await;
        assert!(b.used_weight().await <= 2);
        assert_eq!(a.used_weight().await, b.used_weight().await);
    }
}
