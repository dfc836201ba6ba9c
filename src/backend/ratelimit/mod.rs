//! Fixed-window rate limiting per client IP
//!
//! Each IP owns a counter `rate-limit:{ip}` that expires one window after
//! its first hit. Requests beyond the limit inside that window are refused
//! until the counter expires.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use tokio::sync::Mutex;

/// Outcome of a single limiter check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub limit: u64,
    pub remaining: u64,
    /// Seconds until the window resets
    pub ttl: u64,
    /// RFC 3339 instant of the reset
    pub reset: String,
}

#[derive(Clone, Debug)]
enum LimiterBackend {
    Memory(Arc<Mutex<HashMap<String, (u64, Instant)>>>),
    Redis(Pool),
}

/// Tracked clients above which every memory hit first drops expired windows
const SWEEP_THRESHOLD: usize = 10_000;

#[derive(Clone, Debug)]
pub struct RateLimiter {
    limit: u64,
    window: u64,
    sweep_at: usize,
    backend: LimiterBackend,
}

impl RateLimiter {
    pub fn memory(limit: u64, window_secs: u64) -> Self {
        Self {
            limit,
            window: window_secs,
            sweep_at: SWEEP_THRESHOLD,
            backend: LimiterBackend::Memory(Arc::default()),
        }
    }

    pub fn redis(pool: Pool, limit: u64, window_secs: u64) -> Self {
        Self {
            limit,
            window: window_secs,
            sweep_at: SWEEP_THRESHOLD,
            backend: LimiterBackend::Redis(pool),
        }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// Drop in-process counters whose window has passed
    ///
    /// Returns how many were dropped. Redis expires its own keys.
    pub async fn sweep_expired(&self) -> usize {
        match &self.backend {
            LimiterBackend::Memory(counters) => {
                let mut counters = counters.lock().await;
                let before = counters.len();
                let now = Instant::now();
                counters.retain(|_, (_, expires)| *expires > now);
                before - counters.len()
            }
            LimiterBackend::Redis(_) => 0,
        }
    }

    /// Count one request from `ip` and report whether it may proceed
    pub async fn check(&self, ip: &str) -> anyhow::Result<RateLimitResult> {
        let key = format!("rate-limit:{ip}");
        let (count, ttl) = match &self.backend {
            LimiterBackend::Memory(counters) => self.hit_memory(counters, key).await,
            LimiterBackend::Redis(pool) => self.hit_redis(pool, &key).await?,
        };

        let ttl = if ttl < 0 { self.window } else { ttl as u64 };
        let reset = Utc::now() + chrono::Duration::seconds(ttl as i64);

        Ok(RateLimitResult {
            allowed: count <= self.limit,
            limit: self.limit,
            remaining: self.limit.saturating_sub(count),
            ttl,
            reset: reset.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        })
    }

    async fn hit_memory(
        &self,
        counters: &Mutex<HashMap<String, (u64, Instant)>>,
        key: String,
    ) -> (u64, i64) {
        let now = Instant::now();
        let mut counters = counters.lock().await;
        if counters.len() >= self.sweep_at && !counters.contains_key(&key) {
            counters.retain(|_, (_, expires)| *expires > now);
        }
        let entry = counters
            .entry(key)
            .or_insert((0, now + Duration::from_secs(self.window)));
        if entry.1 <= now {
            *entry = (0, now + Duration::from_secs(self.window));
        }
        entry.0 += 1;
        let ttl = entry.1.saturating_duration_since(now).as_secs_f64().ceil() as i64;
        (entry.0, ttl)
    }

    async fn hit_redis(&self, pool: &Pool, key: &str) -> anyhow::Result<(u64, i64)> {
        let mut conn = pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("failed to get redis connection: {e}"))?;

        let count: u64 = conn
            .incr(key, 1)
            .await
            .map_err(|e| anyhow::anyhow!("redis INCR failed for key `{key}`: {e}"))?;
        if count == 1 {
            let _: bool = conn
                .expire(key, self.window as i64)
                .await
                .map_err(|e| anyhow::anyhow!("redis EXPIRE failed for key `{key}`: {e}"))?;
        }
        let ttl: i64 = conn
            .ttl(key)
            .await
            .map_err(|e| anyhow::anyhow!("redis TTL failed for key `{key}`: {e}"))?;

        Ok((count, ttl))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refuses_after_limit() {
        let limiter = RateLimiter::memory(3, 100);
        for expected_remaining in [2, 1, 0] {
            let result = limiter.check("10.0.0.1").await.unwrap();
            assert!(result.allowed);
            assert_eq!(result.remaining, expected_remaining);
        }

        let blocked = limiter.check("10.0.0.1").await.unwrap();
        assert!(!blocked.allowed);
        assert_eq!(blocked.remaining, 0);
        assert!(blocked.ttl > 0 && blocked.ttl <= 100);
    }

    #[tokio::test]
    async fn test_counts_per_ip() {
        let limiter = RateLimiter::memory(1, 100);
        assert!(limiter.check("a").await.unwrap().allowed);
        assert!(!limiter.check("a").await.unwrap().allowed);
        assert!(limiter.check("b").await.unwrap().allowed);
    }

    #[tokio::test]
    async fn test_window_expiry_resets_counter() {
        let limiter = RateLimiter::memory(1, 0);
        assert!(limiter.check("a").await.unwrap().allowed);
        assert!(limiter.check("a").await.unwrap().allowed);
    }

    async fn tracked(limiter: &RateLimiter) -> usize {
        match &limiter.backend {
            LimiterBackend::Memory(counters) => counters.lock().await.len(),
            LimiterBackend::Redis(_) => unreachable!(),
        }
    }

    #[tokio::test]
    async fn test_rotating_clients_do_not_accumulate() {
        let mut limiter = RateLimiter::memory(5, 0);
        limiter.sweep_at = 4;
        for i in 0..50 {
            limiter.check(&format!("203.0.113.{i}")).await.unwrap();
        }
        assert!(tracked(&limiter).await <= 4);
    }

    #[tokio::test]
    async fn test_sweep_keeps_live_windows() {
        let live = RateLimiter::memory(5, 100);
        live.check("a").await.unwrap();
        live.check("b").await.unwrap();
        assert_eq!(live.sweep_expired().await, 0);
        assert_eq!(tracked(&live).await, 2);

        let expired = RateLimiter::memory(5, 0);
        expired.check("a").await.unwrap();
        expired.check("b").await.unwrap();
        assert_eq!(expired.sweep_expired().await, 2);
        assert_eq!(tracked(&expired).await, 0);
    }

    #[tokio::test]
    async fn test_reset_is_rfc3339() {
        let limiter = RateLimiter::memory(5, 60);
        let result = limiter.check("a").await.unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&result.reset).is_ok());
        assert_eq!(result.limit, 5);
    }
}
