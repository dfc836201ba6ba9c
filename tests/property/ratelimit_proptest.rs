//! Properties of the fixed-window limiter

use proptest::prelude::*;

use nordaun::backend::ratelimit::RateLimiter;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_limit_is_exact(limit in 1u64..40, window in 10u64..600) {
        let result = runtime().block_on(async {
            let limiter = RateLimiter::memory(limit, window);
            let mut allowed = 0;
            let mut last = None;
            for _ in 0..=limit {
                let result = limiter.check("198.51.100.1").await.unwrap();
                if result.allowed {
                    allowed += 1;
                }
                last = Some(result);
            }
            (allowed, last)
        });

        let (allowed, last) = result;
        let last = last.unwrap();
        prop_assert_eq!(allowed, limit);
        prop_assert!(!last.allowed);
        prop_assert_eq!(last.remaining, 0);
        prop_assert!(last.ttl <= window);
    }

    #[test]
    fn test_clients_are_counted_apart(limit in 1u64..10) {
        let other = runtime().block_on(async {
            let limiter = RateLimiter::memory(limit, 60);
            for _ in 0..=limit {
                limiter.check("198.51.100.1").await.unwrap();
            }
            limiter.check("198.51.100.2").await.unwrap()
        });
        prop_assert!(other.allowed);
        prop_assert_eq!(other.remaining, limit - 1);
    }
}
