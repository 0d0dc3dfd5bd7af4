//! Rate limiting for relayed messages.
//!
//! Two independent token buckets, one per direction. Buckets are lock-free
//! `governor` limiters, so both routers can consume concurrently without
//! double-spending a token.

use std::num::NonZeroU32;

use governor::clock::{Clock, DefaultClock};
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use tracing::warn;

use crate::config::types::{BucketConfig, RateLimitConfig};

/// Direction a message is travelling in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDirection {
    /// Chat room -> remote.
    ToRemote,
    /// Remote -> chat room.
    ToChatroom,
}

type Bucket<C> = RateLimiter<NotKeyed, InMemoryState, C, NoOpMiddleware<<C as Clock>::Instant>>;

/// Per-direction rate gate. A disabled direction always allows.
pub struct RateGate<C: Clock = DefaultClock> {
    to_remote: Option<Bucket<C>>,
    to_chatroom: Option<Bucket<C>>,
}

impl RateGate<DefaultClock> {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self::with_clock(config, &DefaultClock::default())
    }
}

impl<C: Clock> RateGate<C> {
    /// Build the gate on an explicit clock.
    pub fn with_clock(config: &RateLimitConfig, clock: &C) -> Self {
        Self {
            to_remote: build_bucket("to_remote", &config.to_remote, clock),
            to_chatroom: build_bucket("to_chatroom", &config.to_chatroom, clock),
        }
    }

    /// Try to take one token for `direction`.
    ///
    /// Never blocks: returns `false` when the bucket is empty right now.
    pub fn try_consume(&self, direction: RateDirection) -> bool {
        let bucket = match direction {
            RateDirection::ToRemote => &self.to_remote,
            RateDirection::ToChatroom => &self.to_chatroom,
        };
        match bucket {
            Some(limiter) => limiter.check().is_ok(),
            None => true,
        }
    }

    /// Whether limiting is enabled for `direction`.
    pub fn is_enabled(&self, direction: RateDirection) -> bool {
        match direction {
            RateDirection::ToRemote => self.to_remote.is_some(),
            RateDirection::ToChatroom => self.to_chatroom.is_some(),
        }
    }
}

fn build_bucket<C: Clock>(name: &str, config: &BucketConfig, clock: &C) -> Option<Bucket<C>> {
    if !config.enabled {
        return None;
    }
    match quota(config) {
        Some(quota) => Some(RateLimiter::direct_with_clock(quota, clock)),
        None => {
            warn!(
                "Invalid rate limit for {} (rate {}, capacity {}), limiting disabled",
                name, config.rate, config.capacity
            );
            None
        }
    }
}

/// Quota refilling `rate` tokens per second with a burst of `capacity`.
fn quota(config: &BucketConfig) -> Option<Quota> {
    let capacity = NonZeroU32::new(config.capacity)?;
    let period = config.refill_period()?;
    Quota::with_period(period).map(|q| q.allow_burst(capacity))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use governor::clock::FakeRelativeClock;

    fn config(rate: f64, capacity: u32) -> RateLimitConfig {
        RateLimitConfig {
            to_remote: BucketConfig {
                enabled: true,
                rate,
                capacity,
            },
            to_chatroom: BucketConfig::default(),
        }
    }

    #[test]
    fn test_disabled_direction_always_allows() {
        let clock = FakeRelativeClock::default();
        let gate = RateGate::with_clock(&config(1.0, 1), &clock);

        assert!(!gate.is_enabled(RateDirection::ToChatroom));
        for _ in 0..100 {
            assert!(gate.try_consume(RateDirection::ToChatroom));
        }
    }

    #[test]
    fn test_exhaust_then_refill() {
        let clock = FakeRelativeClock::default();
        let gate = RateGate::with_clock(&config(1.0, 2), &clock);

        assert!(gate.try_consume(RateDirection::ToRemote));
        assert!(gate.try_consume(RateDirection::ToRemote));
        assert!(!gate.try_consume(RateDirection::ToRemote));

        clock.advance(Duration::from_millis(500));
        assert!(!gate.try_consume(RateDirection::ToRemote));

        clock.advance(Duration::from_millis(500));
        assert!(gate.try_consume(RateDirection::ToRemote));
        assert!(!gate.try_consume(RateDirection::ToRemote));
    }

    #[test]
    fn test_directions_are_independent() {
        let clock = FakeRelativeClock::default();
        let mut cfg = config(1.0, 1);
        cfg.to_chatroom = BucketConfig {
            enabled: true,
            rate: 1.0,
            capacity: 1,
        };
        let gate = RateGate::with_clock(&cfg, &clock);

        assert!(gate.try_consume(RateDirection::ToRemote));
        assert!(!gate.try_consume(RateDirection::ToRemote));
        assert!(gate.try_consume(RateDirection::ToChatroom));
    }

    #[test]
    fn test_invalid_quota_disables_limiting() {
        let clock = FakeRelativeClock::default();
        let gate = RateGate::with_clock(&config(0.0, 3), &clock);
        assert!(!gate.is_enabled(RateDirection::ToRemote));
        assert!(gate.try_consume(RateDirection::ToRemote));
    }

    #[test]
    fn test_unrepresentable_periods_disable_limiting() {
        let clock = FakeRelativeClock::default();

        let too_slow = RateGate::with_clock(&config(1e-20, 1), &clock);
        assert!(!too_slow.is_enabled(RateDirection::ToRemote));

        let too_fast = RateGate::with_clock(&config(1e12, 1), &clock);
        assert!(!too_fast.is_enabled(RateDirection::ToRemote));
    }

    #[test]
    fn test_slow_rate_still_limits() {
        let clock = FakeRelativeClock::default();
        let gate = RateGate::with_clock(&config(1e-6, 1), &clock);

        assert!(gate.is_enabled(RateDirection::ToRemote));
        assert!(gate.try_consume(RateDirection::ToRemote));
        assert!(!gate.try_consume(RateDirection::ToRemote));
    }
}
