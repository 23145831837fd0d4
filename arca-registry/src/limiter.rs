//! Shared rate limiter for all outbound registry traffic

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Keyless limiter shared by every outbound registry call.
///
/// The registry enforces its limit per client, not per endpoint, so the
/// record fetcher and the taxonomy resolver must share one instance by
/// construction (`Arc`-cloned into each).
pub type RegistryLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// At most one request per `period`, across all holders of the handle.
pub fn shared(period: Duration) -> Arc<RegistryLimiter> {
    let quota = Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(NonZeroU32::new(1).unwrap()));
    Arc::new(RateLimiter::direct(quota))
}

/// A limiter that never delays, for tests and offline processing.
pub fn unthrottled() -> Arc<RegistryLimiter> {
    let quota = Quota::per_second(NonZeroU32::new(1_000_000).unwrap());
    Arc::new(RateLimiter::direct(quota))
}
