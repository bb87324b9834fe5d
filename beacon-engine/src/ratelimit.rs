//! Admission control
//!
//! Advisory per-caller rate limiting for batch requests. The limiter is
//! injected into the analyzer at construction so tests can substitute a
//! fake; it gates only the admission of new batches, never the scoring
//! pipeline itself.

use governor::{DefaultKeyedRateLimiter, Quota};
use std::num::NonZeroU32;

/// Admission decision for a new batch request
pub trait AdmissionControl: Send + Sync {
    /// True when the caller may start a batch now; consuming a token on
    /// success
    fn try_admit(&self, caller: &str) -> bool;
}

/// Keyed token bucket (one bucket per caller identity)
pub struct KeyedTokenBucket {
    limiter: DefaultKeyedRateLimiter<String>,
}

impl KeyedTokenBucket {
    /// Allow `per_minute` batches per caller per minute
    pub fn per_minute(per_minute: NonZeroU32) -> Self {
        Self {
            limiter: DefaultKeyedRateLimiter::keyed(Quota::per_minute(per_minute)),
        }
    }
}

impl AdmissionControl for KeyedTokenBucket {
    fn try_admit(&self, caller: &str) -> bool {
        self.limiter.check_key(&caller.to_string()).is_ok()
    }
}

/// No-op admission for tests and unmetered deployments
pub struct Unlimited;

impl AdmissionControl for Unlimited {
    fn try_admit(&self, _caller: &str) -> bool {
        true
    }
}
