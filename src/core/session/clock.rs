// src/core/session/clock.rs

//! Tracks when the current session started and arbitrates which caller gets to
//! end it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

/// Marker for "no rotation has happened yet".
const UNSET: u64 = u64::MAX;

/// The last reconnect timestamp, stored as nanoseconds since the clock's origin.
///
/// The timestamp only moves forward, and only through [`SessionClock::try_rotate`],
/// which lets exactly one of several racing callers claim a given session boundary.
#[derive(Debug)]
pub struct SessionClock {
    origin: Instant,
    last_reconnect: AtomicU64,
}

impl SessionClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last_reconnect: AtomicU64::new(UNSET),
        }
    }

    fn offset(&self, at: Instant) -> u64 {
        let nanos = at.saturating_duration_since(self.origin).as_nanos();
        // Clamp below the sentinel; ~584 years of uptime.
        u64::try_from(nanos).unwrap_or(UNSET - 1).min(UNSET - 1)
    }

    /// Attempts to start a new session at `now`.
    ///
    /// Returns `true` only for the caller that advanced the timestamp. A caller whose
    /// `now` is older than the stored timestamp never wins, so the timestamp cannot
    /// move backwards even when `session` is zero.
    pub fn try_rotate(&self, now: Instant, session: Duration) -> bool {
        let now = self.offset(now);
        let last = self.last_reconnect.load(Ordering::Acquire);

        if last != UNSET {
            if now < last {
                return false;
            }
            if u128::from(now - last) < session.as_nanos() {
                return false;
            }
        }

        self.last_reconnect
            .compare_exchange(last, now, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// The instant of the last rotation, if any.
    pub fn last_reconnect(&self) -> Option<Instant> {
        match self.last_reconnect.load(Ordering::Acquire) {
            UNSET => None,
            nanos => Some(self.origin + Duration::from_nanos(nanos)),
        }
    }

    /// Time elapsed since the last rotation, or zero if none has happened.
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        self.last_reconnect()
            .map(|last| now.saturating_duration_since(last))
            .unwrap_or(Duration::ZERO)
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }
}

impl Default for SessionClock {
    fn default() -> Self {
        Self::new()
    }
}
