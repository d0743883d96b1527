//! Re-entrancy guard that suppresses real scroll input at the target window.
//!
//! When the processing loop injects a synthetic scroll into the target, the
//! user's physical wheel gesture may still be delivering real events that land
//! inside the target rectangle (for example, because the cursor briefly sits
//! over the target while the synthetic move is in flight).  Those real events
//! would scroll the target a second time.
//!
//! The guard records the instant of the most recent synthetic output.  For a
//! short window afterwards the hook swallows real events inside the target.
//!
//! # Thread safety
//!
//! `arm()` is called from the processing task and `is_active()` from the hook
//! thread on every mouse event.  The timestamp is a single `AtomicU64` holding
//! nanoseconds since the guard was created, so neither side ever blocks.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// How long real input at the target stays suppressed after synthetic output.
pub const DEFAULT_SUPPRESSION_WINDOW: Duration = Duration::from_millis(200);

/// Sentinel for "never armed".
const NEVER_ARMED: u64 = 0;

/// Time-boxed suppression flag.
#[derive(Debug)]
pub struct ScrollGuard {
    origin: Instant,
    /// Nanoseconds since `origin` of the last `arm()`, plus one.  Zero means
    /// the guard has never been armed.
    armed_at: AtomicU64,
    window: Duration,
}

impl ScrollGuard {
    /// Creates a disarmed guard with the given suppression window.
    pub fn new(window: Duration) -> Self {
        Self {
            origin: Instant::now(),
            armed_at: AtomicU64::new(NEVER_ARMED),
            window,
        }
    }

    /// Returns the configured suppression window.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records "synthetic output happened now".
    pub fn arm(&self) {
        self.arm_at(Instant::now());
    }

    /// Records synthetic output at `now`.
    pub fn arm_at(&self, now: Instant) {
        let offset = now.saturating_duration_since(self.origin).as_nanos();
        let encoded = u64::try_from(offset).unwrap_or(u64::MAX - 1).saturating_add(1);
        self.armed_at.store(encoded, Ordering::Release);
    }

    /// Returns `true` while the current time is inside `[armed, armed + window)`.
    pub fn is_active(&self) -> bool {
        self.is_active_at(Instant::now())
    }

    /// Returns `true` if `now` lies inside `[armed, armed + window)`.
    ///
    /// A `now` slightly earlier than the armed instant (another thread armed
    /// the guard after `now` was sampled) counts as active.
    pub fn is_active_at(&self, now: Instant) -> bool {
        let encoded = self.armed_at.load(Ordering::Acquire);
        if encoded == NEVER_ARMED {
            return false;
        }
        let armed = self.origin + Duration::from_nanos(encoded - 1);
        now.saturating_duration_since(armed) < self.window
    }

    /// Clears the guard so it reports inactive until the next `arm()`.
    pub fn disarm(&self) {
        self.armed_at.store(NEVER_ARMED, Ordering::Release);
    }
}

impl Default for ScrollGuard {
    fn default() -> Self {
        Self::new(DEFAULT_SUPPRESSION_WINDOW)
    }
}
