//! Global low-level mouse hook.
//!
//! On Windows this installs a `WH_MOUSE_LL` hook on a dedicated Win32
//! message-loop thread.  Every mouse event on the desktop passes through the
//! callback, which decides in a few nanoseconds whether to:
//!
//! - **enqueue** a wheel event that happened over the source window (and let
//!   it through so the source scrolls normally),
//! - **swallow** a real event inside the target while the re-entrancy guard is
//!   armed (so the target is not scrolled twice), or
//! - **pass** the event through untouched.
//!
//! # Why is the decision logic here and not in `windows.rs`? (for beginners)
//!
//! The Win32 callback only copies the raw `MSLLHOOKSTRUCT` into a
//! [`MouseRecord`] and then calls [`HookState::handle`].  Keeping the decision
//! in a plain method means the exact same code runs under unit tests (through
//! [`mock::MockMouseHook`]) and in production, without a desktop session.
//!
//! # Windows-Specific Implementation
//!
//! Windows removes a low-level hook whose callback takes longer than the
//! `LowLevelHooksTimeout` (a few hundred milliseconds).  `handle` therefore
//! never blocks: the rect cache and the channel sender are lock-free
//! [`ArcSwapOption`] slots, the guard is a single atomic, and the event channel
//! is unbounded.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use syncscroll_core::{MouseMessage, MouseRecord, RawScrollEvent, Rect, ScrollGuard};
use tokio::sync::mpsc::UnboundedSender;
use tracing::trace;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for hook installation and removal.
#[derive(Debug, thiserror::Error)]
pub enum HookError {
    #[error("a mouse hook is already installed")]
    AlreadyInstalled,
    #[error("failed to resolve the module handle: {0}")]
    ModuleHandle(String),
    #[error("failed to install mouse hook: {0}")]
    InstallFailed(String),
    #[error("failed to remove mouse hook: {0}")]
    UninstallFailed(String),
}

/// What the hook callback should do with the current event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookDecision {
    /// Hand the event to the next hook in the chain.
    PassThrough,
    /// Consume the event so no window receives it.
    Swallow,
}

// ── HookState ─────────────────────────────────────────────────────────────────

/// Runtime state the hook callback reads on every mouse event.
///
/// Owned by the session behind an `Arc`; the platform hook holds one more
/// reference for as long as it is installed.
#[derive(Debug)]
pub struct HookState {
    source_rect: ArcSwapOption<Rect>,
    target_rect: ArcSwapOption<Rect>,
    guard: ScrollGuard,
    sender: ArcSwapOption<UnboundedSender<RawScrollEvent>>,
}

impl HookState {
    /// Creates an empty state: no rects, guard disarmed, no channel attached.
    pub fn new(suppression_window: Duration) -> Self {
        Self {
            source_rect: ArcSwapOption::empty(),
            target_rect: ArcSwapOption::empty(),
            guard: ScrollGuard::new(suppression_window),
            sender: ArcSwapOption::empty(),
        }
    }

    pub fn set_source_rect(&self, rect: Option<Rect>) {
        self.source_rect.store(rect.map(Arc::new));
    }

    pub fn set_target_rect(&self, rect: Option<Rect>) {
        self.target_rect.store(rect.map(Arc::new));
    }

    /// Clears both cached rects, which disables forwarding and suppression.
    pub fn clear_rects(&self) {
        self.set_source_rect(None);
        self.set_target_rect(None);
    }

    pub fn source_rect(&self) -> Option<Rect> {
        self.source_rect.load().as_deref().copied()
    }

    pub fn target_rect(&self) -> Option<Rect> {
        self.target_rect.load().as_deref().copied()
    }

    pub fn guard(&self) -> &ScrollGuard {
        &self.guard
    }

    /// Connects the write side of the event channel.
    pub fn attach(&self, sender: UnboundedSender<RawScrollEvent>) {
        self.sender.store(Some(Arc::new(sender)));
    }

    /// Drops the write side of the event channel so the consumer sees the end
    /// of the stream once it has drained what is already queued.
    pub fn detach(&self) {
        self.sender.store(None);
    }

    /// Returns `true` while a channel is attached.
    pub fn is_attached(&self) -> bool {
        self.sender.load().is_some()
    }

    /// Classifies one low-level mouse event.
    ///
    /// `code` is the hook's stage code; negative values must not be
    /// processed.  Decision order:
    ///
    /// 1. negative stage code → pass through
    /// 2. our own synthetic input → pass through
    /// 3. non wheel/move message → pass through
    /// 4. wheel over the source rect → enqueue, pass through
    /// 5. guard armed and point inside the target rect → swallow
    /// 6. anything else → pass through
    pub fn handle(&self, code: i32, message: MouseMessage, record: &MouseRecord) -> HookDecision {
        if code < 0 || record.is_synthetic() {
            return HookDecision::PassThrough;
        }
        if matches!(message, MouseMessage::Other(_)) {
            return HookDecision::PassThrough;
        }

        if let Some(axis) = message.wheel_axis() {
            let over_source = self
                .source_rect()
                .map_or(false, |rect| rect.contains(record.point));
            if over_source {
                self.enqueue(RawScrollEvent::new(axis, *record));
                return HookDecision::PassThrough;
            }
        }

        if self.guard.is_active() {
            let over_target = self
                .target_rect()
                .map_or(false, |rect| rect.contains(record.point));
            if over_target {
                return HookDecision::Swallow;
            }
        }

        HookDecision::PassThrough
    }

    fn enqueue(&self, event: RawScrollEvent) {
        match self.sender.load().as_deref() {
            Some(sender) => {
                if sender.send(event).is_err() {
                    trace!("event channel closed, dropping scroll event");
                }
            }
            None => trace!("no event channel attached, dropping scroll event"),
        }
    }
}

impl Default for HookState {
    fn default() -> Self {
        Self::new(syncscroll_core::domain::guard::DEFAULT_SUPPRESSION_WINDOW)
    }
}

/// Trait abstracting the process-wide mouse hook.
///
/// The production implementation uses `WH_MOUSE_LL`; tests use
/// [`mock::MockMouseHook`].
pub trait MouseHook: Send + Sync {
    /// Registers the hook so that every desktop mouse event reaches
    /// [`HookState::handle`] on `state`.
    ///
    /// # Errors
    ///
    /// [`HookError::AlreadyInstalled`] if a hook is already registered, or a
    /// platform error if registration fails.
    fn install(&self, state: Arc<HookState>) -> Result<(), HookError>;

    /// Removes the hook, releases its OS resources and detaches the event
    /// channel.  A no-op when nothing is installed.
    fn uninstall(&self) -> Result<(), HookError>;

    /// Returns `true` while the hook is registered.
    fn is_installed(&self) -> bool;
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use syncscroll_core::{
        pack_hi_lo, Point, WheelAxis, EXTRA_INFO_SENTINEL,
    };
    use tokio::sync::mpsc;

    const WHEEL: MouseMessage = MouseMessage::WheelVertical;
    const HWHEEL: MouseMessage = MouseMessage::WheelHorizontal;
    const MOVE: MouseMessage = MouseMessage::Move;

    fn record_at(x: i32, y: i32) -> MouseRecord {
        MouseRecord {
            point: Point::new(x, y),
            mouse_data: pack_hi_lo(0, 120),
            ..MouseRecord::default()
        }
    }

    fn state_with_rects() -> (HookState, mpsc::UnboundedReceiver<RawScrollEvent>) {
        let state = HookState::new(Duration::from_millis(200));
        state.set_source_rect(Some(Rect::new(0, 0, 100, 100)));
        state.set_target_rect(Some(Rect::new(200, 0, 300, 100)));
        let (tx, rx) = mpsc::unbounded_channel();
        state.attach(tx);
        (state, rx)
    }

    // ── Enqueue ───────────────────────────────────────────────────────────────

    #[test]
    fn test_wheel_over_source_is_enqueued_and_passed_through() {
        // Arrange
        let (state, mut rx) = state_with_rects();

        // Act
        let decision = state.handle(0, WHEEL, &record_at(50, 50));

        // Assert
        assert_eq!(decision, HookDecision::PassThrough);
        let event = rx.try_recv().expect("event must be queued");
        assert_eq!(event.axis, WheelAxis::Vertical);
        assert_eq!(event.record.point, Point::new(50, 50));
        assert_eq!(event.record.wheel_delta(), 120);
    }

    #[test]
    fn test_horizontal_wheel_over_source_is_enqueued() {
        let (state, mut rx) = state_with_rects();

        state.handle(0, HWHEEL, &record_at(0, 100));

        assert_eq!(rx.try_recv().expect("queued").axis, WheelAxis::Horizontal);
    }

    #[test]
    fn test_move_over_source_is_not_enqueued() {
        let (state, mut rx) = state_with_rects();

        assert_eq!(state.handle(0, MOVE, &record_at(50, 50)), HookDecision::PassThrough);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_wheel_outside_source_is_not_enqueued() {
        let (state, mut rx) = state_with_rects();

        state.handle(0, WHEEL, &record_at(150, 50));

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_wheel_without_source_rect_is_not_enqueued() {
        let (state, mut rx) = state_with_rects();
        state.set_source_rect(None);

        state.handle(0, WHEEL, &record_at(50, 50));

        assert!(rx.try_recv().is_err());
    }

    // ── Swallow ───────────────────────────────────────────────────────────────

    #[test]
    fn test_real_wheel_in_target_is_swallowed_while_guard_armed() {
        let (state, _rx) = state_with_rects();
        state.guard().arm();

        assert_eq!(state.handle(0, WHEEL, &record_at(250, 50)), HookDecision::Swallow);
        assert_eq!(state.handle(0, MOVE, &record_at(250, 50)), HookDecision::Swallow);
    }

    #[test]
    fn test_real_wheel_in_target_passes_when_guard_disarmed() {
        let (state, _rx) = state_with_rects();

        assert_eq!(state.handle(0, WHEEL, &record_at(250, 50)), HookDecision::PassThrough);
    }

    #[test]
    fn test_event_outside_target_passes_while_guard_armed() {
        let (state, _rx) = state_with_rects();
        state.guard().arm();

        assert_eq!(state.handle(0, WHEEL, &record_at(500, 500)), HookDecision::PassThrough);
    }

    #[test]
    fn test_armed_guard_without_target_rect_passes() {
        let (state, _rx) = state_with_rects();
        state.set_target_rect(None);
        state.guard().arm();

        assert_eq!(state.handle(0, WHEEL, &record_at(250, 50)), HookDecision::PassThrough);
    }

    // ── Pass-through ──────────────────────────────────────────────────────────

    #[test]
    fn test_synthetic_events_are_never_enqueued_or_swallowed() {
        // Arrange
        let (state, mut rx) = state_with_rects();
        state.guard().arm();
        let mut in_source = record_at(50, 50);
        in_source.extra_info = EXTRA_INFO_SENTINEL;
        let mut in_target = record_at(250, 50);
        in_target.extra_info = EXTRA_INFO_SENTINEL;

        // Act / Assert
        assert_eq!(state.handle(0, WHEEL, &in_source), HookDecision::PassThrough);
        assert_eq!(state.handle(0, WHEEL, &in_target), HookDecision::PassThrough);
        assert_eq!(state.handle(0, MOVE, &in_target), HookDecision::PassThrough);
        assert!(rx.try_recv().is_err(), "synthetic event must not be queued");
    }

    #[test]
    fn test_negative_stage_code_passes_through() {
        let (state, mut rx) = state_with_rects();
        state.guard().arm();

        assert_eq!(state.handle(-1, WHEEL, &record_at(50, 50)), HookDecision::PassThrough);
        assert_eq!(state.handle(-1, WHEEL, &record_at(250, 50)), HookDecision::PassThrough);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_button_messages_always_pass_through() {
        let (state, _rx) = state_with_rects();
        state.guard().arm();

        // WM_LBUTTONDOWN inside the target while armed
        let decision = state.handle(0, MouseMessage::from_id(0x0201), &record_at(250, 50));

        assert_eq!(decision, HookDecision::PassThrough);
    }

    // ── Channel lifecycle ─────────────────────────────────────────────────────

    #[test]
    fn test_detach_closes_channel() {
        let (state, mut rx) = state_with_rects();

        state.detach();

        assert!(!state.is_attached());
        assert!(matches!(
            rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_wheel_after_detach_is_dropped_without_panic() {
        let (state, _rx) = state_with_rects();
        state.detach();

        assert_eq!(state.handle(0, WHEEL, &record_at(50, 50)), HookDecision::PassThrough);
    }

    #[test]
    fn test_clear_rects_empties_both_slots() {
        let (state, _rx) = state_with_rects();

        state.clear_rects();

        assert_eq!(state.source_rect(), None);
        assert_eq!(state.target_rect(), None);
    }
}
