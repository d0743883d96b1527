//! EventProcessor: turns captured source scrolls into synthetic target scrolls.
//!
//! This use case is the single consumer of the hook's event channel.  For each
//! [`RawScrollEvent`] it validates the current selection, re-reads both window
//! rectangles, remaps the pointer into the target, and hands the result to the
//! [`InputEmitter`].
//!
//! # Validation (for beginners)
//!
//! The configured input delay, if any, is waited out first.  Then any failed
//! check skips the event and the loop moves on; nothing here ever aborts the
//! loop:
//!
//! 1. the session is Running,
//! 2. a source and a target are selected,
//! 3. they are different windows,
//! 4. the event is a wheel or horizontal wheel (guaranteed by
//!    [`RawScrollEvent`], which can only carry a [`WheelAxis`]),
//! 5. both window rects can be read right now,
//! 6. the event point is still inside the source rect,
//! 7. with strict checking, the window visible at the event point belongs to
//!    the source process (another window may be covering it).
//!
//! After remapping, strict checking also requires the window visible at the
//! target point to belong to the target process.
//!
//! # Architecture
//!
//! Depends only on traits (`WindowSystem`, `InputEmitter`) plus the shared
//! [`HookState`] (for the guard) and [`SyncState`] (for the selection), so
//! it is fully unit-testable with mocks.

use std::sync::Arc;

use syncscroll_core::{
    build_scroll_batch, remap_point, LegacyPost, Point, RawScrollEvent, Rect, SyntheticInput,
    WheelAxis, WindowHandle, WindowRef,
};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use super::session::SyncOptions;
use super::sync_state::SyncState;
use crate::infrastructure::mouse_hook::HookState;
use crate::infrastructure::window_system::{is_owned_by, WindowSystem};

/// Error type for synthetic input delivery.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("SendInput inserted {sent} of {expected} events")]
    Partial { sent: usize, expected: usize },
    #[error("PostMessage to window {window} failed: {reason}")]
    Post { window: WindowHandle, reason: String },
    #[error("platform error: {0}")]
    Platform(String),
}

/// Delivers synthetic input to the OS.
///
/// The infrastructure implementation calls `SendInput` / `PostMessageW`;
/// tests record calls.
pub trait InputEmitter: Send + Sync {
    /// Submits `batch` as one atomic unit.
    fn send_batch(&self, batch: &[SyntheticInput]) -> Result<(), EmitError>;

    /// Posts a wheel message straight to `window`'s queue.
    fn post_message(&self, window: WindowHandle, post: LegacyPost) -> Result<(), EmitError>;
}

/// Why an event was not forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotRunning,
    NoSource,
    NoTarget,
    SameWindow,
    WindowUnavailable,
    OutsideSource,
    SourceNotOnTop,
    TargetNotOnTop,
    NoScreenSize,
    EmitFailed,
}

/// Result of processing one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// A move / wheel / move-back batch was submitted.
    Injected { target: Point, fell_back_to_center: bool },
    /// Legacy mode: the wheel message was posted to `windows` windows.
    Posted { target: Point, windows: usize },
    Skipped(SkipReason),
}

/// Single consumer of the hook's event channel.
pub struct EventProcessor {
    windows: Arc<dyn WindowSystem>,
    emitter: Arc<dyn InputEmitter>,
    hook: Arc<HookState>,
    state: Arc<SyncState>,
    options: SyncOptions,
}

impl EventProcessor {
    pub fn new(
        windows: Arc<dyn WindowSystem>,
        emitter: Arc<dyn InputEmitter>,
        hook: Arc<HookState>,
        state: Arc<SyncState>,
        options: SyncOptions,
    ) -> Self {
        Self {
            windows,
            emitter,
            hook,
            state,
            options,
        }
    }

    /// Drains `events` until the channel closes or `shutdown` turns `true`.
    pub async fn run(
        self,
        mut events: mpsc::UnboundedReceiver<RawScrollEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        info!("event processing loop started");
        loop {
            tokio::select! {
                received = events.recv() => {
                    let Some(event) = received else {
                        debug!("event channel closed");
                        break;
                    };
                    self.process(event).await;
                    // Work through whatever queued up while we were busy.
                    while let Ok(event) = events.try_recv() {
                        self.process(event).await;
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        info!("event processing loop stopped");
    }

    /// Validates, remaps and emits one event.
    pub async fn process(&self, event: RawScrollEvent) -> ProcessOutcome {
        match self.try_process(event).await {
            Ok(outcome) => outcome,
            Err(reason) => {
                trace!(?reason, record = %event.record, "scroll event skipped");
                ProcessOutcome::Skipped(reason)
            }
        }
    }

    async fn try_process(&self, event: RawScrollEvent) -> Result<ProcessOutcome, SkipReason> {
        // Every check below must observe the world as it is after the delay.
        if !self.options.input_delay.is_zero() {
            tokio::time::sleep(self.options.input_delay).await;
        }

        if !self.state.is_running() {
            return Err(SkipReason::NotRunning);
        }
        let source = self.state.source().ok_or(SkipReason::NoSource)?;
        let target = self.state.target().ok_or(SkipReason::NoTarget)?;
        if source.handle == target.handle {
            return Err(SkipReason::SameWindow);
        }

        let point = event.record.point;
        let source_rect = self.window_rect(&source)?;
        let target_rect = self.window_rect(&target)?;

        if !source_rect.contains(point) {
            return Err(SkipReason::OutsideSource);
        }
        if self.options.strict_process_check
            && !is_owned_by(self.windows.as_ref(), point, source.process_id)
        {
            return Err(SkipReason::SourceNotOnTop);
        }

        let remap = remap_point(&source_rect, &target_rect, point);
        if self.options.strict_process_check
            && !is_owned_by(self.windows.as_ref(), remap.point, target.process_id)
        {
            return Err(SkipReason::TargetNotOnTop);
        }

        let delta = event.record.wheel_delta();

        if self.options.legacy_delivery {
            return self.post_to_children(&target, event.axis, remap.point, delta);
        }

        let screen = self.state.screen_size().ok_or(SkipReason::NoScreenSize)?;

        // Events can be processed with some lag, so return the cursor to
        // where it is now if that is still inside the source.
        let return_point = self
            .windows
            .cursor_position()
            .filter(|cursor| source_rect.contains(*cursor))
            .unwrap_or(point);

        let batch = build_scroll_batch(
            event.axis,
            screen.normalize(return_point),
            screen.normalize(remap.point),
            delta,
        );

        self.hook.guard().arm();
        self.emitter.send_batch(&batch).map_err(|e| {
            warn!("failed to inject scroll into target: {e}");
            SkipReason::EmitFailed
        })?;

        trace!(
            from = %point,
            to = %remap.point,
            delta,
            fell_back_to_center = remap.fell_back_to_center,
            "scroll forwarded"
        );
        Ok(ProcessOutcome::Injected {
            target: remap.point,
            fell_back_to_center: remap.fell_back_to_center,
        })
    }

    fn window_rect(&self, window: &WindowRef) -> Result<Rect, SkipReason> {
        self.windows.window_rect(window.handle).map_err(|e| {
            debug!(window = %window.display_name(), "rect unavailable: {e}");
            SkipReason::WindowUnavailable
        })
    }

    /// Legacy delivery: post the wheel message to every visible child of the
    /// target, or to the target itself when it has none.
    fn post_to_children(
        &self,
        target: &WindowRef,
        axis: WheelAxis,
        at: Point,
        delta: i16,
    ) -> Result<ProcessOutcome, SkipReason> {
        let mut recipients = self.windows.visible_children(target.handle).map_err(|e| {
            debug!(window = %target.display_name(), "cannot list child windows: {e}");
            SkipReason::WindowUnavailable
        })?;
        if recipients.is_empty() {
            recipients.push(target.handle);
        }

        let post = LegacyPost::new(axis, at, delta);
        let mut delivered = 0;
        for window in recipients {
            match self.emitter.post_message(window, post) {
                Ok(()) => delivered += 1,
                Err(e) => warn!("failed to post wheel message: {e}"),
            }
        }

        if delivered == 0 {
            return Err(SkipReason::EmitFailed);
        }
        Ok(ProcessOutcome::Posted {
            target: at,
            windows: delivered,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
