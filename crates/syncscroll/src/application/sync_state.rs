//! Selection and run state shared by the session and its background tasks.
//!
//! # Thread safety
//!
//! The processing loop and the rect refresher read this state on every event
//! or tick while the control surface (`start`, `stop`, window selection)
//! writes it from elsewhere.  Nothing here takes a lock:
//!
//! - the source/target selection and the sampled screen size are
//!   [`ArcSwapOption`] snapshots, replaced wholesale;
//! - the run state lives in a `tokio::sync::watch` channel, so observers can
//!   `await` changes instead of polling.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use syncscroll_core::{ScreenSize, WindowRef};
use tokio::sync::watch;

/// Whether scroll forwarding is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Stopped,
    Running,
}

impl RunState {
    pub fn is_running(self) -> bool {
        self == RunState::Running
    }
}

/// Current source/target selection, run state, and screen metrics.
#[derive(Debug)]
pub struct SyncState {
    source: ArcSwapOption<WindowRef>,
    target: ArcSwapOption<WindowRef>,
    run_state: watch::Sender<RunState>,
    screen: ArcSwapOption<ScreenSize>,
}

impl SyncState {
    /// Creates an empty, stopped state.
    pub fn new() -> Self {
        let (run_state, _) = watch::channel(RunState::Stopped);
        Self {
            source: ArcSwapOption::empty(),
            target: ArcSwapOption::empty(),
            run_state,
            screen: ArcSwapOption::empty(),
        }
    }

    pub fn source(&self) -> Option<Arc<WindowRef>> {
        self.source.load_full()
    }

    pub fn target(&self) -> Option<Arc<WindowRef>> {
        self.target.load_full()
    }

    pub fn set_source(&self, window: Option<WindowRef>) {
        self.source.store(window.map(Arc::new));
    }

    pub fn set_target(&self, window: Option<WindowRef>) {
        self.target.store(window.map(Arc::new));
    }

    pub fn run_state(&self) -> RunState {
        *self.run_state.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.run_state().is_running()
    }

    /// Sets the run state and returns the previous one.
    pub fn set_run_state(&self, state: RunState) -> RunState {
        self.run_state.send_replace(state)
    }

    /// Returns a receiver that observes every run state change.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.run_state.subscribe()
    }

    /// Screen size sampled by the last `start()`.
    pub fn screen_size(&self) -> Option<ScreenSize> {
        self.screen.load().as_deref().copied()
    }

    pub fn set_screen_size(&self, screen: Option<ScreenSize>) {
        self.screen.store(screen.map(Arc::new));
    }
}

impl Default for SyncState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncscroll_core::WindowHandle;

    fn window(handle: isize) -> WindowRef {
        WindowRef {
            title: format!("window {handle}"),
            class_name: "Class".to_string(),
            handle: WindowHandle(handle),
            process_id: 1,
            process_name: "app".to_string(),
        }
    }

    #[test]
    fn test_new_state_is_empty_and_stopped() {
        let state = SyncState::new();

        assert!(state.source().is_none());
        assert!(state.target().is_none());
        assert_eq!(state.run_state(), RunState::Stopped);
        assert_eq!(state.screen_size(), None);
    }

    #[test]
    fn test_selection_is_replaced_wholesale() {
        let state = SyncState::new();

        state.set_source(Some(window(1)));
        state.set_source(Some(window(2)));

        assert_eq!(state.source().unwrap().handle, WindowHandle(2));
    }

    #[test]
    fn test_set_run_state_returns_previous() {
        let state = SyncState::new();

        assert_eq!(state.set_run_state(RunState::Running), RunState::Stopped);
        assert_eq!(state.set_run_state(RunState::Stopped), RunState::Running);
    }

    #[tokio::test]
    async fn test_subscribers_observe_run_state_changes() {
        // Arrange
        let state = SyncState::new();
        let mut rx = state.subscribe();

        // Act
        state.set_run_state(RunState::Running);

        // Assert
        rx.changed().await.expect("sender alive");
        assert_eq!(*rx.borrow(), RunState::Running);
    }
}
