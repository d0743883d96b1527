//! Mock mouse hook for unit and integration testing.
//!
//! Allows tests to fire low-level mouse events through the real
//! [`HookState::handle`] decision logic without a running Windows message
//! loop or OS hooks.

use std::sync::{Arc, Mutex};

use syncscroll_core::{MouseMessage, MouseRecord};
use tracing::debug;

use super::{HookDecision, HookError, HookState, MouseHook};

/// A mock implementation of [`MouseHook`] that lets tests fire events.
#[derive(Default)]
pub struct MockMouseHook {
    state: Mutex<Option<Arc<HookState>>>,
    uninstall_count: Mutex<u32>,
}

impl MockMouseHook {
    /// Creates a new, uninstalled mock hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers one mouse event exactly as the OS callback would.
    ///
    /// Panics if the hook is not installed.
    pub fn fire(&self, message_id: u32, record: MouseRecord) -> HookDecision {
        self.fire_with_code(0, message_id, record)
    }

    /// Like [`fire`](Self::fire) but with an explicit hook stage code.
    pub fn fire_with_code(&self, code: i32, message_id: u32, record: MouseRecord) -> HookDecision {
        let state = self
            .state
            .lock()
            .expect("lock poisoned")
            .clone()
            .expect("MockMouseHook::fire called before install()");
        state.handle(code, MouseMessage::from_id(message_id), &record)
    }

    /// Returns how many times `uninstall()` actually removed an installed hook.
    pub fn uninstall_count(&self) -> u32 {
        *self.uninstall_count.lock().expect("lock poisoned")
    }
}

impl MouseHook for MockMouseHook {
    fn install(&self, state: Arc<HookState>) -> Result<(), HookError> {
        let mut slot = self.state.lock().expect("lock poisoned");
        if slot.is_some() {
            return Err(HookError::AlreadyInstalled);
        }
        *slot = Some(state);
        Ok(())
    }

    fn uninstall(&self) -> Result<(), HookError> {
        let previous = self.state.lock().expect("lock poisoned").take();
        match previous {
            Some(state) => {
                state.detach();
                *self.uninstall_count.lock().expect("lock poisoned") += 1;
            }
            None => debug!("uninstall called but no mock hook is installed"),
        }
        Ok(())
    }

    fn is_installed(&self) -> bool {
        self.state.lock().expect("lock poisoned").is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use syncscroll_core::{pack_hi_lo, Point, Rect};
    use tokio::sync::mpsc;

    fn installed_hook() -> (MockMouseHook, Arc<HookState>, mpsc::UnboundedReceiver<syncscroll_core::RawScrollEvent>) {
        let hook = MockMouseHook::new();
        let state = Arc::new(HookState::default());
        let (tx, rx) = mpsc::unbounded_channel();
        state.attach(tx);
        hook.install(Arc::clone(&state)).expect("install should succeed");
        (hook, state, rx)
    }

    #[test]
    fn test_mock_hook_second_install_fails() {
        // Arrange
        let (hook, state, _rx) = installed_hook();

        // Act
        let result = hook.install(state);

        // Assert
        assert!(matches!(result, Err(HookError::AlreadyInstalled)));
    }

    #[test]
    fn test_mock_hook_fire_runs_decision_logic() {
        // Arrange
        let (hook, state, mut rx) = installed_hook();
        state.set_source_rect(Some(Rect::new(0, 0, 100, 100)));

        // Act
        let record = MouseRecord {
            point: Point::new(10, 10),
            mouse_data: pack_hi_lo(0, -120),
            ..MouseRecord::default()
        };
        let decision = hook.fire(0x020A, record);

        // Assert
        assert_eq!(decision, HookDecision::PassThrough);
        assert_eq!(rx.try_recv().expect("queued").record.wheel_delta(), -120);
    }

    #[test]
    fn test_mock_hook_uninstall_closes_channel() {
        let (hook, _state, mut rx) = installed_hook();

        hook.uninstall().expect("uninstall should succeed");

        assert!(!hook.is_installed());
        assert_eq!(hook.uninstall_count(), 1);
        assert!(matches!(rx.try_recv(), Err(mpsc::error::TryRecvError::Disconnected)));
    }

    #[test]
    fn test_mock_hook_uninstall_when_not_installed_is_noop() {
        let hook = MockMouseHook::new();

        assert!(hook.uninstall().is_ok());
        assert_eq!(hook.uninstall_count(), 0);
    }

    #[test]
    fn test_mock_hook_can_be_reinstalled_after_uninstall() {
        let (hook, state, _rx) = installed_hook();
        hook.uninstall().expect("uninstall");

        assert!(hook.install(state).is_ok());
        assert!(hook.is_installed());
    }
}
