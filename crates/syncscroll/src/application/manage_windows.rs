//! WindowCatalog: the list of windows the user can pick from.
//!
//! The catalog owns the most recent enumeration and keeps the source/target
//! selection in [`SyncState`] consistent with it.
//!
//! # Refresh and selection (for beginners)
//!
//! A window handle stays valid only while the window is open.  After every
//! refresh the previous selection is looked up again by handle:
//!
//! - still present: the selection is replaced with the fresh entry (its
//!   title may have changed),
//! - gone: the selection is cleared and a warning is logged.
//!
//! With `preserve_selection_on_refresh = false` every refresh clears both
//! selections instead.
//!
//! Observers (a UI, the CLI) can `subscribe()` to receive each new list.

use std::sync::Arc;

use syncscroll_core::{reconcile_selection, sort_for_display, WindowHandle, WindowRef};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::sync_state::SyncState;
use crate::infrastructure::window_system::{WindowQueryError, WindowSystem};

/// Enumerated candidate windows plus selection bookkeeping.
pub struct WindowCatalog {
    windows: Arc<dyn WindowSystem>,
    state: Arc<SyncState>,
    list: watch::Sender<Arc<Vec<WindowRef>>>,
    preserve_selection: bool,
}

impl WindowCatalog {
    pub fn new(windows: Arc<dyn WindowSystem>, state: Arc<SyncState>, preserve_selection: bool) -> Self {
        let (list, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            windows,
            state,
            list,
            preserve_selection,
        }
    }

    /// Re-enumerates windows and reconciles the selection.
    ///
    /// Returns the number of windows found.  On error the previous list and
    /// selection are left untouched.
    pub fn refresh(&self) -> Result<usize, WindowQueryError> {
        let mut windows = self.windows.list_windows()?;
        sort_for_display(&mut windows);

        self.reconcile("source", self.state.source(), &windows, |w| self.state.set_source(w));
        self.reconcile("target", self.state.target(), &windows, |w| self.state.set_target(w));

        let count = windows.len();
        self.list.send_replace(Arc::new(windows));
        debug!(count, "window list refreshed");
        Ok(count)
    }

    fn reconcile(
        &self,
        role: &str,
        previous: Option<Arc<WindowRef>>,
        refreshed: &[WindowRef],
        store: impl FnOnce(Option<WindowRef>),
    ) {
        let reconciled = reconcile_selection(previous.as_deref(), refreshed, self.preserve_selection);
        if let (Some(previous), None) = (&previous, &reconciled) {
            if self.preserve_selection {
                warn!(window = %previous.display_name(), "{role} window is gone, selection cleared");
            } else {
                info!(window = %previous.display_name(), "{role} selection cleared by refresh");
            }
        }
        store(reconciled);
    }

    /// Snapshot of the most recent list, in display order.
    pub fn windows(&self) -> Arc<Vec<WindowRef>> {
        self.list.borrow().clone()
    }

    /// Looks up a window in the most recent list.
    pub fn find(&self, handle: WindowHandle) -> Option<WindowRef> {
        self.list.borrow().iter().find(|w| w.handle == handle).cloned()
    }

    /// Returns a receiver notified after every successful refresh.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<WindowRef>>> {
        self.list.subscribe()
    }
}
