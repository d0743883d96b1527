//! SyncSession: the control surface of the scroll synchronizer.
//!
//! A session owns every moving part and exposes the operations a front end
//! needs:
//!
//! ```text
//! initialize()  ── install hook, enumerate windows, spawn background tasks
//! select_source(hwnd) / select_target(hwnd)
//! start()       ── validate selection, sample screen size, Running
//! stop()        ── Stopped, clear rect cache, disarm guard
//! shutdown()    ── uninstall hook, stop tasks, wait for them
//! ```
//!
//! # Background tasks (for beginners)
//!
//! `initialize()` spawns two Tokio tasks:
//!
//! - the [`EventProcessor`] loop, the single consumer of the hook channel;
//! - the [`RectRefresher`] ticker, which feeds the hook's rect cache.
//!
//! Both watch the same `shutdown` signal.  Uninstalling the hook also drops
//! the channel sender, so the processor ends on its own once the queue is
//! drained.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use syncscroll_core::domain::guard::DEFAULT_SUPPRESSION_WINDOW;
use syncscroll_core::{WindowHandle, WindowRef};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::manage_windows::WindowCatalog;
use super::process_events::{EventProcessor, InputEmitter};
use super::refresh_rects::RectRefresher;
use super::sync_state::{RunState, SyncState};
use crate::infrastructure::mouse_hook::{HookError, HookState, MouseHook};
use crate::infrastructure::window_system::{WindowQueryError, WindowSystem};

/// Runtime behaviour switches, usually built from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Require the window visible at the source and target points to belong
    /// to the selected processes.
    pub strict_process_check: bool,
    /// Post `WM_MOUSEWHEEL` to the target's child windows instead of moving
    /// the cursor with `SendInput`.
    pub legacy_delivery: bool,
    /// Pause before each event is validated and emitted.
    pub input_delay: Duration,
    pub preserve_selection_on_refresh: bool,
    pub auto_stop_on_lost_window: bool,
    pub rect_refresh_interval: Duration,
    /// How long the guard swallows real input in the target after emission.
    pub suppression_window: Duration,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            strict_process_check: true,
            legacy_delivery: false,
            input_delay: Duration::ZERO,
            preserve_selection_on_refresh: true,
            auto_stop_on_lost_window: true,
            rect_refresh_interval: Duration::from_millis(500),
            suppression_window: DEFAULT_SUPPRESSION_WINDOW,
        }
    }
}

/// Error type for session control operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("source and target must both be selected and must differ")]
    InvalidSelection,
    #[error("window {0} is not in the current window list")]
    UnknownWindow(WindowHandle),
    #[error("session is already initialized")]
    AlreadyInitialized,
    #[error("session is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Hook(#[from] HookError),
    #[error(transparent)]
    WindowQuery(#[from] WindowQueryError),
}

/// Owns the hook, the background tasks and the shared state.
pub struct SyncSession {
    hook: Arc<dyn MouseHook>,
    windows: Arc<dyn WindowSystem>,
    emitter: Arc<dyn InputEmitter>,
    hook_state: Arc<HookState>,
    state: Arc<SyncState>,
    catalog: Arc<WindowCatalog>,
    refresher: Arc<RectRefresher>,
    options: SyncOptions,
    shutdown: watch::Sender<bool>,
    initialized: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncSession {
    pub fn new(
        hook: Arc<dyn MouseHook>,
        windows: Arc<dyn WindowSystem>,
        emitter: Arc<dyn InputEmitter>,
        options: SyncOptions,
    ) -> Self {
        let hook_state = Arc::new(HookState::new(options.suppression_window));
        let state = Arc::new(SyncState::new());
        let catalog = Arc::new(WindowCatalog::new(
            Arc::clone(&windows),
            Arc::clone(&state),
            options.preserve_selection_on_refresh,
        ));
        let refresher = Arc::new(RectRefresher::new(
            Arc::clone(&windows),
            Arc::clone(&hook_state),
            Arc::clone(&state),
            Arc::clone(&catalog),
            options.clone(),
        ));
        let (shutdown, _) = watch::channel(false);

        Self {
            hook,
            windows,
            emitter,
            hook_state,
            state,
            catalog,
            refresher,
            options,
            shutdown,
            initialized: AtomicBool::new(false),
            tasks: Mutex::new(Vec::new()),
        }
    }

    /// Installs the hook and spawns the background tasks.
    ///
    /// Must be called from within a Tokio runtime.  A window enumeration
    /// failure is logged but does not fail initialization.
    pub fn initialize(&self) -> Result<(), SessionError> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return Err(SessionError::AlreadyInitialized);
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.hook_state.attach(tx);
        if let Err(e) = self.hook.install(Arc::clone(&self.hook_state)) {
            error!("failed to install mouse hook: {e}");
            self.hook_state.detach();
            self.initialized.store(false, Ordering::SeqCst);
            return Err(e.into());
        }

        if let Err(e) = self.catalog.refresh() {
            warn!("initial window enumeration failed: {e}");
        }

        self.shutdown.send_replace(false);
        let processor = EventProcessor::new(
            Arc::clone(&self.windows),
            Arc::clone(&self.emitter),
            Arc::clone(&self.hook_state),
            Arc::clone(&self.state),
            self.options.clone(),
        );
        let processor_task = tokio::spawn(processor.run(rx, self.shutdown.subscribe()));
        let refresher_task = tokio::spawn(Arc::clone(&self.refresher).run(self.shutdown.subscribe()));

        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.push(processor_task);
            tasks.push(refresher_task);
        }

        info!(
            suppression_window = ?self.hook_state.guard().window(),
            "scroll sync initialized"
        );
        Ok(())
    }

    /// Re-enumerates candidate windows, reconciling the selection.
    pub fn refresh_windows(&self) -> Result<usize, SessionError> {
        Ok(self.catalog.refresh()?)
    }

    /// Snapshot of the current window list.
    pub fn windows(&self) -> Arc<Vec<WindowRef>> {
        self.catalog.windows()
    }

    /// Observes every refreshed window list.
    pub fn subscribe_windows(&self) -> watch::Receiver<Arc<Vec<WindowRef>>> {
        self.catalog.subscribe()
    }

    pub fn select_source(&self, handle: WindowHandle) -> Result<WindowRef, SessionError> {
        let window = self.catalog.find(handle).ok_or(SessionError::UnknownWindow(handle))?;
        info!(window = %window.display_name(), "source selected");
        self.state.set_source(Some(window.clone()));
        Ok(window)
    }

    pub fn select_target(&self, handle: WindowHandle) -> Result<WindowRef, SessionError> {
        let window = self.catalog.find(handle).ok_or(SessionError::UnknownWindow(handle))?;
        info!(window = %window.display_name(), "target selected");
        self.state.set_target(Some(window.clone()));
        Ok(window)
    }

    pub fn clear_selection(&self) {
        self.state.set_source(None);
        self.state.set_target(None);
        self.hook_state.clear_rects();
    }

    pub fn source(&self) -> Option<Arc<WindowRef>> {
        self.state.source()
    }

    pub fn target(&self) -> Option<Arc<WindowRef>> {
        self.state.target()
    }

    /// Begins forwarding scrolls.
    ///
    /// Fails without changing any state unless both windows are selected and
    /// distinct.
    pub fn start(&self) -> Result<(), SessionError> {
        if !self.initialized.load(Ordering::SeqCst) {
            return Err(SessionError::NotInitialized);
        }
        let (source, target) = match (self.state.source(), self.state.target()) {
            (Some(source), Some(target)) if source.handle != target.handle => (source, target),
            _ => {
                warn!("cannot start: select two different windows first");
                return Err(SessionError::InvalidSelection);
            }
        };

        self.state.set_screen_size(Some(self.windows.screen_size()));
        self.state.set_run_state(RunState::Running);
        // Fill the rect cache now instead of waiting for the next tick.
        self.refresher.refresh_once();

        info!(
            source = %source.display_name(),
            target = %target.display_name(),
            "scroll sync started"
        );
        Ok(())
    }

    /// Stops forwarding.  The hook stays installed.
    ///
    /// The guard is disarmed as well, so real input over the old target is
    /// never swallowed once forwarding has stopped.
    pub fn stop(&self) {
        if self.state.set_run_state(RunState::Stopped) == RunState::Running {
            info!("scroll sync stopped");
        }
        self.hook_state.clear_rects();
        self.hook_state.guard().disarm();
    }

    pub fn run_state(&self) -> RunState {
        self.state.run_state()
    }

    /// Observes run state changes, including automatic stops.
    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Uninstalls the hook and waits for the background tasks to end.
    ///
    /// Every step runs even if an earlier one failed.
    pub async fn shutdown(&self) {
        if let Err(e) = self.hook.uninstall() {
            error!("failed to uninstall mouse hook: {e}");
        }
        // The hook normally detaches on uninstall; make sure the channel is
        // closed either way.
        self.hook_state.detach();
        self.state.set_run_state(RunState::Stopped);
        self.shutdown.send_replace(true);
        self.hook_state.clear_rects();

        let tasks = match self.tasks.lock() {
            Ok(mut tasks) => std::mem::take(&mut *tasks),
            Err(_) => Vec::new(),
        };
        for task in tasks {
            if let Err(e) = task.await {
                warn!("background task ended abnormally: {e}");
            }
        }
        self.initialized.store(false, Ordering::SeqCst);
        info!("scroll sync shut down");
    }

    /// Shared hook state, for front ends that want to inspect the rect cache.
    pub fn hook_state(&self) -> &Arc<HookState> {
        &self.hook_state
    }
}
