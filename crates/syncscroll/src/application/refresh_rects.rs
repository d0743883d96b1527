//! RectRefresher: keeps the hook's rectangle cache current.
//!
//! The hook callback cannot query windows (it must return within the OS
//! timeout), so it tests event points against rects cached in [`HookState`].
//! This task re-reads both rects on a fixed interval and publishes them.
//!
//! Each tick:
//!
//! - not Running, or the selection is incomplete: clear the cache,
//! - either window cannot be queried: clear the cache and, with
//!   `auto_stop_on_lost_window`, stop the session and refresh the window list,
//! - with strict checking, another process covers the center of either
//!   window: clear the cache (the hook stops capturing until it is uncovered),
//! - otherwise: store both rects.

use std::sync::Arc;

use syncscroll_core::{Rect, WindowRef};
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::manage_windows::WindowCatalog;
use super::session::SyncOptions;
use super::sync_state::{RunState, SyncState};
use crate::infrastructure::mouse_hook::HookState;
use crate::infrastructure::window_system::{is_owned_by, WindowSystem};

/// What one refresh tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Nothing to track; the cache was cleared.
    Cleared,
    /// Both rects were stored.
    Updated { source: Rect, target: Rect },
    /// A window is covered by another process; the cache was cleared.
    Obscured,
    /// A window could not be queried; the cache was cleared.
    Lost,
}

/// Periodic rect cache updater.
pub struct RectRefresher {
    windows: Arc<dyn WindowSystem>,
    hook: Arc<HookState>,
    state: Arc<SyncState>,
    catalog: Arc<WindowCatalog>,
    options: SyncOptions,
}

impl RectRefresher {
    pub fn new(
        windows: Arc<dyn WindowSystem>,
        hook: Arc<HookState>,
        state: Arc<SyncState>,
        catalog: Arc<WindowCatalog>,
        options: SyncOptions,
    ) -> Self {
        Self {
            windows,
            hook,
            state,
            catalog,
            options,
        }
    }

    /// Ticks every `rect_refresh_interval` until `shutdown` turns `true`.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = interval(self.options.rect_refresh_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        debug!(interval = ?self.options.rect_refresh_interval, "rect refresher started");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh_once();
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        self.hook.clear_rects();
        debug!("rect refresher stopped");
    }

    /// Runs a single tick.
    pub fn refresh_once(&self) -> RefreshOutcome {
        if !self.state.is_running() {
            self.hook.clear_rects();
            return RefreshOutcome::Cleared;
        }
        let (Some(source), Some(target)) = (self.state.source(), self.state.target()) else {
            self.hook.clear_rects();
            return RefreshOutcome::Cleared;
        };

        let rects = self
            .windows
            .window_rect(source.handle)
            .and_then(|s| Ok((s, self.windows.window_rect(target.handle)?)));
        let (source_rect, target_rect) = match rects {
            Ok(rects) => rects,
            Err(e) => {
                self.hook.clear_rects();
                self.handle_lost_window(&e.to_string());
                return RefreshOutcome::Lost;
            }
        };

        if self.options.strict_process_check
            && (!self.is_on_top(&source, &source_rect) || !self.is_on_top(&target, &target_rect))
        {
            self.hook.clear_rects();
            return RefreshOutcome::Obscured;
        }

        self.hook.set_source_rect(Some(source_rect));
        self.hook.set_target_rect(Some(target_rect));
        RefreshOutcome::Updated {
            source: source_rect,
            target: target_rect,
        }
    }

    fn is_on_top(&self, window: &WindowRef, rect: &Rect) -> bool {
        let on_top = is_owned_by(self.windows.as_ref(), rect.center(), window.process_id);
        if !on_top {
            debug!(window = %window.display_name(), "window center is covered by another process");
        }
        on_top
    }

    fn handle_lost_window(&self, reason: &str) {
        if !self.options.auto_stop_on_lost_window {
            debug!("selected window unavailable: {reason}");
            return;
        }
        warn!("selected window unavailable, stopping: {reason}");
        if self.state.set_run_state(RunState::Stopped) == RunState::Running {
            info!("scroll sync stopped");
        }
        if let Err(e) = self.catalog.refresh() {
            warn!("failed to refresh window list: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::window_system::mock::MockWindowSystem;
    use std::time::Duration;
    use syncscroll_core::Point;

    struct Fixture {
        windows: Arc<MockWindowSystem>,
        hook: Arc<HookState>,
        state: Arc<SyncState>,
    }

    impl Fixture {
        fn new() -> Self {
            let windows = Arc::new(MockWindowSystem::new());
            let source = windows.add_window(1, "Source", 100, Rect::new(0, 0, 100, 100));
            let target = windows.add_window(2, "Target", 200, Rect::new(200, 200, 400, 400));
            let state = Arc::new(SyncState::new());
            state.set_source(Some(source));
            state.set_target(Some(target));
            state.set_run_state(RunState::Running);
            Self {
                windows,
                hook: Arc::new(HookState::default()),
                state,
            }
        }

        fn refresher(&self, options: SyncOptions) -> RectRefresher {
            let windows = Arc::clone(&self.windows) as Arc<dyn WindowSystem>;
            let catalog = Arc::new(WindowCatalog::new(
                Arc::clone(&windows),
                Arc::clone(&self.state),
                options.preserve_selection_on_refresh,
            ));
            RectRefresher::new(windows, Arc::clone(&self.hook), Arc::clone(&self.state), catalog, options)
        }
    }

    #[test]
    fn test_refresh_stores_both_rects() {
        // Arrange
        let f = Fixture::new();
        let refresher = f.refresher(SyncOptions::default());

        // Act
        let outcome = refresher.refresh_once();

        // Assert
        assert_eq!(
            outcome,
            RefreshOutcome::Updated {
                source: Rect::new(0, 0, 100, 100),
                target: Rect::new(200, 200, 400, 400)
            }
        );
        assert_eq!(f.hook.source_rect(), Some(Rect::new(0, 0, 100, 100)));
        assert_eq!(f.hook.target_rect(), Some(Rect::new(200, 200, 400, 400)));
    }

    #[test]
    fn test_refresh_picks_up_moved_window() {
        let f = Fixture::new();
        let refresher = f.refresher(SyncOptions::default());
        refresher.refresh_once();

        f.windows.move_window(1, Rect::new(10, 10, 110, 110));
        refresher.refresh_once();

        assert_eq!(f.hook.source_rect(), Some(Rect::new(10, 10, 110, 110)));
    }

    #[test]
    fn test_refresh_clears_cache_when_stopped() {
        let f = Fixture::new();
        let refresher = f.refresher(SyncOptions::default());
        refresher.refresh_once();

        f.state.set_run_state(RunState::Stopped);
        let outcome = refresher.refresh_once();

        assert_eq!(outcome, RefreshOutcome::Cleared);
        assert_eq!(f.hook.source_rect(), None);
        assert_eq!(f.hook.target_rect(), None);
    }

    #[test]
    fn test_refresh_clears_cache_without_target() {
        let f = Fixture::new();
        f.state.set_target(None);
        let refresher = f.refresher(SyncOptions::default());

        assert_eq!(refresher.refresh_once(), RefreshOutcome::Cleared);
    }

    #[test]
    fn test_lost_window_stops_session_and_clears_selection() {
        // Arrange
        let f = Fixture::new();
        let refresher = f.refresher(SyncOptions::default());
        f.windows.close_window(2);

        // Act
        let outcome = refresher.refresh_once();

        // Assert
        assert_eq!(outcome, RefreshOutcome::Lost);
        assert_eq!(f.state.run_state(), RunState::Stopped);
        assert!(f.state.target().is_none(), "catalog refresh must drop the vanished target");
        assert!(f.state.source().is_some());
        assert_eq!(f.hook.source_rect(), None);
    }

    #[test]
    fn test_lost_window_without_auto_stop_keeps_running() {
        let f = Fixture::new();
        let options = SyncOptions {
            auto_stop_on_lost_window: false,
            ..SyncOptions::default()
        };
        let refresher = f.refresher(options);
        f.windows.close_window(1);

        assert_eq!(refresher.refresh_once(), RefreshOutcome::Lost);
        assert_eq!(f.state.run_state(), RunState::Running);
        assert!(f.state.source().is_some());
    }

    #[test]
    fn test_covered_target_center_clears_cache_in_strict_mode() {
        let f = Fixture::new();
        f.windows.cover_point(Point::new(300, 300), 999);
        let refresher = f.refresher(SyncOptions::default());

        assert_eq!(refresher.refresh_once(), RefreshOutcome::Obscured);
        assert_eq!(f.hook.target_rect(), None);
        assert_eq!(f.state.run_state(), RunState::Running);
    }

    #[test]
    fn test_covered_center_is_ignored_in_relaxed_mode() {
        let f = Fixture::new();
        f.windows.cover_point(Point::new(300, 300), 999);
        let options = SyncOptions {
            strict_process_check: false,
            ..SyncOptions::default()
        };
        let refresher = f.refresher(options);

        assert!(matches!(refresher.refresh_once(), RefreshOutcome::Updated { .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_until_shutdown() {
        // Arrange
        let f = Fixture::new();
        let refresher = Arc::new(f.refresher(SyncOptions::default()));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(Arc::clone(&refresher).run(shutdown_rx));

        // Act: the first tick fires immediately.
        tokio::time::sleep(Duration::from_millis(10)).await;
        let cached = f.hook.source_rect();
        shutdown_tx.send_replace(true);
        task.await.expect("task must not panic");

        // Assert
        assert_eq!(cached, Some(Rect::new(0, 0, 100, 100)));
        assert_eq!(f.hook.source_rect(), None, "shutdown clears the cache");
    }
}
