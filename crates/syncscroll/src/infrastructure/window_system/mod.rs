//! Window queries: enumeration, rectangles, ownership, and screen metrics.
//!
//! The application layer never calls Win32 directly.  Every question it asks
//! about the desktop goes through the [`WindowSystem`] trait, so the
//! processing loop, the rect refresher and the window catalog can all be
//! exercised against [`mock::MockWindowSystem`].

use syncscroll_core::{Point, ProcessId, Rect, ScreenSize, WindowHandle, WindowRef};
use thiserror::Error;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for window queries.
#[derive(Debug, Error)]
pub enum WindowQueryError {
    #[error("window {0} no longer exists")]
    WindowGone(WindowHandle),
    #[error("failed to read rect of window {handle}: {reason}")]
    Rect { handle: WindowHandle, reason: String },
    #[error("no window at point {0}")]
    NoWindowAtPoint(Point),
    #[error("window enumeration failed: {0}")]
    Enumeration(String),
    #[error("platform error: {0}")]
    Platform(String),
}

/// Desktop window queries.
///
/// Implementations must be cheap enough to call once per forwarded scroll.
pub trait WindowSystem: Send + Sync {
    /// Lists visible, titled top-level windows that do not belong to this
    /// process.
    fn list_windows(&self) -> Result<Vec<WindowRef>, WindowQueryError>;

    /// Current screen rectangle of `handle`.
    fn window_rect(&self, handle: WindowHandle) -> Result<Rect, WindowQueryError>;

    /// Process owning the window that is visible at `point`.
    fn process_at_point(&self, point: Point) -> Result<ProcessId, WindowQueryError>;

    /// Visible child windows of `handle`, in Z order.
    fn visible_children(&self, handle: WindowHandle) -> Result<Vec<WindowHandle>, WindowQueryError>;

    /// Primary screen size in pixels.
    fn screen_size(&self) -> ScreenSize;

    /// Current cursor position, if it can be read.
    fn cursor_position(&self) -> Option<Point>;
}

/// Returns `true` when the window visible at `point` belongs to `expected`.
///
/// Query failures count as "not owned".
pub fn is_owned_by(windows: &dyn WindowSystem, point: Point, expected: ProcessId) -> bool {
    matches!(windows.process_at_point(point), Ok(pid) if pid == expected)
}
