//! Mock window system for unit testing.
//!
//! Tests describe a fake desktop (windows, rects, who owns which point) and
//! mutate it between calls to simulate windows moving, closing, or being
//! covered by another application.

use std::collections::HashMap;
use std::sync::Mutex;

use syncscroll_core::{point_in_rect, Point, ProcessId, Rect, ScreenSize, WindowHandle, WindowRef};

use super::{WindowQueryError, WindowSystem};

/// One fake top-level window.
#[derive(Debug, Clone)]
struct FakeWindow {
    info: WindowRef,
    rect: Rect,
    children: Vec<WindowHandle>,
}

/// An in-memory desktop.
///
/// `process_at_point` returns the owner of the first registered window whose
/// rect contains the point, unless an override was set with
/// [`cover_point`](Self::cover_point).
pub struct MockWindowSystem {
    windows: Mutex<Vec<FakeWindow>>,
    covered: Mutex<HashMap<(i32, i32), ProcessId>>,
    screen: Mutex<ScreenSize>,
    cursor: Mutex<Option<Point>>,
    fail_enumeration: Mutex<bool>,
}

impl MockWindowSystem {
    /// Creates an empty 1920x1080 desktop.
    pub fn new() -> Self {
        Self {
            windows: Mutex::new(Vec::new()),
            covered: Mutex::new(HashMap::new()),
            screen: Mutex::new(ScreenSize::new(1920, 1080)),
            cursor: Mutex::new(None),
            fail_enumeration: Mutex::new(false),
        }
    }

    /// Adds a window and returns its [`WindowRef`].
    pub fn add_window(&self, handle: isize, title: &str, process_id: ProcessId, rect: Rect) -> WindowRef {
        let info = WindowRef {
            title: title.to_string(),
            class_name: "MockWindowClass".to_string(),
            handle: WindowHandle(handle),
            process_id,
            process_name: format!("process-{process_id}"),
        };
        self.windows.lock().expect("lock poisoned").push(FakeWindow {
            info: info.clone(),
            rect,
            children: Vec::new(),
        });
        info
    }

    /// Registers child windows of `parent`.
    pub fn set_children(&self, parent: isize, children: &[isize]) {
        let mut windows = self.windows.lock().expect("lock poisoned");
        if let Some(window) = windows.iter_mut().find(|w| w.info.handle.0 == parent) {
            window.children = children.iter().copied().map(WindowHandle).collect();
        }
    }

    /// Moves or resizes a window.
    pub fn move_window(&self, handle: isize, rect: Rect) {
        let mut windows = self.windows.lock().expect("lock poisoned");
        if let Some(window) = windows.iter_mut().find(|w| w.info.handle.0 == handle) {
            window.rect = rect;
        }
    }

    /// Renames a window.
    pub fn rename_window(&self, handle: isize, title: &str) {
        let mut windows = self.windows.lock().expect("lock poisoned");
        if let Some(window) = windows.iter_mut().find(|w| w.info.handle.0 == handle) {
            window.info.title = title.to_string();
        }
    }

    /// Removes a window, as if it had been closed.
    pub fn close_window(&self, handle: isize) {
        self.windows
            .lock()
            .expect("lock poisoned")
            .retain(|w| w.info.handle.0 != handle);
    }

    /// Pretends a window of `process_id` sits on top at `point`.
    pub fn cover_point(&self, point: Point, process_id: ProcessId) {
        self.covered
            .lock()
            .expect("lock poisoned")
            .insert((point.x, point.y), process_id);
    }

    pub fn set_screen_size(&self, screen: ScreenSize) {
        *self.screen.lock().expect("lock poisoned") = screen;
    }

    pub fn set_cursor_position(&self, point: Option<Point>) {
        *self.cursor.lock().expect("lock poisoned") = point;
    }

    /// When `true`, `list_windows` fails.
    pub fn set_fail_enumeration(&self, fail: bool) {
        *self.fail_enumeration.lock().expect("lock poisoned") = fail;
    }
}

impl Default for MockWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSystem for MockWindowSystem {
    fn list_windows(&self) -> Result<Vec<WindowRef>, WindowQueryError> {
        if *self.fail_enumeration.lock().expect("lock poisoned") {
            return Err(WindowQueryError::Enumeration("injected failure".to_string()));
        }
        Ok(self
            .windows
            .lock()
            .expect("lock poisoned")
            .iter()
            .map(|w| w.info.clone())
            .collect())
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Rect, WindowQueryError> {
        self.windows
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|w| w.info.handle == handle)
            .map(|w| w.rect)
            .ok_or(WindowQueryError::WindowGone(handle))
    }

    fn process_at_point(&self, point: Point) -> Result<ProcessId, WindowQueryError> {
        if let Some(pid) = self.covered.lock().expect("lock poisoned").get(&(point.x, point.y)) {
            return Ok(*pid);
        }
        self.windows
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|w| point_in_rect(&w.rect, point))
            .map(|w| w.info.process_id)
            .ok_or(WindowQueryError::NoWindowAtPoint(point))
    }

    fn visible_children(&self, handle: WindowHandle) -> Result<Vec<WindowHandle>, WindowQueryError> {
        self.windows
            .lock()
            .expect("lock poisoned")
            .iter()
            .find(|w| w.info.handle == handle)
            .map(|w| w.children.clone())
            .ok_or(WindowQueryError::WindowGone(handle))
    }

    fn screen_size(&self) -> ScreenSize {
        *self.screen.lock().expect("lock poisoned")
    }

    fn cursor_position(&self) -> Option<Point> {
        *self.cursor.lock().expect("lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::window_system::is_owned_by;

    #[test]
    fn test_mock_window_rect_follows_moves() {
        // Arrange
        let system = MockWindowSystem::new();
        system.add_window(1, "Editor", 10, Rect::new(0, 0, 100, 100));

        // Act
        system.move_window(1, Rect::new(50, 50, 150, 150));

        // Assert
        assert_eq!(system.window_rect(WindowHandle(1)).unwrap(), Rect::new(50, 50, 150, 150));
    }

    #[test]
    fn test_mock_closed_window_is_gone() {
        let system = MockWindowSystem::new();
        system.add_window(1, "Editor", 10, Rect::new(0, 0, 100, 100));

        system.close_window(1);

        assert!(matches!(
            system.window_rect(WindowHandle(1)),
            Err(WindowQueryError::WindowGone(WindowHandle(1)))
        ));
        assert!(system.list_windows().unwrap().is_empty());
    }

    #[test]
    fn test_is_owned_by_honours_covering_window() {
        let system = MockWindowSystem::new();
        system.add_window(1, "Editor", 10, Rect::new(0, 0, 100, 100));

        assert!(is_owned_by(&system, Point::new(50, 50), 10));

        system.cover_point(Point::new(50, 50), 99);
        assert!(!is_owned_by(&system, Point::new(50, 50), 10));
    }

    #[test]
    fn test_is_owned_by_is_false_on_empty_desktop() {
        let system = MockWindowSystem::new();
        assert!(!is_owned_by(&system, Point::new(1, 1), 10));
    }
}
