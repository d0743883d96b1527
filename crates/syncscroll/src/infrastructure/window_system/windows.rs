//! Win32 implementation of [`WindowSystem`].
//!
//! Enumeration follows the usual two-phase pattern: `EnumWindows` only
//! collects handles, and each handle is described afterwards so a failure on
//! one window (closed mid-enumeration, elevated owner process, …) is logged
//! and skipped instead of aborting the whole list.
//!
//! # Safety
//!
//! Every `unsafe` block is a Win32 FFI call; each carries a `// SAFETY:` note.

#![cfg(target_os = "windows")]

use std::ffi::c_void;
use std::path::Path;

use syncscroll_core::{
    has_visible_title, sort_for_display, Point, ProcessId, Rect, ScreenSize, WindowHandle,
    WindowRef, UNKNOWN_PROCESS_NAME,
};
use tracing::{debug, warn};
use windows::core::{BOOL, PWSTR};
use windows::Win32::Foundation::{CloseHandle, HWND, LPARAM, POINT, RECT};
use windows::Win32::System::Threading::{
    GetCurrentProcessId, OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
    PROCESS_QUERY_LIMITED_INFORMATION,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumChildWindows, EnumWindows, GetClassNameW, GetCursorPos, GetSystemMetrics,
    GetWindowRect, GetWindowTextLengthW, GetWindowTextW, GetWindowThreadProcessId, IsWindow,
    IsWindowVisible, WindowFromPoint, SM_CXSCREEN, SM_CYSCREEN,
};

use super::{WindowQueryError, WindowSystem};

/// Longest class name Win32 allows.
const MAX_CLASS_NAME: usize = 256;
/// Buffer size for process image paths.
const MAX_IMAGE_PATH: usize = 1024;

/// Windows implementation of [`WindowSystem`].
pub struct WindowsWindowSystem {
    own_process_id: ProcessId,
}

impl WindowsWindowSystem {
    pub fn new() -> Self {
        // SAFETY: always safe to call.
        let own_process_id = unsafe { GetCurrentProcessId() };
        Self { own_process_id }
    }
}

impl Default for WindowsWindowSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl WindowSystem for WindowsWindowSystem {
    fn list_windows(&self) -> Result<Vec<WindowRef>, WindowQueryError> {
        let mut handles: Vec<HWND> = Vec::new();

        // SAFETY: the callback only pushes into `handles`, which outlives the
        // synchronous EnumWindows call.
        unsafe {
            EnumWindows(
                Some(collect_handle_proc),
                LPARAM(&mut handles as *mut Vec<HWND> as isize),
            )
        }
        .map_err(|e| WindowQueryError::Enumeration(e.to_string()))?;

        let mut windows = Vec::with_capacity(handles.len());
        for hwnd in handles {
            // SAFETY: IsWindowVisible accepts any handle value.
            if !unsafe { IsWindowVisible(hwnd) }.as_bool() {
                continue;
            }
            match describe_window(hwnd) {
                Ok(Some(window)) if window.process_id != self.own_process_id => windows.push(window),
                Ok(_) => {}
                Err(e) => warn!(hwnd = hwnd.0 as isize, "skipping window: {e}"),
            }
        }

        sort_for_display(&mut windows);
        debug!("enumerated {} windows", windows.len());
        Ok(windows)
    }

    fn window_rect(&self, handle: WindowHandle) -> Result<Rect, WindowQueryError> {
        let hwnd = to_hwnd(handle);
        // SAFETY: IsWindow accepts any handle value.
        if !unsafe { IsWindow(Some(hwnd)) }.as_bool() {
            return Err(WindowQueryError::WindowGone(handle));
        }

        let mut rect = RECT::default();
        // SAFETY: `rect` is a valid out-pointer for the duration of the call.
        unsafe { GetWindowRect(hwnd, &mut rect) }.map_err(|e| WindowQueryError::Rect {
            handle,
            reason: e.to_string(),
        })?;
        Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn process_at_point(&self, point: Point) -> Result<ProcessId, WindowQueryError> {
        // SAFETY: WindowFromPoint takes the point by value.
        let hwnd = unsafe { WindowFromPoint(POINT { x: point.x, y: point.y }) };
        if hwnd.is_invalid() {
            return Err(WindowQueryError::NoWindowAtPoint(point));
        }
        match window_process_id(hwnd) {
            0 => Err(WindowQueryError::NoWindowAtPoint(point)),
            pid => Ok(pid),
        }
    }

    fn visible_children(&self, handle: WindowHandle) -> Result<Vec<WindowHandle>, WindowQueryError> {
        let parent = to_hwnd(handle);
        // SAFETY: IsWindow accepts any handle value.
        if !unsafe { IsWindow(Some(parent)) }.as_bool() {
            return Err(WindowQueryError::WindowGone(handle));
        }

        let mut children: Vec<HWND> = Vec::new();
        // SAFETY: same contract as the EnumWindows call above.  The return
        // value carries no error information for this API.
        let _ = unsafe {
            EnumChildWindows(
                Some(parent),
                Some(collect_handle_proc),
                LPARAM(&mut children as *mut Vec<HWND> as isize),
            )
        };

        Ok(children
            .into_iter()
            // SAFETY: IsWindowVisible accepts any handle value.
            .filter(|child| unsafe { IsWindowVisible(*child) }.as_bool())
            .map(from_hwnd)
            .collect())
    }

    fn screen_size(&self) -> ScreenSize {
        // SAFETY: GetSystemMetrics is always safe to call
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        ScreenSize::new(width, height)
    }

    fn cursor_position(&self) -> Option<Point> {
        let mut point = POINT::default();
        // SAFETY: `point` is a valid out-pointer.
        unsafe { GetCursorPos(&mut point) }.ok()?;
        Some(Point::new(point.x, point.y))
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

fn from_hwnd(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

/// Reads title, class and owner of one window.  Windows with a blank title
/// yield `None`.
fn describe_window(hwnd: HWND) -> Result<Option<WindowRef>, WindowQueryError> {
    let title = window_title(hwnd);
    if !has_visible_title(&title) {
        return Ok(None);
    }

    let process_id = window_process_id(hwnd);
    if process_id == 0 {
        return Err(WindowQueryError::WindowGone(from_hwnd(hwnd)));
    }

    Ok(Some(WindowRef {
        title,
        class_name: window_class_name(hwnd),
        handle: from_hwnd(hwnd),
        process_id,
        process_name: process_name_or_unknown(process_id),
    }))
}

fn window_title(hwnd: HWND) -> String {
    // SAFETY: GetWindowTextLengthW accepts any handle value.
    let len = unsafe { GetWindowTextLengthW(hwnd) };
    if len <= 0 {
        return String::new();
    }
    let mut buf = vec![0u16; len as usize + 1];
    // SAFETY: `buf` is writable for its full length.
    let copied = unsafe { GetWindowTextW(hwnd, &mut buf) };
    String::from_utf16_lossy(&buf[..copied.max(0) as usize])
}

fn window_class_name(hwnd: HWND) -> String {
    let mut buf = [0u16; MAX_CLASS_NAME];
    // SAFETY: `buf` is writable for its full length.
    let copied = unsafe { GetClassNameW(hwnd, &mut buf) };
    String::from_utf16_lossy(&buf[..copied.max(0) as usize])
}

fn window_process_id(hwnd: HWND) -> ProcessId {
    let mut pid: u32 = 0;
    // SAFETY: `pid` is a valid out-pointer.
    unsafe { GetWindowThreadProcessId(hwnd, Some(&mut pid)) };
    pid
}

/// Like [`process_name`], but an unreadable process (elevated, protected,
/// exited) keeps its window in the list under [`UNKNOWN_PROCESS_NAME`].
fn process_name_or_unknown(pid: ProcessId) -> String {
    process_name(pid).unwrap_or_else(|e| {
        debug!("process name unavailable: {e}");
        UNKNOWN_PROCESS_NAME.to_string()
    })
}

/// Executable name of `pid` without directory or extension, e.g. `chrome`.
fn process_name(pid: ProcessId) -> Result<String, WindowQueryError> {
    // SAFETY: the returned handle is closed below on every path.
    let process = unsafe { OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid) }
        .map_err(|e| WindowQueryError::Platform(format!("OpenProcess({pid}) failed: {e}")))?;

    let mut buf = vec![0u16; MAX_IMAGE_PATH];
    let mut len = buf.len() as u32;
    // SAFETY: `buf` holds `len` u16 slots and `len` is a valid in/out pointer.
    let queried = unsafe {
        QueryFullProcessImageNameW(process, PROCESS_NAME_WIN32, PWSTR(buf.as_mut_ptr()), &mut len)
    };
    // SAFETY: `process` was opened above and is not used afterwards.
    if let Err(e) = unsafe { CloseHandle(process) } {
        debug!("CloseHandle for process {pid} failed: {e}");
    }
    queried.map_err(|e| {
        WindowQueryError::Platform(format!("QueryFullProcessImageNameW({pid}) failed: {e}"))
    })?;

    let path = String::from_utf16_lossy(&buf[..len as usize]);
    let stem = Path::new(&path)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned());
    Ok(stem.unwrap_or(path))
}

/// `EnumWindows` / `EnumChildWindows` callback that collects every handle.
///
/// # Safety
///
/// `lparam` must point to a live `Vec<HWND>` for the duration of the
/// enumeration call.
unsafe extern "system" fn collect_handle_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
    let handles = &mut *(lparam.0 as *mut Vec<HWND>);
    handles.push(hwnd);
    BOOL::from(true)
}
