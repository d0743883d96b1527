//! Window identity.
//!
//! A [`WindowRef`] is a snapshot of one top-level window taken during
//! enumeration.  Snapshots are never mutated: every refresh of the window list
//! produces new values, and a previously selected window is found again in the
//! new list by comparing handles (see [`reconcile_selection`]).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// OS process identifier.
pub type ProcessId = u32;

/// Opaque platform window handle (`HWND` on Windows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WindowHandle(pub isize);

impl WindowHandle {
    /// Numeric form used for stable sort order and log output.
    pub fn as_i64(self) -> i64 {
        self.0 as i64
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A candidate source or target window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowRef {
    /// Window title.
    pub title: String,
    /// Window class name.
    pub class_name: String,
    pub handle: WindowHandle,
    /// Process that owns the window.
    pub process_id: ProcessId,
    /// Executable name of the owning process.
    pub process_name: String,
}

impl WindowRef {
    /// Human-readable label shown in window pickers and logs.
    pub fn display_name(&self) -> String {
        format!(
            "{} [{}, class: {}], pid: {}, hwnd: {}",
            self.title, self.process_name, self.class_name, self.process_id, self.handle
        )
    }

    /// Display order: title, process name, pid, class name, then handle.
    pub fn display_order(&self, other: &Self) -> Ordering {
        self.title
            .cmp(&other.title)
            .then_with(|| self.process_name.cmp(&other.process_name))
            .then_with(|| self.process_id.cmp(&other.process_id))
            .then_with(|| self.class_name.cmp(&other.class_name))
            .then_with(|| self.handle.as_i64().cmp(&other.handle.as_i64()))
    }
}

impl fmt::Display for WindowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

/// Process name shown when the owning process cannot be queried (elevated,
/// protected, or already exited).
pub const UNKNOWN_PROCESS_NAME: &str = "<unknown>";

/// Returns `true` when `title` has at least one non-whitespace character.
///
/// Windows whose title is empty or blank are not offered for selection.
pub fn has_visible_title(title: &str) -> bool {
    !title.trim().is_empty()
}

/// Sorts a window list into display order.
pub fn sort_for_display(windows: &mut [WindowRef]) {
    windows.sort_by(WindowRef::display_order);
}

/// Re-resolves a previous selection against a freshly enumerated list.
///
/// - `previous == None` stays `None`.
/// - With `preserve == true` the window with the same handle in `refreshed`
///   is returned (carrying its updated title/class), or `None` if it vanished.
/// - With `preserve == false` any refresh drops the selection.
pub fn reconcile_selection(
    previous: Option<&WindowRef>,
    refreshed: &[WindowRef],
    preserve: bool,
) -> Option<WindowRef> {
    let previous = previous?;
    if !preserve {
        return None;
    }
    refreshed
        .iter()
        .find(|w| w.handle == previous.handle)
        .cloned()
}
