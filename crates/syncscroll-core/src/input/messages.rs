//! Decoded low-level mouse messages.
//!
//! The Win32 hook hands the callback a raw message id (`WPARAM`) and a pointer
//! to an `MSLLHOOKSTRUCT`.  Both are copied into the types below exactly once,
//! at the FFI boundary, so the rest of the pipeline never touches raw ids or
//! pointers.
//!
//! # Message classification
//!
//! Only three message kinds matter:
//!
//! | Id       | Name             | Kind                                |
//! |----------|------------------|-------------------------------------|
//! | `0x0200` | `WM_MOUSEMOVE`   | [`MouseMessage::Move`]              |
//! | `0x020A` | `WM_MOUSEWHEEL`  | [`MouseMessage::WheelVertical`]     |
//! | `0x020E` | `WM_MOUSEHWHEEL` | [`MouseMessage::WheelHorizontal`]   |
//!
//! Everything else (buttons, X-buttons, …) decodes to [`MouseMessage::Other`]
//! and is always passed through untouched.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::geometry::{unpack_hi_lo, Point};

/// `dwExtraInfo` value stamped on every synthetic event this program injects.
///
/// The hook ignores any event carrying this value, which is what stops
/// injected scrolls from being captured and re-injected in a loop.
pub const EXTRA_INFO_SENTINEL: usize = 520_165_553;

/// `WM_MOUSEMOVE`
pub const WM_MOUSEMOVE: u32 = 0x0200;
/// `WM_MOUSEWHEEL`
pub const WM_MOUSEWHEEL: u32 = 0x020A;
/// `WM_MOUSEHWHEEL`
pub const WM_MOUSEHWHEEL: u32 = 0x020E;

// ── MouseMessage ──────────────────────────────────────────────────────────────

/// Kind of a low-level mouse message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseMessage {
    WheelVertical,
    WheelHorizontal,
    Move,
    /// Any other mouse message, carrying its raw id.
    Other(u32),
}

impl MouseMessage {
    /// Decodes a raw window message id.
    pub fn from_id(id: u32) -> Self {
        match id {
            WM_MOUSEWHEEL => Self::WheelVertical,
            WM_MOUSEHWHEEL => Self::WheelHorizontal,
            WM_MOUSEMOVE => Self::Move,
            other => Self::Other(other),
        }
    }

    /// Returns the raw window message id.
    pub fn id(self) -> u32 {
        match self {
            Self::WheelVertical => WM_MOUSEWHEEL,
            Self::WheelHorizontal => WM_MOUSEHWHEEL,
            Self::Move => WM_MOUSEMOVE,
            Self::Other(id) => id,
        }
    }

    /// Returns the wheel axis for wheel messages, `None` otherwise.
    pub fn wheel_axis(self) -> Option<WheelAxis> {
        WheelAxis::try_from(self).ok()
    }
}

// ── WheelAxis ─────────────────────────────────────────────────────────────────

/// Which wheel produced a scroll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WheelAxis {
    Vertical,
    Horizontal,
}

impl WheelAxis {
    /// The window message that carries a scroll on this axis.
    pub fn message(self) -> MouseMessage {
        match self {
            Self::Vertical => MouseMessage::WheelVertical,
            Self::Horizontal => MouseMessage::WheelHorizontal,
        }
    }
}

/// Returned when a non-wheel message is converted to a [`WheelAxis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("message 0x{0:04X} is not a wheel message")]
pub struct NotAWheelMessage(pub u32);

impl TryFrom<MouseMessage> for WheelAxis {
    type Error = NotAWheelMessage;

    fn try_from(message: MouseMessage) -> Result<Self, Self::Error> {
        match message {
            MouseMessage::WheelVertical => Ok(Self::Vertical),
            MouseMessage::WheelHorizontal => Ok(Self::Horizontal),
            other => Err(NotAWheelMessage(other.id())),
        }
    }
}

// ── MouseRecord ───────────────────────────────────────────────────────────────

/// Platform-neutral copy of `MSLLHOOKSTRUCT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MouseRecord {
    /// Cursor position in screen pixels.
    pub point: Point,
    /// Packed mouse data.  For wheel messages the high word is the signed
    /// wheel delta.
    pub mouse_data: u32,
    /// `LLMHF_*` flags.
    pub flags: u32,
    /// Event timestamp in milliseconds.
    pub time: u32,
    /// Caller-supplied extra information (`dwExtraInfo`).
    pub extra_info: usize,
}

impl MouseRecord {
    /// `true` if the event was injected by this program.
    pub fn is_synthetic(&self) -> bool {
        self.extra_info == EXTRA_INFO_SENTINEL
    }

    /// Signed wheel delta from the high word of `mouse_data`.
    pub fn wheel_delta(&self) -> i16 {
        unpack_hi_lo(self.mouse_data).1
    }
}

impl fmt::Display for MouseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "X={}, Y={}, MouseData={}, Flags={}, Time={}, ExtraInfo={}",
            self.point.x, self.point.y, self.mouse_data, self.flags, self.time, self.extra_info
        )
    }
}

// ── RawScrollEvent ────────────────────────────────────────────────────────────

/// A wheel event captured over the source window, queued for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawScrollEvent {
    pub axis: WheelAxis,
    pub record: MouseRecord,
}

impl RawScrollEvent {
    pub fn new(axis: WheelAxis, record: MouseRecord) -> Self {
        Self { axis, record }
    }
}
