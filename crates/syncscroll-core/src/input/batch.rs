//! Synthetic input records.
//!
//! A forwarded scroll is delivered to the target as one atomic batch of three
//! `MOUSEINPUT` records submitted in a single `SendInput` call:
//!
//! 1. absolute move to the remapped point inside the target,
//! 2. wheel (or horizontal wheel) with the original delta at that point,
//! 3. absolute move back to the original point inside the source.
//!
//! Submitting the three together keeps other input from interleaving, so the
//! visible cursor ends where the user left it.  Every record carries
//! [`EXTRA_INFO_SENTINEL`] so the hook lets it through without reprocessing.
//!
//! The legacy delivery mode skips cursor movement entirely and instead posts
//! the wheel message straight to the target's child windows ([`LegacyPost`]).

use std::fmt;
use std::ops::BitOr;

use crate::domain::geometry::{pack_hi_lo, Point};
use crate::input::messages::{WheelAxis, EXTRA_INFO_SENTINEL};

// ── MouseFlags ────────────────────────────────────────────────────────────────

/// `MOUSEEVENTF_*` bit set for a synthetic mouse record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MouseFlags(pub u32);

impl MouseFlags {
    pub const MOVE: Self = Self(0x0001);
    pub const WHEEL: Self = Self(0x0800);
    pub const HWHEEL: Self = Self(0x1000);
    pub const MOVE_NOCOALESCE: Self = Self(0x2000);
    pub const ABSOLUTE: Self = Self(0x8000);

    /// Returns `true` if every bit of `other` is set in `self`.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Wheel flag for the given axis.
    pub fn wheel(axis: WheelAxis) -> Self {
        match axis {
            WheelAxis::Vertical => Self::WHEEL,
            WheelAxis::Horizontal => Self::HWHEEL,
        }
    }
}

impl BitOr for MouseFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ── SyntheticInput ────────────────────────────────────────────────────────────

/// One synthetic `MOUSEINPUT` record.
///
/// `dx`/`dy` are in the normalized absolute space when
/// [`MouseFlags::ABSOLUTE`] is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticInput {
    pub dx: i32,
    pub dy: i32,
    /// Wheel delta reinterpreted as `u32` (the Win32 field is a `DWORD`).
    pub mouse_data: u32,
    pub flags: MouseFlags,
    pub extra_info: usize,
}

impl SyntheticInput {
    /// Absolute, non-coalesced move to `at`.
    pub fn move_to(at: Point) -> Self {
        Self {
            dx: at.x,
            dy: at.y,
            mouse_data: 0,
            flags: MouseFlags::MOVE | MouseFlags::ABSOLUTE | MouseFlags::MOVE_NOCOALESCE,
            extra_info: EXTRA_INFO_SENTINEL,
        }
    }

    /// Wheel rotation of `delta` on `axis` at the absolute point `at`.
    pub fn wheel_at(axis: WheelAxis, at: Point, delta: i16) -> Self {
        Self {
            dx: at.x,
            dy: at.y,
            mouse_data: i32::from(delta) as u32,
            flags: MouseFlags::wheel(axis) | MouseFlags::ABSOLUTE | MouseFlags::MOVE_NOCOALESCE,
            extra_info: EXTRA_INFO_SENTINEL,
        }
    }

    /// Wheel delta as the signed value it was built from.
    pub fn wheel_delta(&self) -> i32 {
        self.mouse_data as i32
    }
}

impl fmt::Display for SyntheticInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Dx={}, Dy={}, MouseData={}, Flags=0x{:04X}, ExtraInfo={}",
            self.dx,
            self.dy,
            self.wheel_delta(),
            self.flags.0,
            self.extra_info
        )
    }
}

/// Builds the move / wheel / move-back batch.
///
/// `source_abs` and `target_abs` must already be normalized to the absolute
/// input space (see [`crate::ScreenSize::normalize`]).
pub fn build_scroll_batch(
    axis: WheelAxis,
    source_abs: Point,
    target_abs: Point,
    delta: i16,
) -> [SyntheticInput; 3] {
    [
        SyntheticInput::move_to(target_abs),
        SyntheticInput::wheel_at(axis, target_abs, delta),
        SyntheticInput::move_to(source_abs),
    ]
}

// ── LegacyPost ────────────────────────────────────────────────────────────────

/// A wheel message posted directly to a window, bypassing the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyPost {
    /// Raw window message id (`WM_MOUSEWHEEL` or `WM_MOUSEHWHEEL`).
    pub message: u32,
    /// Delta in the high word, no key-state bits.
    pub wparam: usize,
    /// Target point in screen pixels, `x` low word, `y` high word.
    pub lparam: isize,
}

impl LegacyPost {
    pub fn new(axis: WheelAxis, target: Point, delta: i16) -> Self {
        Self {
            message: axis.message().id(),
            wparam: pack_hi_lo(0, delta) as usize,
            // Screen coordinates are truncated to 16 bits as in GET_X_LPARAM.
            lparam: pack_hi_lo(target.x as i16, target.y as i16) as i32 as isize,
        }
    }
}
