//! # syncscroll-core
//!
//! Shared library for SyncScroll containing the pure geometry helpers, window
//! identity types, the re-entrancy guard, and the synthetic input records used
//! by the scroll synchronization pipeline.
//!
//! This crate has zero dependencies on OS APIs, so everything in it builds and
//! tests on any platform.  The Win32 adapters live in the `syncscroll` crate.
//!
//! # Architecture overview (for beginners)
//!
//! SyncScroll watches every mouse-wheel event on the desktop.  When the wheel
//! turns over the *source* window, the event is copied, the pointer position
//! is translated into the *target* window's rectangle, and a small batch of
//! synthetic input is injected so the target scrolls too.
//!
//! This crate defines the pieces of that pipeline that are pure data or pure
//! arithmetic:
//!
//! - **`domain`** – Rectangles, points, hi/lo word packing, the remap
//!   algorithm, window references, and the time-boxed [`ScrollGuard`].
//!
//! - **`input`** – The low-level mouse record as observed by the hook, the
//!   decoded message kind, and the synthetic input batch handed to the OS.

pub mod domain;
pub mod input;

pub use domain::geometry::{
    normalize, pack_hi_lo, point_in_rect, unpack_hi_lo, Point, Rect, ScreenSize,
};
pub use domain::guard::ScrollGuard;
pub use domain::remap::{remap_point, Remap};
pub use domain::window::{
    has_visible_title, reconcile_selection, sort_for_display, ProcessId, WindowHandle, WindowRef,
    UNKNOWN_PROCESS_NAME,
};
pub use input::batch::{build_scroll_batch, LegacyPost, MouseFlags, SyntheticInput};
pub use input::messages::{
    MouseMessage, MouseRecord, NotAWheelMessage, RawScrollEvent, WheelAxis, EXTRA_INFO_SENTINEL,
};
