//! Screen geometry and bitfield helpers.
//!
//! Everything here is a pure function over plain integers.  The hook callback
//! calls [`point_in_rect`] on every mouse event, so none of these functions
//! allocate or branch on anything but their arguments.
//!
//! # Coordinate spaces
//!
//! - **Screen pixels** – what `GetWindowRect` and the low-level hook report.
//!   The origin is the top-left corner of the primary monitor.
//! - **Normalized absolute** – what `SendInput` expects when
//!   `MOUSEEVENTF_ABSOLUTE` is set: the primary screen mapped onto `[0, 65536]`
//!   on both axes.  See [`normalize`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Size of the normalized absolute coordinate space used by synthetic input.
pub const ABSOLUTE_COORDINATE_SPAN: i64 = 65_536;

/// A point in screen pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A window rectangle in screen pixel coordinates.
///
/// Mirrors the Win32 `RECT` layout: `right` and `bottom` are the far edges as
/// reported by `GetWindowRect`.  Containment checks treat all four edges as
/// inclusive (see [`point_in_rect`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Returns the top-left corner.
    pub fn top_left(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Returns `((left + right) / 2, (top + bottom) / 2)`.
    ///
    /// Division truncates toward zero, so rects with negative coordinates
    /// round toward the origin.  Sums are taken in 64 bits.
    pub fn center(&self) -> Point {
        Point::new(midpoint(self.left, self.right), midpoint(self.top, self.bottom))
    }

    /// Convenience wrapper around [`point_in_rect`].
    pub fn contains(&self, point: Point) -> bool {
        point_in_rect(self, point)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Left={}, Top={}, Right={}, Bottom={}",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Primary screen dimensions in pixels, as reported by
/// `GetSystemMetrics(SM_CXSCREEN / SM_CYSCREEN)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenSize {
    pub width: i32,
    pub height: i32,
}

impl ScreenSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Converts a screen pixel point into the normalized absolute space.
    pub fn normalize(&self, point: Point) -> Point {
        Point::new(normalize(point.x, self.width), normalize(point.y, self.height))
    }
}

/// Returns `true` when `point` lies inside `rect`, edges included.
///
/// `left <= x <= right && top <= y <= bottom`
#[inline]
pub fn point_in_rect(rect: &Rect, point: Point) -> bool {
    point.x >= rect.left && point.x <= rect.right && point.y >= rect.top && point.y <= rect.bottom
}

#[inline]
fn midpoint(a: i32, b: i32) -> i32 {
    ((i64::from(a) + i64::from(b)) / 2) as i32
}

/// Packs two signed 16-bit words into a 32-bit value: `hi` in bits 16..32,
/// `lo` in bits 0..16.
///
/// This is the layout of `MSLLHOOKSTRUCT::mouseData` (wheel delta in the high
/// word) and of the `WPARAM`/`LPARAM` of `WM_MOUSEWHEEL`.
#[inline]
pub fn pack_hi_lo(lo: i16, hi: i16) -> u32 {
    ((hi as u16 as u32) << 16) | (lo as u16 as u32)
}

/// Splits a 32-bit value into its `(lo, hi)` signed 16-bit words.
#[inline]
pub fn unpack_hi_lo(value: u32) -> (i16, i16) {
    let lo = (value & 0xFFFF) as u16 as i16;
    let hi = (value >> 16) as u16 as i16;
    (lo, hi)
}

/// Maps a pixel coordinate onto the normalized absolute input space:
/// `pixel * 65536 / dimension`.
///
/// The multiplication is carried out in 64 bits so large coordinates cannot
/// overflow.  A non-positive `dimension` yields `0`.
#[inline]
pub fn normalize(pixel: i32, dimension: i32) -> i32 {
    if dimension <= 0 {
        return 0;
    }
    let scaled = i64::from(pixel) * ABSOLUTE_COORDINATE_SPAN / i64::from(dimension);
    scaled.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // ── point_in_rect ─────────────────────────────────────────────────────────

    #[test]
    fn test_point_in_rect_includes_all_four_edges() {
        let rect = Rect::new(10, 20, 110, 220);

        assert!(point_in_rect(&rect, Point::new(10, 20)), "top-left corner");
        assert!(point_in_rect(&rect, Point::new(110, 220)), "bottom-right corner");
        assert!(point_in_rect(&rect, Point::new(10, 220)), "bottom-left corner");
        assert!(point_in_rect(&rect, Point::new(110, 20)), "top-right corner");
    }

    #[test]
    fn test_point_in_rect_rejects_points_one_pixel_outside() {
        let rect = Rect::new(10, 20, 110, 220);

        assert!(!point_in_rect(&rect, Point::new(9, 100)));
        assert!(!point_in_rect(&rect, Point::new(111, 100)));
        assert!(!point_in_rect(&rect, Point::new(50, 19)));
        assert!(!point_in_rect(&rect, Point::new(50, 221)));
    }

    #[test]
    fn test_point_in_rect_handles_negative_coordinates() {
        // Monitors left of the primary have negative X.
        let rect = Rect::new(-1920, 0, -1, 1080);
        assert!(point_in_rect(&rect, Point::new(-1000, 500)));
        assert!(!point_in_rect(&rect, Point::new(0, 500)));
    }

    // ── pack / unpack ─────────────────────────────────────────────────────────

    #[test]
    fn test_unpack_hi_lo_extracts_positive_wheel_delta() {
        // WHEEL_DELTA (120) in the high word, reserved low word.
        let mouse_data = 120u32 << 16;
        assert_eq!(unpack_hi_lo(mouse_data), (0, 120));
    }

    #[test]
    fn test_unpack_hi_lo_extracts_negative_wheel_delta() {
        let mouse_data = 0xFF88_0000u32; // -120 in the high word
        assert_eq!(unpack_hi_lo(mouse_data), (0, -120));
    }

    #[test]
    fn test_pack_hi_lo_round_trips_boundary_values() {
        let samples = [i16::MIN, -120, -1, 0, 1, 120, i16::MAX];
        for &lo in &samples {
            for &hi in &samples {
                assert_eq!(unpack_hi_lo(pack_hi_lo(lo, hi)), (lo, hi), "lo={lo} hi={hi}");
            }
        }
    }

    #[test]
    fn test_pack_hi_lo_places_hi_in_upper_word() {
        assert_eq!(pack_hi_lo(0x0001, 0x0002), 0x0002_0001);
        assert_eq!(pack_hi_lo(-1, 0), 0x0000_FFFF);
    }

    // ── normalize ─────────────────────────────────────────────────────────────

    #[test]
    fn test_normalize_zero_is_zero() {
        assert_eq!(normalize(0, 1920), 0);
        assert_eq!(normalize(0, 1), 0);
    }

    #[test]
    fn test_normalize_full_dimension_is_span() {
        assert_eq!(normalize(1920, 1920), 65_536);
        assert_eq!(normalize(960, 1920), 32_768);
    }

    #[test]
    fn test_normalize_is_monotonic_across_screen_width() {
        let mut previous = normalize(-10, 1920);
        for pixel in -9..=1930 {
            let current = normalize(pixel, 1920);
            assert!(current >= previous, "pixel {pixel}: {current} < {previous}");
            previous = current;
        }
    }

    #[test]
    fn test_normalize_non_positive_dimension_yields_zero() {
        assert_eq!(normalize(500, 0), 0);
        assert_eq!(normalize(500, -1080), 0);
    }

    #[test]
    fn test_normalize_does_not_overflow_large_pixels() {
        assert_eq!(normalize(i32::MAX, 1), i32::MAX);
    }

    // ── Rect helpers ──────────────────────────────────────────────────────────

    #[test]
    fn test_rect_center_of_offset_rect() {
        let rect = Rect::new(200, 200, 250, 250);
        assert_eq!(rect.center(), Point::new(225, 225));
    }

    #[test]
    fn test_rect_center_halves_edge_sum_on_negative_coordinates() {
        // A window on a monitor left of the primary one.
        let rect = Rect::new(-5, -5, 0, 0);
        assert_eq!(rect.center(), Point::new(-2, -2));
    }

    #[test]
    fn test_rect_center_does_not_overflow_extreme_edges() {
        let rect = Rect::new(i32::MAX - 1, i32::MAX - 1, i32::MAX, i32::MAX);
        assert_eq!(rect.center(), Point::new(i32::MAX - 1, i32::MAX - 1));
    }

    #[test]
    fn test_rect_display_matches_log_format() {
        let rect = Rect::new(1, 2, 3, 4);
        assert_eq!(rect.to_string(), "Left=1, Top=2, Right=3, Bottom=4");
    }

    #[test]
    fn test_screen_size_normalizes_both_axes_independently() {
        let screen = ScreenSize::new(1920, 1080);
        assert_eq!(screen.normalize(Point::new(960, 540)), Point::new(32_768, 32_768));
    }
}
