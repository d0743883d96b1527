//! Translation of a scroll position from the source window into the target window.
//!
//! The remap keeps the pointer's offset from the window's top-left corner:
//!
//! ```text
//! relative = point - source.top_left
//! target   = target_rect.top_left + relative
//! ```
//!
//! When the windows differ in size the translated point can fall outside the
//! target rectangle.  In that case the target's center is used instead, so the
//! synthetic wheel event still lands somewhere inside the target window.

use tracing::trace;

use super::geometry::{point_in_rect, Point, Rect};

/// Result of [`remap_point`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remap {
    /// Where the synthetic scroll should be delivered, in screen pixels.
    pub point: Point,
    /// `true` when the translated point fell outside the target and the
    /// target's center was used.
    pub fell_back_to_center: bool,
}

/// Maps `point` (inside `source`) to the equivalent position inside `target`.
pub fn remap_point(source: &Rect, target: &Rect, point: Point) -> Remap {
    let relative_x = point.x - source.left;
    let relative_y = point.y - source.top;

    let translated = Point::new(target.left + relative_x, target.top + relative_y);

    if point_in_rect(target, translated) {
        Remap {
            point: translated,
            fell_back_to_center: false,
        }
    } else {
        trace!(%translated, target = %target, "remapped point outside target, using center");
        Remap {
            point: target.center(),
            fell_back_to_center: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remap_preserves_offset_when_target_is_large_enough() {
        // Arrange
        let source = Rect::new(0, 0, 100, 100);
        let target = Rect::new(200, 200, 400, 400);

        // Act
        let remap = remap_point(&source, &target, Point::new(20, 30));

        // Assert
        assert_eq!(remap.point, Point::new(220, 230));
        assert!(!remap.fell_back_to_center);
    }

    #[test]
    fn test_remap_falls_back_to_center_when_target_is_smaller() {
        // Arrange
        let source = Rect::new(0, 0, 100, 100);
        let target = Rect::new(200, 200, 250, 250);

        // Act – (90, 90) translates to (290, 290), outside the target
        let remap = remap_point(&source, &target, Point::new(90, 90));

        // Assert
        assert_eq!(remap.point, Point::new(225, 225));
        assert!(remap.fell_back_to_center);
    }

    #[test]
    fn test_remap_target_edge_is_still_inside() {
        let source = Rect::new(0, 0, 100, 100);
        let target = Rect::new(500, 0, 600, 100);

        let remap = remap_point(&source, &target, Point::new(100, 100));

        assert_eq!(remap.point, Point::new(600, 100));
        assert!(!remap.fell_back_to_center);
    }

    #[test]
    fn test_remap_handles_target_left_of_source() {
        let source = Rect::new(1000, 100, 1800, 900);
        let target = Rect::new(-800, 100, 0, 900);

        let remap = remap_point(&source, &target, Point::new(1400, 500));

        assert_eq!(remap.point, Point::new(-400, 500));
    }
}
