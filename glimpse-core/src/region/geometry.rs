//! Drag geometry
//!
//! Pure functions from a drag (anchor point + current pointer) to the
//! normalized crop rectangle and the dimming mask drawn around it.

use serde::{Deserialize, Serialize};

use crate::types::{PointerPoint, Viewport};

/// Which corner of the selection the drag started from
///
/// Derived on every move, never stored. Comparisons are inclusive, so a
/// pointer sitting exactly on the anchor's row or column resolves to the
/// top/left side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    /// Anchor is the top-left corner (dragging down and right)
    TopLeft,
    /// Anchor is the top-right corner (dragging down and left)
    TopRight,
    /// Anchor is the bottom-left corner (dragging up and right)
    BottomLeft,
    /// Anchor is the bottom-right corner (dragging up and left)
    BottomRight,
}

impl Quadrant {
    /// Classify `current` relative to the drag anchor `start`
    pub fn classify(start: PointerPoint, current: PointerPoint) -> Self {
        let anchor_top = current.y >= start.y;
        let anchor_left = current.x >= start.x;

        match (anchor_top, anchor_left) {
            (true, true) => Self::TopLeft,
            (true, false) => Self::TopRight,
            (false, true) => Self::BottomLeft,
            (false, false) => Self::BottomRight,
        }
    }
}

/// Normalized selection rectangle in viewport coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CropRectangle {
    pub top: i32,
    pub left: i32,
    pub width: u32,
    pub height: u32,
}

impl CropRectangle {
    /// Zero-area rectangle anchored at `point`
    pub fn at(point: PointerPoint) -> Self {
        Self {
            top: point.y,
            left: point.x,
            width: 0,
            height: 0,
        }
    }

    /// Rectangle spanned by a drag from `start` to `current`
    pub fn from_drag(start: PointerPoint, current: PointerPoint) -> Self {
        let width = current.x.abs_diff(start.x);
        let height = current.y.abs_diff(start.y);

        let (top, left) = match Quadrant::classify(start, current) {
            Quadrant::TopLeft => (start.y, start.x),
            Quadrant::TopRight => (start.y, current.x),
            Quadrant::BottomLeft => (current.y, start.x),
            Quadrant::BottomRight => (current.y, current.x),
        };

        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// Exclusive right edge
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl std::fmt::Display for CropRectangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} at ({}, {})",
            self.width, self.height, self.left, self.top
        )
    }
}

/// Thickness of the dimmed border around the selection
///
/// Visual feedback only. The crop rectangle is always computed from the
/// drag itself, never from a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct DimMask {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl DimMask {
    /// Mask that dims the whole viewport (nothing selected yet)
    pub fn covering(viewport: Viewport) -> Self {
        Self {
            top: viewport.height,
            right: viewport.width,
            bottom: viewport.height,
            left: viewport.width,
        }
    }

    /// Mask that dims everything in `viewport` outside `crop`
    pub fn around(crop: &CropRectangle, viewport: Viewport) -> Self {
        let clamp = |v: i64| v.clamp(0, u32::MAX as i64) as u32;

        Self {
            top: clamp(crop.top as i64),
            right: clamp(viewport.width as i64 - crop.right()),
            bottom: clamp(viewport.height as i64 - crop.bottom()),
            left: clamp(crop.left as i64),
        }
    }

    /// CSS `border-width` shorthand (top right bottom left)
    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> PointerPoint {
        PointerPoint::new(x, y)
    }

    #[test]
    fn test_quadrant_classification() {
        let start = p(100, 100);
        assert_eq!(Quadrant::classify(start, p(150, 150)), Quadrant::TopLeft);
        assert_eq!(Quadrant::classify(start, p(50, 150)), Quadrant::TopRight);
        assert_eq!(Quadrant::classify(start, p(150, 50)), Quadrant::BottomLeft);
        assert_eq!(Quadrant::classify(start, p(50, 50)), Quadrant::BottomRight);
    }

    #[test]
    fn test_quadrant_ties_resolve_top_left() {
        let start = p(100, 100);
        assert_eq!(Quadrant::classify(start, start), Quadrant::TopLeft);
        assert_eq!(Quadrant::classify(start, p(100, 40)), Quadrant::BottomLeft);
        assert_eq!(Quadrant::classify(start, p(40, 100)), Quadrant::TopRight);
    }

    #[test]
    fn test_crop_matches_min_and_abs_diff_in_every_quadrant() {
        let start = p(200, 200);
        for dx in [-150, -1, 0, 1, 150] {
            for dy in [-90, -1, 0, 1, 90] {
                let current = p(start.x + dx, start.y + dy);
                let crop = CropRectangle::from_drag(start, current);
                assert_eq!(crop.top, start.y.min(current.y));
                assert_eq!(crop.left, start.x.min(current.x));
                assert_eq!(crop.width, dx.unsigned_abs());
                assert_eq!(crop.height, dy.unsigned_abs());
            }
        }
    }

    #[test]
    fn test_crop_is_direction_invariant() {
        let forward = CropRectangle::from_drag(p(100, 100), p(300, 250));
        let backward = CropRectangle::from_drag(p(300, 250), p(100, 100));
        let expected = CropRectangle {
            top: 100,
            left: 100,
            width: 200,
            height: 150,
        };
        assert_eq!(forward, expected);
        assert_eq!(backward, expected);
    }

    #[test]
    fn test_mask_around_selection() {
        let viewport = Viewport::new(800, 600);
        let crop = CropRectangle::from_drag(p(100, 100), p(300, 250));
        let mask = DimMask::around(&crop, viewport);
        assert_eq!(
            mask,
            DimMask {
                top: 100,
                right: 500,
                bottom: 350,
                left: 100
            }
        );
        assert_eq!(mask.to_css(), "100px 500px 350px 100px");
    }

    #[test]
    fn test_mask_clamps_outside_viewport() {
        let viewport = Viewport::new(100, 100);
        let crop = CropRectangle::from_drag(p(-20, -20), p(150, 150));
        let mask = DimMask::around(&crop, viewport);
        assert_eq!(mask, DimMask::default());
    }

    #[test]
    fn test_mask_covering_viewport() {
        let mask = DimMask::covering(Viewport::new(1280, 720));
        assert_eq!(mask.top, 720);
        assert_eq!(mask.left, 1280);
    }
}
