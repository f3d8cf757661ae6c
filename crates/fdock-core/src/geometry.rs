//! Geometric primitives.

use serde::{Deserialize, Serialize};

/// A pixel rectangle for station bounds, leaf bounds, and hit testing.
///
/// Uses screen coordinates (origin at top-left). Coordinates are signed so
/// that externalized windows may sit left of or above the primary screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge (inclusive).
    pub x: i32,
    /// Top edge (inclusive).
    pub y: i32,
    /// Width in pixels.
    pub width: i32,
    /// Height in pixels.
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from origin with given size.
    #[inline]
    pub const fn from_size(width: i32, height: i32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i32 {
        self.x.saturating_add(self.width)
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i32 {
        self.y.saturating_add(self.height)
    }

    /// Check if the rectangle has zero (or negative) area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Create a new rectangle inside the current one with the given insets.
    ///
    /// Width and height never go below zero.
    pub fn inner(&self, insets: Insets) -> Rect {
        Rect {
            x: self.x.saturating_add(insets.left),
            y: self.y.saturating_add(insets.top),
            width: self.width.saturating_sub(insets.horizontal_sum()).max(0),
            height: self.height.saturating_sub(insets.vertical_sum()).max(0),
        }
    }

    /// Map a fractional rectangle into this one.
    ///
    /// Edges are rounded independently so that two fractional rectangles that
    /// share an edge map to pixel rectangles that share the same edge.
    pub fn project(&self, rel: RelRect) -> Rect {
        let width = f64::from(self.width);
        let height = f64::from(self.height);
        let left = round_px(f64::from(self.x) + rel.x * width);
        let top = round_px(f64::from(self.y) + rel.y * height);
        let right = round_px(f64::from(self.x) + (rel.x + rel.width) * width);
        let bottom = round_px(f64::from(self.y) + (rel.y + rel.height) * height);
        Rect::new(left, top, (right - left).max(0), (bottom - top).max(0))
    }
}

fn round_px(value: f64) -> i32 {
    // Saturating float-to-int cast.
    value.round() as i32
}

/// Insets (border widths) around a station's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Insets {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Insets {
    /// Create new insets with equal values.
    pub const fn all(val: i32) -> Self {
        Self {
            top: val,
            right: val,
            bottom: val,
            left: val,
        }
    }

    /// Create new insets with specific values.
    pub const fn new(top: i32, right: i32, bottom: i32, left: i32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Sum of left and right.
    #[inline]
    pub const fn horizontal_sum(&self) -> i32 {
        self.left.saturating_add(self.right)
    }

    /// Sum of top and bottom.
    #[inline]
    pub const fn vertical_sum(&self) -> i32 {
        self.top.saturating_add(self.bottom)
    }

    /// The same insets with every negative side raised to zero.
    #[must_use]
    pub const fn non_negative(self) -> Insets {
        const fn clamp(value: i32) -> i32 {
            if value < 0 { 0 } else { value }
        }
        Insets {
            top: clamp(self.top),
            right: clamp(self.right),
            bottom: clamp(self.bottom),
            left: clamp(self.left),
        }
    }

    /// Component-wise sum, used to stack a border on top of fixed insets.
    pub const fn add(self, other: Insets) -> Insets {
        Insets {
            top: self.top.saturating_add(other.top),
            right: self.right.saturating_add(other.right),
            bottom: self.bottom.saturating_add(other.bottom),
            left: self.left.saturating_add(other.left),
        }
    }
}

impl From<i32> for Insets {
    fn from(val: i32) -> Self {
        Self::all(val)
    }
}

/// A rectangle expressed in fractions of a reference extent.
///
/// `RelRect::FULL` is the whole reference area. Fractional rectangles are
/// authoritative; pixel rectangles are always derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RelRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl RelRect {
    /// The whole reference area.
    pub const FULL: RelRect = RelRect {
        x: 0.0,
        y: 0.0,
        width: 1.0,
        height: 1.0,
    };

    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Split left/right at `bias` (fraction of this rectangle's width).
    ///
    /// The second half is computed as the remainder so both halves tile the
    /// original without a gap.
    pub fn split_horizontal(&self, bias: f64) -> (RelRect, RelRect) {
        let first = self.width * bias;
        (
            RelRect::new(self.x, self.y, first, self.height),
            RelRect::new(self.x + first, self.y, self.width - first, self.height),
        )
    }

    /// Split top/bottom at `bias` (fraction of this rectangle's height).
    pub fn split_vertical(&self, bias: f64) -> (RelRect, RelRect) {
        let first = self.height * bias;
        (
            RelRect::new(self.x, self.y, self.width, first),
            RelRect::new(self.x, self.y + first, self.width, self.height - first),
        )
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }
}

#[cfg(test)]
mod tests {
    use super::{Insets, Rect, RelRect};

    #[test]
    fn rect_contains_edges() {
        let rect = Rect::new(2, 3, 4, 5);
        assert!(rect.contains(2, 3));
        assert!(rect.contains(5, 7));
        assert!(!rect.contains(6, 3));
        assert!(!rect.contains(2, 8));
    }

    #[test]
    fn rect_inner_reduces() {
        let rect = Rect::new(0, 0, 10, 10);
        let inner = rect.inner(Insets::new(1, 2, 3, 4));
        assert_eq!(inner, Rect::new(4, 1, 4, 6));
    }

    #[test]
    fn rect_inner_never_negative() {
        let rect = Rect::new(0, 0, 3, 3);
        let inner = rect.inner(Insets::all(2));
        assert_eq!(inner.width, 0);
        assert_eq!(inner.height, 0);
        assert!(inner.is_empty());
    }

    #[test]
    fn rect_inner_saturates_on_extreme_insets() {
        let rect = Rect::new(0, 0, 100, 100);
        let inner = rect.inner(Insets::new(0, -1, i32::MIN, i32::MIN));
        assert_eq!(inner.x, i32::MIN);
        assert_eq!(inner.width, i32::MAX);
        assert_eq!(inner.height, i32::MAX);

        let clamped = Insets::new(3, -1, i32::MIN, 2).non_negative();
        assert_eq!(clamped, Insets::new(3, 0, 0, 2));
        assert_eq!(rect.inner(clamped), Rect::new(2, 3, 98, 97));
    }

    #[test]
    fn projected_halves_share_edge() {
        let area = Rect::new(0, 0, 201, 100);
        let (left, right) = RelRect::FULL.split_horizontal(0.5);
        let a = area.project(left);
        let b = area.project(right);
        assert_eq!(a.right(), b.x);
        assert_eq!(a.width + b.width, 201);
    }

    #[test]
    fn relative_split_tiles_parent() {
        let parent = RelRect::new(0.1, 0.2, 0.7, 0.5);
        let (top, bottom) = parent.split_vertical(0.3);
        assert_eq!(top.y, parent.y);
        assert!((top.bottom() - bottom.y).abs() < 1e-12);
        assert!((bottom.bottom() - parent.bottom()).abs() < 1e-12);
    }

    #[test]
    fn insets_sums_and_add() {
        let insets = Insets::new(1, 2, 3, 4);
        assert_eq!(insets.horizontal_sum(), 6);
        assert_eq!(insets.vertical_sum(), 4);
        assert_eq!(insets.add(Insets::all(1)), Insets::new(2, 3, 4, 5));
        assert_eq!(Insets::from(3), Insets::all(3));
    }

    #[test]
    fn insets_deserialize_from_config_json() {
        let insets: Insets =
            serde_json::from_str(r#"{"top":1,"right":2,"bottom":3,"left":4}"#).unwrap();
        assert_eq!(insets, Insets::new(1, 2, 3, 4));
    }
}
