//! Planar coordinates and bounding boxes.
//!
//! Vertex coordinates are only used for spatial partitioning, so a plain
//! Cartesian `(x, y)` pair in `f64` is enough; no geodesic math is needed.

/// A 2-D point in the graph's coordinate space.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.x, self.y)
    }
}

/// Axis-aligned rectangle given by its bottom-left and top-right corners.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub bottom_left: Point,
    pub top_right:   Point,
}

impl BoundingBox {
    pub fn new(bottom_left: Point, top_right: Point) -> Self {
        Self { bottom_left, top_right }
    }

    /// Width along the X axis.
    #[inline]
    pub fn width(&self) -> f64 {
        self.top_right.x - self.bottom_left.x
    }

    /// Height along the Y axis.
    #[inline]
    pub fn height(&self) -> f64 {
        self.top_right.y - self.bottom_left.y
    }

    /// Closed containment test on both axes.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.bottom_left.x
            && p.x <= self.top_right.x
            && p.y >= self.bottom_left.y
            && p.y <= self.top_right.y
    }
}

impl std::fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{} .. {}]", self.bottom_left, self.top_right)
    }
}
