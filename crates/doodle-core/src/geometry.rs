//! Boxes and points in full-frame pixel space
//!
//! Every detector reports its results with these types. Coordinates are always relative to the
//! top-left corner of the captured frame, never to a region of interest.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// Guard added to the IoU denominator so degenerate boxes never divide by zero.
pub const IOU_EPSILON: f64 = 1e-5;

/// Integer pixel position
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

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned bounding box `(x, y, width, height)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl BoundingBox {
    /// Create a box, rejecting empty extents
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self {
            x,
            y,
            width,
            height,
        })
    }

    /// Create a box without checking its extent.
    ///
    /// Used for boxes derived from a valid one by margin arithmetic, and for tests that need a
    /// degenerate box on purpose.
    pub const fn from_parts(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    pub fn top_left(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Area of the box, zero for degenerate extents
    pub fn area(&self) -> i64 {
        (self.width.max(0) as i64) * (self.height.max(0) as i64)
    }

    /// `width / height`, infinite for a zero-height box
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// Center point using integer division, matching how positions are reported downstream
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }

    /// Shift the box by an offset, e.g. from ROI-local into frame coordinates
    pub fn translate(&self, offset: Point) -> Self {
        Self::from_parts(self.x + offset.x, self.y + offset.y, self.width, self.height)
    }

    /// Apply a fixed margin adjustment to the box
    pub fn adjust(&self, adjust: &BoxAdjust) -> Self {
        Self::from_parts(
            self.x + adjust.dx,
            self.y + adjust.dy,
            self.width + adjust.dw,
            self.height + adjust.dh,
        )
    }

    /// Grow the box by `margin` pixels on every side
    pub fn inflate(&self, margin: i32) -> Self {
        Self::from_parts(
            self.x - margin,
            self.y - margin,
            self.width + 2 * margin,
            self.height + 2 * margin,
        )
    }

    /// Inclusive containment test on both edges
    pub fn contains(&self, point: Point) -> bool {
        (self.x..=self.right()).contains(&point.x) && (self.y..=self.bottom()).contains(&point.y)
    }

    /// Overlapping area with another box, zero when disjoint
    pub fn intersection_area(&self, other: &BoundingBox) -> i64 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.right().min(other.right());
        let y2 = self.bottom().min(other.bottom());

        ((x2 - x1).max(0) as i64) * ((y2 - y1).max(0) as i64)
    }

    /// Intersection over union with an epsilon-guarded denominator
    pub fn iou(&self, other: &BoundingBox) -> f64 {
        let intersection = self.intersection_area(other) as f64;
        let union = self.area() as f64 + other.area() as f64 - intersection;

        intersection / (union + IOU_EPSILON)
    }

    /// Clip the box to a `width` × `height` frame, `None` if nothing is left
    pub fn clip(&self, width: i32, height: i32) -> Option<Self> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.right().min(width);
        let y2 = self.bottom().min(height);

        Self::new(x1, y1, x2 - x1, y2 - y1)
    }
}

/// Fixed `(dx, dy, dw, dh)` adjustment applied to a detected box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BoxAdjust {
    pub dx: i32,
    pub dy: i32,
    pub dw: i32,
    pub dh: i32,
}

impl BoxAdjust {
    pub const fn new(dx: i32, dy: i32, dw: i32, dh: i32) -> Self {
        Self { dx, dy, dw, dh }
    }
}

/// Margins used to grow a box into a region of interest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiMargins {
    pub top: i32,
    pub bottom: i32,
    pub side: i32,
}

impl RoiMargins {
    /// Expand `bbox` by the margins and clip the result to the frame
    pub fn region_around(&self, bbox: &BoundingBox, width: i32, height: i32) -> Option<BoundingBox> {
        BoundingBox::from_parts(
            bbox.x - self.side,
            bbox.y - self.top,
            bbox.width + 2 * self.side,
            bbox.height + self.top + self.bottom,
        )
        .clip(width, height)
    }
}

/// A box with a match confidence in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoredBox {
    pub bbox: BoundingBox,
    pub score: f64,
}

impl ScoredBox {
    pub fn new(bbox: BoundingBox, score: f64) -> Self {
        Self { bbox, score }
    }
}
