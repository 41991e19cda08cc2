//! Area, height and aspect-ratio gates for candidate regions

use crate::geometry::BoundingBox;
use serde::{Deserialize, Serialize};

/// Per-class shape bounds. Unset bounds are unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeFilter {
    pub min_area: f64,
    pub max_area: Option<f64>,
    pub max_height: Option<i32>,
    pub min_aspect: Option<f64>,
    pub max_aspect: Option<f64>,
}

impl ShapeFilter {
    /// Wide, flat platform silhouette
    pub const fn platform(min_area: f64, max_height: i32, min_aspect: f64) -> Self {
        Self {
            min_area,
            max_area: None,
            max_height: Some(max_height),
            min_aspect: Some(min_aspect),
            max_aspect: None,
        }
    }

    /// Only a minimum area
    pub const fn min_area(min_area: f64) -> Self {
        Self {
            min_area,
            max_area: None,
            max_height: None,
            min_aspect: None,
            max_aspect: None,
        }
    }

    /// Accept a box using its own `width × height` as the area
    pub fn accepts(&self, bbox: &BoundingBox) -> bool {
        self.accepts_with_area(bbox, bbox.area() as f64)
    }

    /// Accept a box whose area is measured separately (e.g. contour area)
    pub fn accepts_with_area(&self, bbox: &BoundingBox, area: f64) -> bool {
        if area < self.min_area {
            return false;
        }
        if self.max_area.is_some_and(|max| area > max) {
            return false;
        }
        if self.max_height.is_some_and(|max| bbox.height > max) {
            return false;
        }

        let aspect = bbox.aspect_ratio();
        if self.min_aspect.is_some_and(|min| aspect < min) {
            return false;
        }
        if self.max_aspect.is_some_and(|max| aspect > max) {
            return false;
        }

        true
    }

    /// Bounds must be ordered and non-negative
    pub fn is_valid(&self) -> bool {
        let area_ok = self.min_area >= 0.0 && self.max_area.is_none_or(|max| max >= self.min_area);
        let aspect_ok = match (self.min_aspect, self.max_aspect) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        };
        area_ok && aspect_ok && self.max_height.is_none_or(|h| h > 0)
    }
}
