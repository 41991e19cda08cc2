//! HSV color ranges used by the segmenter

use serde::{Deserialize, Serialize};

/// Inclusive `[h, s, v]` bounds on the OpenCV HSV scale (hue 0..=180, saturation/value 0..=255)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRange {
    pub lower: [u8; 3],
    pub upper: [u8; 3],
}

impl ColorRange {
    pub const fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self { lower, upper }
    }

    /// A range is usable when every lower bound is at most its upper bound
    pub fn is_valid(&self) -> bool {
        (0..3).all(|c| self.lower[c] <= self.upper[c])
    }
}
