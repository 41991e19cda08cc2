//! Scored boxes and greedy non-maximum suppression
//!
//! Template matching reports one candidate per pixel location above the threshold, so a single
//! spring produces a cluster of overlapping boxes. [`ScoredBoxCollection::suppress`] reduces each
//! cluster to its best-scoring box.

use doodle_core::{BoundingBox, ScoredBox};
use opencv::core::Rect;

/// Convert a box into an OpenCV rectangle
pub fn to_rect(bbox: &BoundingBox) -> Rect {
    Rect::new(bbox.x, bbox.y, bbox.width, bbox.height)
}

/// Convert an OpenCV rectangle into a box, `None` for empty rectangles
pub fn from_rect(rect: Rect) -> Option<BoundingBox> {
    BoundingBox::new(rect.x, rect.y, rect.width, rect.height)
}

/// Collection of scored candidates produced inside one region of interest
#[derive(Debug, Clone, Default)]
pub struct ScoredBoxCollection {
    boxes: Vec<ScoredBox>,
}

impl ScoredBoxCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_vec(boxes: Vec<ScoredBox>) -> Self {
        Self { boxes }
    }

    pub fn push(&mut self, scored: ScoredBox) {
        self.boxes.push(scored);
    }

    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    pub fn as_slice(&self) -> &[ScoredBox] {
        &self.boxes
    }

    /// Sort by score, highest first. Equal scores keep their scan order.
    pub fn sort_by_score(&mut self) {
        self.boxes.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    /// Greedy NMS: repeatedly keep the best remaining box and drop every remaining candidate
    /// whose IoU with it is at least `iou_threshold`.
    pub fn suppress(mut self, iou_threshold: f64) -> Self {
        self.sort_by_score();

        let mut keep: Vec<ScoredBox> = Vec::new();
        let mut suppressed = vec![false; self.boxes.len()];

        for i in 0..self.boxes.len() {
            if suppressed[i] {
                continue;
            }

            let best = self.boxes[i];
            keep.push(best);

            for j in (i + 1)..self.boxes.len() {
                if !suppressed[j] && best.bbox.iou(&self.boxes[j].bbox) >= iou_threshold {
                    suppressed[j] = true;
                }
            }
        }

        Self::from_vec(keep)
    }

    pub fn boxes(&self) -> impl Iterator<Item = BoundingBox> + '_ {
        self.boxes.iter().map(|s| s.bbox)
    }
}

impl IntoIterator for ScoredBoxCollection {
    type Item = ScoredBox;
    type IntoIter = std::vec::IntoIter<ScoredBox>;

    fn into_iter(self) -> Self::IntoIter {
        self.boxes.into_iter()
    }
}

impl FromIterator<ScoredBox> for ScoredBoxCollection {
    fn from_iter<T: IntoIterator<Item = ScoredBox>>(iter: T) -> Self {
        Self::from_vec(iter.into_iter().collect())
    }
}
