//! Cross-frame state of the frame scheduler
//!
//! The scheduler keeps exactly three things between frames: a frame counter, the cached results
//! of the low-priority detectors, and the previous player center. They live in
//! [`SchedulerState`], which the caller's frame loop owns and hands back on every pass.

use crate::entity::{Detection, EntityKind, VelocityEstimate};
use crate::geometry::{BoundingBox, Point};
use serde::{Deserialize, Serialize};

/// Latest results of the detectors that only run every N-th frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LowPriorityCache {
    pub black_holes: Vec<Detection>,
    pub rocket: Option<Detection>,
    pub propeller: Option<Detection>,
}

impl LowPriorityCache {
    /// Boxes the monster resolver must treat as known entities
    pub fn item_boxes(&self) -> impl Iterator<Item = BoundingBox> + '_ {
        self.propeller.iter().chain(self.rocket.iter()).map(|d| d.bbox)
    }

    /// Cached detections in display order
    pub fn detections(&self) -> impl Iterator<Item = &Detection> + '_ {
        self.rocket
            .iter()
            .chain(self.propeller.iter())
            .chain(self.black_holes.iter())
    }
}

/// Frame counter, low-priority cache and previous player center
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchedulerState {
    frame_count: u64,
    cache: LowPriorityCache,
    previous_center: Option<Point>,
}

/// What the scheduler decided for the frame about to be processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePlan {
    /// 1-based number of the frame
    pub frame_number: u64,
    /// Whether the low-priority detectors run on this frame
    pub refresh_low_priority: bool,
}

impl SchedulerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames processed so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn cache(&self) -> &LowPriorityCache {
        &self.cache
    }

    pub fn previous_center(&self) -> Option<Point> {
        self.previous_center
    }

    /// Plan the next frame: low-priority detectors run when the new frame number is a multiple
    /// of `cadence`. A cadence of 0 or 1 refreshes every frame.
    pub fn plan(&self, cadence: u32) -> FramePlan {
        let frame_number = self.frame_count + 1;
        let refresh_low_priority = cadence <= 1 || frame_number % cadence as u64 == 0;
        FramePlan {
            frame_number,
            refresh_low_priority,
        }
    }

    /// Finish a frame: advance the counter, replace the cache when it was refreshed, compute the
    /// player velocity and remember the current center (even when it is `None`).
    pub fn advance(
        self,
        plan: FramePlan,
        refreshed: Option<LowPriorityCache>,
        player_center: Option<Point>,
    ) -> (SchedulerState, VelocityEstimate) {
        let velocity = VelocityEstimate::between(self.previous_center, player_center);
        let state = SchedulerState {
            frame_count: plan.frame_number,
            cache: refreshed.unwrap_or(self.cache),
            previous_center: player_center,
        };
        (state, velocity)
    }
}

/// Collect single-instance detections of a kind from a cache refresh
pub fn single(kind: EntityKind, bbox: Option<BoundingBox>) -> Option<Detection> {
    bbox.map(|bbox| Detection::new(kind, bbox))
}
