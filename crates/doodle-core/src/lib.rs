//! Doodle Vision core types
//!
//! Pure data model shared by the perception pipeline: boxes, color ranges, shape gates,
//! classified detections and the scheduler's cross-frame state. Nothing here touches pixels.

pub mod color;
pub mod entity;
pub mod geometry;
pub mod schedule;
pub mod shape;

pub use color::ColorRange;
pub use entity::{Detection, DetectionSet, EntityKind, VelocityEstimate};
pub use geometry::{BoundingBox, BoxAdjust, Point, RoiMargins, ScoredBox};
pub use schedule::{FramePlan, LowPriorityCache, SchedulerState};
pub use shape::ShapeFilter;
