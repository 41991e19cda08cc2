//! Classified detections and the per-frame detection set

use crate::geometry::{BoundingBox, Point};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Every game-object class the pipeline can report
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    StaticPlatform,
    MovingPlatform,
    BreakablePlatform,
    BrownPlatform,
    Spring,
    Propeller,
    Rocket,
    BlackHole,
    Monster,
}

impl EntityKind {
    /// Short label used on overlays and in logs
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Player => "Player",
            EntityKind::StaticPlatform => "Platform",
            EntityKind::MovingPlatform => "Moving",
            EntityKind::BreakablePlatform => "Blank",
            EntityKind::BrownPlatform => "Brown",
            EntityKind::Spring => "Spring",
            EntityKind::Propeller => "Propeller",
            EntityKind::Rocket => "Rocket",
            EntityKind::BlackHole => "Black Hole",
            EntityKind::Monster => "MONSTER",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One classified box, with the simplified outline for black holes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub kind: EntityKind,
    pub bbox: BoundingBox,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline: Option<Vec<Point>>,
}

impl Detection {
    pub fn new(kind: EntityKind, bbox: BoundingBox) -> Self {
        Self {
            kind,
            bbox,
            outline: None,
        }
    }

    pub fn with_outline(mut self, outline: Vec<Point>) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn center(&self) -> Point {
        self.bbox.center()
    }
}

/// All detections produced for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionSet {
    detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, detection: Detection) {
        self.detections.push(detection);
    }

    pub fn extend<I: IntoIterator<Item = Detection>>(&mut self, detections: I) {
        self.detections.extend(detections);
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    /// Detections of one kind, in insertion order
    pub fn of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Detection> + '_ {
        self.detections.iter().filter(move |d| d.kind == kind)
    }

    /// Boxes of one kind, in insertion order
    pub fn boxes_of(&self, kind: EntityKind) -> Vec<BoundingBox> {
        self.of_kind(kind).map(|d| d.bbox).collect()
    }

    pub fn count(&self, kind: EntityKind) -> usize {
        self.of_kind(kind).count()
    }

    /// The first detection of a kind, used for single-instance classes
    pub fn first(&self, kind: EntityKind) -> Option<&Detection> {
        self.of_kind(kind).next()
    }

    pub fn player(&self) -> Option<&Detection> {
        self.first(EntityKind::Player)
    }

    /// Number of detections per kind, zero counts omitted
    pub fn counts(&self) -> BTreeMap<EntityKind, usize> {
        let mut counts = BTreeMap::new();
        for detection in &self.detections {
            *counts.entry(detection.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl IntoIterator for DetectionSet {
    type Item = Detection;
    type IntoIter = std::vec::IntoIter<Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.into_iter()
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

impl FromIterator<Detection> for DetectionSet {
    fn from_iter<T: IntoIterator<Item = Detection>>(iter: T) -> Self {
        Self {
            detections: iter.into_iter().collect(),
        }
    }
}

/// One-step finite-difference player velocity in pixels per frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VelocityEstimate {
    pub dx: i32,
    pub dy: i32,
}

impl VelocityEstimate {
    /// `current - previous` when both centers are known, `(0, 0)` otherwise
    pub fn between(previous: Option<Point>, current: Option<Point>) -> Self {
        match (previous, current) {
            (Some(previous), Some(current)) => {
                let delta = current - previous;
                Self {
                    dx: delta.x,
                    dy: delta.y,
                }
            }
            _ => Self::default(),
        }
    }
}
