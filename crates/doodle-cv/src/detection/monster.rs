//! Monster resolution by exclusion
//!
//! Monsters have no color of their own. Anything that is neither background paper nor a brown
//! platform is a candidate, and candidates are then discarded when they look like something
//! the other detectors already explain: the player, a platform, a spring or a cached item.
//! This makes the resolver the last stage of a pass; it reads the other detectors' results
//! and never changes them.

use super::config::MonsterConfig;
use crate::bbox::to_rect;
use crate::frame::Frame;
use crate::segment::{self, Region};
use crate::Result;
use doodle_core::{BoundingBox, ColorRange, Point};
use tracing::trace;

/// Everything the resolver must not report as a monster
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Exclusions {
    pub boxes: Vec<BoundingBox>,
    pub player_center: Option<Point>,
}

impl Exclusions {
    pub fn new(player_center: Option<Point>) -> Self {
        Self {
            boxes: Vec::new(),
            player_center,
        }
    }

    pub fn with_boxes<I: IntoIterator<Item = BoundingBox>>(mut self, boxes: I) -> Self {
        self.boxes.extend(boxes);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    Shape,
    PlayerHalo,
    NearKnownEntity,
    Unsaturated,
}

pub struct MonsterResolver<'a> {
    config: &'a MonsterConfig,
    brown: &'a ColorRange,
}

impl<'a> MonsterResolver<'a> {
    /// `brown` is removed from the candidate mask so brown platforms never become monsters
    pub fn new(config: &'a MonsterConfig, brown: &'a ColorRange) -> Self {
        Self { config, brown }
    }

    /// Monster boxes of the frame, given what the other detectors found
    pub fn resolve(&self, frame: &Frame, exclusions: &Exclusions) -> Result<Vec<BoundingBox>> {
        let hsv = frame.hsv();
        let not_paper = segment::invert(&segment::in_range(hsv, &self.config.paper_range)?)?;
        let candidates = segment::subtract(&not_paper, &segment::in_range(hsv, self.brown)?)?;
        let mask = segment::morph_all(candidates, &self.config.cleanup.steps, self.config.cleanup.kernel)?;

        let mut monsters = Vec::new();
        for region in segment::regions(&mask)? {
            match self.check(frame, &region, exclusions)? {
                None => monsters.push(region.bbox),
                Some(reason) => trace!(bbox = ?region.bbox, ?reason, "monster candidate rejected"),
            }
        }

        Ok(monsters)
    }

    fn check(&self, frame: &Frame, region: &Region, exclusions: &Exclusions) -> Result<Option<Rejection>> {
        let bbox = &region.bbox;

        if !self.config.shape.accepts_with_area(bbox, region.contour_area) {
            return Ok(Some(Rejection::Shape));
        }

        if let Some(center) = exclusions.player_center {
            if bbox.inflate(self.config.player_halo).contains(center) {
                return Ok(Some(Rejection::PlayerHalo));
            }
        }

        let distance = self.config.exclusion_distance;
        if exclusions
            .boxes
            .iter()
            .any(|known| (bbox.x - known.x).abs() < distance && (bbox.y - known.y).abs() < distance)
        {
            return Ok(Some(Rejection::NearKnownEntity));
        }

        let saturation = segment::channel_mean(frame.hsv(), to_rect(bbox), 1)?;
        if saturation < self.config.min_mean_saturation {
            return Ok(Some(Rejection::Unsaturated));
        }

        Ok(None)
    }
}
