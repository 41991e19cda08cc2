//! Per-frame detection pass and the scheduler that drives it

use super::classifiers::{detect_black_holes, detect_largest, detect_regions};
use super::config::VisionConfig;
use super::monster::{Exclusions, MonsterResolver};
use crate::frame::Frame;
use crate::template::{SpringMatcher, Template, TemplateLoader};
use crate::Result;
use anyhow::Context;
use doodle_core::schedule::single;
use doodle_core::{
    BoundingBox, Detection, DetectionSet, EntityKind, LowPriorityCache, Point, SchedulerState,
    VelocityEstimate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, warn};

/// Everything the pipeline knows about one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameReport {
    pub frame_number: u64,
    pub detections: DetectionSet,
    pub velocity: VelocityEstimate,
    pub player_center: Option<Point>,
    /// Whether black holes, rockets and propellers were detected on this frame rather than
    /// taken from the cache
    pub low_priority_refreshed: bool,
    pub processing_time_ms: u64,
}

impl FrameReport {
    /// Export the report as pretty JSON
    pub fn export_json<P: AsRef<Path>>(&self, output_path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize frame report")?;

        std::fs::write(output_path.as_ref(), json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path.as_ref()))?;

        Ok(())
    }
}

/// Runs every classifier over a frame in a fixed order
pub struct FrameDetector {
    config: VisionConfig,
    springs: SpringMatcher,
}

impl FrameDetector {
    /// Create a detector with an already loaded spring template
    pub fn new(config: VisionConfig, spring_template: Template) -> Result<Self> {
        config.validate()?;
        let springs = SpringMatcher::new(spring_template, config.spring.clone());

        Ok(Self { config, springs })
    }

    /// Create a detector, looking the spring template up in the configured directories
    pub fn from_config(config: VisionConfig) -> Result<Self> {
        let mut loader = TemplateLoader::new();
        for dir in &config.template_dirs {
            loader = loader.add_template_dir(dir);
        }
        let template = loader.require(&config.spring.template_name)?;

        Self::new(config, template)
    }

    pub fn config(&self) -> &VisionConfig {
        &self.config
    }

    /// Process one frame.
    ///
    /// Consumes the scheduler state of the previous frame and returns the state for the next
    /// one. Low-priority detectors only run when the scheduler plans a refresh; otherwise the
    /// cached black holes, rocket and propeller are reported again.
    pub fn process(&self, frame: &Frame, state: SchedulerState) -> Result<(FrameReport, SchedulerState)> {
        let start_time = Instant::now();
        let plan = state.plan(self.config.schedule.low_priority_cadence);

        let refreshed = if plan.refresh_low_priority {
            Some(self.detect_low_priority(frame)?)
        } else {
            None
        };
        let cache = refreshed.as_ref().unwrap_or(state.cache());

        let player = detect_largest(frame, &self.config.player)?;
        let moving = detect_regions(frame, &self.config.moving_platform)?;
        let breakable = detect_regions(frame, &self.config.breakable_platform)?;
        let static_platforms = detect_regions(frame, &self.config.static_platform)?;
        let brown = detect_regions(frame, &self.config.brown_platform)?;

        let spring_bases: Vec<BoundingBox> = static_platforms.iter().chain(&moving).copied().collect();
        let springs = self.springs.detect(frame, &spring_bases)?;

        let player_center = player.map(|bbox| bbox.center());
        let exclusions = Exclusions::new(player_center).with_boxes(
            player
                .into_iter()
                .chain(cache.item_boxes())
                .chain(static_platforms.iter().copied())
                .chain(moving.iter().copied())
                .chain(springs.iter().copied()),
        );
        let monsters = MonsterResolver::new(&self.config.monster, &self.config.brown_platform.range)
            .resolve(frame, &exclusions)?;

        let mut detections = DetectionSet::new();
        detections.extend(single(EntityKind::Player, player));
        let classes = [
            (EntityKind::StaticPlatform, static_platforms),
            (EntityKind::MovingPlatform, moving),
            (EntityKind::BreakablePlatform, breakable),
            (EntityKind::BrownPlatform, brown),
            (EntityKind::Spring, springs),
        ];
        for (kind, boxes) in classes {
            detections.extend(boxes.into_iter().map(|bbox| Detection::new(kind, bbox)));
        }
        detections.extend(cache.detections().cloned());
        detections.extend(monsters.into_iter().map(|bbox| Detection::new(EntityKind::Monster, bbox)));

        let (state, velocity) = state.advance(plan, refreshed, player_center);

        let processing_time_ms = start_time.elapsed().as_millis() as u64;
        debug!(
            frame = plan.frame_number,
            refreshed = plan.refresh_low_priority,
            counts = ?detections.counts(),
            ?velocity,
            processing_time_ms,
            "frame processed"
        );
        if processing_time_ms > self.config.schedule.frame_budget_ms {
            warn!(
                frame = plan.frame_number,
                processing_time_ms,
                budget_ms = self.config.schedule.frame_budget_ms,
                "frame over budget"
            );
        }

        let report = FrameReport {
            frame_number: plan.frame_number,
            detections,
            velocity,
            player_center,
            low_priority_refreshed: plan.refresh_low_priority,
            processing_time_ms,
        };

        Ok((report, state))
    }

    fn detect_low_priority(&self, frame: &Frame) -> Result<LowPriorityCache> {
        Ok(LowPriorityCache {
            black_holes: detect_black_holes(frame, &self.config.black_hole)?,
            rocket: single(EntityKind::Rocket, detect_largest(frame, &self.config.rocket)?),
            propeller: single(EntityKind::Propeller, detect_largest(frame, &self.config.propeller)?),
        })
    }
}
