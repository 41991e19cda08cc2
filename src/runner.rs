//! Frame loop: pull frames from a source, run the detector, keep the scheduler state

use anyhow::Context;
use clap::Parser;
use doodle_core::{EntityKind, SchedulerState};
use doodle_cv::{
    render, FrameDetector, FrameReport, FrameSource, ImageSequenceSource, Result, VisionConfig,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Detect game entities in a directory of captured frames
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "doodle-vision")]
#[command(about = "Detect game entities in captured frames", long_about = None)]
pub struct RunnerConfig {
    /// Directory of captured frames, processed in file-name order
    pub frames_dir: PathBuf,

    /// JSON detection config; defaults apply when omitted
    #[arg(long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Write an annotated overlay per frame into this directory
    #[arg(long = "output", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the run summary as JSON
    #[arg(long = "json", value_name = "FILE")]
    pub json_path: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

/// What a whole run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub frames_processed: u64,
    pub frames_skipped: u64,
    /// Detections per kind summed over all frames
    pub totals: BTreeMap<EntityKind, usize>,
    pub reports: Vec<FrameReport>,
}

impl RunSummary {
    fn record(&mut self, report: FrameReport) {
        self.frames_processed += 1;
        for (kind, count) in report.detections.counts() {
            *self.totals.entry(kind).or_insert(0) += count;
        }
        self.reports.push(report);
    }

    pub fn export_json<P: AsRef<Path>>(&self, output_path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run summary")?;

        std::fs::write(output_path.as_ref(), json)
            .with_context(|| format!("Failed to write JSON to: {:?}", output_path.as_ref()))?;

        Ok(())
    }
}

/// Drive the detector over every frame of `source`.
///
/// Failed captures are counted and skipped without touching the scheduler state.
pub fn run_source<S: FrameSource>(
    detector: &FrameDetector,
    source: &mut S,
    output_dir: Option<&Path>,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();
    let mut state = SchedulerState::new();

    while !source.is_exhausted() {
        let Some(frame) = source.next_frame()? else {
            summary.frames_skipped += 1;
            continue;
        };

        let (report, next) = detector.process(&frame, state)?;
        state = next;

        if let Some(dir) = output_dir {
            let path = dir.join(format!("frame_{:05}.png", report.frame_number));
            render::save_overlay(&frame, &report.detections, &path)?;
        }

        summary.record(report);
    }

    Ok(summary)
}

/// Full run as configured on the command line
pub fn run(config: &RunnerConfig) -> Result<RunSummary> {
    let vision_config = match &config.config_path {
        Some(path) => VisionConfig::load(path)?,
        None => VisionConfig::default(),
    };
    let detector = FrameDetector::from_config(vision_config)?;

    if let Some(dir) = &config.output_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
    }

    let mut source = ImageSequenceSource::new().add_dir(&config.frames_dir)?;
    info!(frames = source.remaining(), dir = %config.frames_dir.display(), "starting frame loop");

    let summary = run_source(&detector, &mut source, config.output_dir.as_deref())?;
    if summary.frames_skipped > 0 {
        warn!(skipped = summary.frames_skipped, "some frames could not be read");
    }
    info!(
        processed = summary.frames_processed,
        totals = ?summary.totals,
        "frame loop finished"
    );

    if let Some(path) = &config.json_path {
        summary.export_json(path)?;
        info!(path = %path.display(), "run summary written");
    }

    Ok(summary)
}
