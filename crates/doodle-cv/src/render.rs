//! Debug overlay of a frame's detections

use crate::bbox::to_rect;
use crate::frame::Frame;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use doodle_core::{Detection, DetectionSet, EntityKind};
use opencv::{
    core::{self, Mat, Scalar, Vector},
    imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_8},
    prelude::*,
};
use std::path::Path;

/// BGR color, line thickness and whether the label is drawn
fn style(kind: EntityKind) -> (Scalar, i32, bool) {
    let red = Scalar::new(0.0, 0.0, 255.0, 0.0);
    match kind {
        EntityKind::Player => (Scalar::new(0.0, 255.0, 0.0, 0.0), 2, true),
        EntityKind::Monster => (Scalar::new(0.0, 165.0, 255.0, 0.0), 3, true),
        EntityKind::MovingPlatform => (Scalar::new(255.0, 0.0, 255.0, 0.0), 2, true),
        EntityKind::BreakablePlatform => (Scalar::new(255.0, 255.0, 255.0, 0.0), 2, true),
        EntityKind::BrownPlatform => (Scalar::new(19.0, 69.0, 139.0, 0.0), 2, true),
        EntityKind::StaticPlatform => (red, 2, false),
        EntityKind::Spring | EntityKind::Rocket | EntityKind::Propeller => (red, 1, true),
        EntityKind::BlackHole => (red, 2, true),
    }
}

fn draw_detection(canvas: &mut Mat, detection: &Detection) -> Result<()> {
    let (color, thickness, labeled) = style(detection.kind);
    let bbox = &detection.bbox;

    match &detection.outline {
        Some(outline) => {
            let polygon: Vector<core::Point> = outline.iter().map(|p| core::Point::new(p.x, p.y)).collect();
            let polygons = Vector::<Vector<core::Point>>::from_iter([polygon]);
            imgproc::polylines(canvas, &polygons, true, color, thickness, LINE_8, 0)?;
        }
        None => imgproc::rectangle(canvas, to_rect(bbox), color, thickness, LINE_8, 0)?,
    }

    if labeled {
        let baseline_offset = if detection.outline.is_some() { 10 } else { 5 };
        imgproc::put_text(
            canvas,
            detection.kind.label(),
            core::Point::new(bbox.x, bbox.y - baseline_offset),
            FONT_HERSHEY_SIMPLEX,
            0.5,
            color,
            1,
            LINE_8,
            false,
        )?;
    }

    Ok(())
}

/// Copy of the frame with every detection drawn on it
pub fn draw_detections(frame: &Frame, detections: &DetectionSet) -> Result<Mat> {
    let mut canvas = frame.bgr().try_clone().context("Failed to copy frame for overlay")?;

    for detection in detections {
        draw_detection(&mut canvas, detection)?;
    }

    Ok(canvas)
}

/// Draw the detections and write the overlay to `output_path`
pub fn save_overlay<P: AsRef<Path>>(frame: &Frame, detections: &DetectionSet, output_path: P) -> Result<()> {
    let overlay = draw_detections(frame, detections)?;
    ImageUtils::save_image(&overlay, output_path)
}
