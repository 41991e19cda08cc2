// tests/pipeline_tests.rs
use doodle_core::{BoundingBox, EntityKind, SchedulerState};
use doodle_cv::{Frame, FrameDetector, Result, Template, VisionConfig};
use image::{GrayImage, Luma, Rgb, RgbImage};
use opencv::core::{Mat, Scalar, CV_8UC1};
use opencv::prelude::*;

const WIDTH: u32 = 448;
const HEIGHT: u32 = 682;
const GREEN: [u8; 3] = [148, 200, 43];
const RED: [u8; 3] = [255, 0, 0];
const ORANGE: [u8; 3] = [255, 60, 0];
const DARK: u8 = 40;
const LIGHT: u8 = 220;

fn paper() -> RgbImage {
    RgbImage::from_pixel(WIDTH, HEIGHT, Rgb([230, 230, 230]))
}

fn paint(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: [u8; 3]) {
    for py in y..y + height {
        for px in x..x + width {
            image.put_pixel(px, py, Rgb(color));
        }
    }
}

/// Coil shade of a spring row: two dark rows, then two light rows
fn coil_shade(row: u32) -> u8 {
    if row % 4 < 2 { DARK } else { LIGHT }
}

fn spring_template() -> GrayImage {
    GrayImage::from_fn(10, 12, |_, y| Luma([coil_shade(y)]))
}

fn paint_spring(image: &mut RgbImage, x: u32, y: u32) {
    for row in 0..12 {
        let shade = coil_shade(row);
        paint(image, x, y + row, 10, 1, [shade, shade, shade]);
    }
}

fn template_mat() -> Result<Mat> {
    let template = spring_template();
    let mut mat = Mat::new_rows_cols_with_default(12, 10, CV_8UC1, Scalar::all(0.0))?;
    mat.data_bytes_mut()?.copy_from_slice(template.as_raw());
    Ok(mat)
}

fn detector() -> Result<FrameDetector> {
    FrameDetector::new(VisionConfig::default(), Template::new("Spring", template_mat()?)?)
}

#[test]
fn test_single_static_platform_end_to_end() -> Result<()> {
    let mut image = paper();
    paint(&mut image, 50, 500, 90, 14, GREEN);

    let (report, state) = detector()?.process(&Frame::from_rgb_image(&image)?, SchedulerState::new())?;

    assert_eq!(
        report.detections.boxes_of(EntityKind::StaticPlatform),
        vec![BoundingBox::new(50, 500, 90, 14).unwrap()]
    );
    assert_eq!(report.detections.len(), 1);
    assert_eq!(report.frame_number, 1);
    assert_eq!(state.frame_count(), 1);
    Ok(())
}

#[test]
fn test_spring_found_on_platform() -> Result<()> {
    let mut image = paper();
    paint(&mut image, 50, 500, 90, 14, GREEN);
    paint_spring(&mut image, 80, 488);

    let (report, _) = detector()?.process(&Frame::from_rgb_image(&image)?, SchedulerState::new())?;

    assert_eq!(
        report.detections.boxes_of(EntityKind::Spring),
        vec![BoundingBox::new(80, 488, 10, 12).unwrap()]
    );
    assert_eq!(report.detections.count(EntityKind::Monster), 0);
    Ok(())
}

#[test]
fn test_monster_next_to_platform_is_excluded() -> Result<()> {
    let mut image = paper();
    paint(&mut image, 50, 500, 90, 14, GREEN);
    // Top-left corner 10 px right and 28 px above the platform's
    paint(&mut image, 60, 472, 25, 25, RED);
    paint(&mut image, 300, 200, 25, 25, RED);

    let (report, _) = detector()?.process(&Frame::from_rgb_image(&image)?, SchedulerState::new())?;

    assert_eq!(
        report.detections.boxes_of(EntityKind::Monster),
        vec![BoundingBox::new(300, 200, 25, 25).unwrap()]
    );
    Ok(())
}

#[test]
fn test_low_priority_cadence() -> Result<()> {
    let detector = detector()?;
    let mut image = paper();
    paint(&mut image, 200, 100, 20, 10, ORANGE);
    let frame = Frame::from_rgb_image(&image)?;

    let mut state = SchedulerState::new();
    let mut refreshed = Vec::new();
    let mut propellers = Vec::new();
    for _ in 0..8 {
        let (report, next) = detector.process(&frame, state)?;
        if report.low_priority_refreshed {
            refreshed.push(report.frame_number);
        }
        propellers.push(report.detections.count(EntityKind::Propeller));
        state = next;
    }

    assert_eq!(refreshed, vec![4, 8]);
    assert_eq!(propellers, vec![0, 0, 0, 1, 1, 1, 1, 1]);
    assert_eq!(
        state.cache().propeller.as_ref().map(|d| d.bbox),
        BoundingBox::new(195, 95, 45, 20)
    );
    Ok(())
}

#[test]
fn test_detector_from_config_files() -> Result<()> {
    let dir = std::env::temp_dir().join(format!("doodle-pipeline-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    spring_template().save(dir.join("spring.png"))?;

    let mut config = VisionConfig::default();
    config.template_dirs = vec![dir.clone()];
    config.schedule.low_priority_cadence = 1;
    let config_path = dir.join("vision.json");
    config.save(&config_path)?;

    let detector = FrameDetector::from_config(VisionConfig::load(&config_path)?)?;
    std::fs::remove_dir_all(&dir)?;

    let (report, _) = detector.process(&Frame::from_rgb_image(&paper())?, SchedulerState::new())?;
    assert!(report.low_priority_refreshed);
    assert!(report.detections.is_empty());
    Ok(())
}
