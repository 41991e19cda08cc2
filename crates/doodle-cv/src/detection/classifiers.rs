//! Per-class detectors built from color segmentation and shape gates

use super::config::{BlackHoleConfig, BlobConfig, Cleanup, RegionConfig};
use crate::frame::Frame;
use crate::segment::{self, Region};
use crate::Result;
use doodle_core::{BoundingBox, ColorRange, Detection, EntityKind};
use opencv::core::Mat;

fn cleaned_mask(frame: &Frame, range: &ColorRange, cleanup: &Cleanup) -> Result<Mat> {
    let mask = segment::in_range(frame.hsv(), range)?;
    segment::morph_all(mask, &cleanup.steps, cleanup.kernel)
}

/// Every region of the class color whose bounding box passes the shape filter.
///
/// Used for the four platform classes. An empty mask gives an empty list.
pub fn detect_regions(frame: &Frame, config: &RegionConfig) -> Result<Vec<BoundingBox>> {
    let mask = cleaned_mask(frame, &config.range, &config.cleanup)?;

    Ok(segment::regions(&mask)?
        .into_iter()
        .map(|region| region.bbox)
        .filter(|bbox| config.shape.accepts(bbox))
        .collect())
}

/// The single largest region of the class color, filtered then adjusted.
///
/// Only the largest contour is considered: when it fails the filter nothing is reported, even
/// if a smaller contour would have passed.
pub fn detect_largest(frame: &Frame, config: &BlobConfig) -> Result<Option<BoundingBox>> {
    let mask = segment::in_range(frame.hsv(), &config.range)?;

    Ok(segment::largest(segment::regions(&mask)?)
        .map(|region| region.bbox)
        .filter(|bbox| config.shape.accepts(bbox))
        .map(|bbox| bbox.adjust(&config.adjust)))
}

/// Dark regions large enough to be black holes, each with its simplified outline
pub fn detect_black_holes(frame: &Frame, config: &BlackHoleConfig) -> Result<Vec<Detection>> {
    let mask = cleaned_mask(frame, &config.range, &config.cleanup)?;

    Ok(segment::simplified_regions(&mask, config.epsilon_ratio)?
        .into_iter()
        .filter(|region| region.contour_area >= config.min_area)
        .map(|Region { bbox, outline, .. }| {
            let detection = Detection::new(EntityKind::BlackHole, bbox);
            match outline {
                Some(outline) => detection.with_outline(outline),
                None => detection,
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detection::VisionConfig;
    use crate::testing::*;

    #[test]
    fn test_platform_shape_gate() -> Result<()> {
        let config = VisionConfig::default();
        let mut image = paper(448, 682);
        paint(&mut image, 50, 500, 90, 14, GREEN);
        // Too tall for a platform
        paint(&mut image, 250, 300, 60, 40, GREEN);
        // Too small
        paint(&mut image, 300, 100, 12, 6, GREEN);

        let platforms = detect_regions(&frame(&image)?, &config.static_platform)?;
        assert_eq!(platforms, vec![BoundingBox::new(50, 500, 90, 14).unwrap()]);
        Ok(())
    }

    #[test]
    fn test_platform_classes_are_disjoint() -> Result<()> {
        let config = VisionConfig::default();
        let mut image = paper(448, 682);
        paint(&mut image, 20, 100, 80, 15, BLUE);
        paint(&mut image, 150, 200, 80, 15, WHITE);
        paint(&mut image, 280, 300, 80, 20, BROWN);
        let frame = frame(&image)?;

        assert!(detect_regions(&frame, &config.static_platform)?.is_empty());
        assert_eq!(
            detect_regions(&frame, &config.moving_platform)?,
            vec![BoundingBox::new(20, 100, 80, 15).unwrap()]
        );
        assert_eq!(
            detect_regions(&frame, &config.breakable_platform)?,
            vec![BoundingBox::new(150, 200, 80, 15).unwrap()]
        );
        assert_eq!(
            detect_regions(&frame, &config.brown_platform)?,
            vec![BoundingBox::new(280, 300, 80, 20).unwrap()]
        );
        Ok(())
    }

    #[test]
    fn test_largest_blob_wins() -> Result<()> {
        let config = VisionConfig::default();
        let mut image = paper(448, 682);
        paint(&mut image, 100, 100, 10, 10, YELLOW);
        paint(&mut image, 200, 400, 40, 50, YELLOW);

        let player = detect_largest(&frame(&image)?, &config.player)?;
        assert_eq!(player, BoundingBox::new(200, 400, 40, 50));
        Ok(())
    }

    #[test]
    fn test_item_boxes_are_adjusted() -> Result<()> {
        let config = VisionConfig::default();
        let mut image = paper(448, 682);
        paint(&mut image, 100, 100, 20, 10, ORANGE);
        paint(&mut image, 300, 300, 10, 30, ROCKET);
        let frame = frame(&image)?;

        assert_eq!(
            detect_largest(&frame, &config.propeller)?,
            BoundingBox::new(95, 95, 45, 20)
        );
        assert_eq!(
            detect_largest(&frame, &config.rocket)?,
            BoundingBox::new(265, 280, 65, 65)
        );
        Ok(())
    }

    #[test]
    fn test_missing_class_is_none() -> Result<()> {
        let config = VisionConfig::default();
        let frame = frame(&paper(200, 200))?;

        assert_eq!(detect_largest(&frame, &config.player)?, None);
        assert!(detect_black_holes(&frame, &config.black_hole)?.is_empty());
        assert!(detect_regions(&frame, &config.static_platform)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_black_holes_keep_outline() -> Result<()> {
        let config = VisionConfig::default();
        let mut image = paper(448, 682);
        paint(&mut image, 150, 150, 40, 40, BLACK);
        // Below the minimum contour area
        paint(&mut image, 350, 50, 15, 15, BLACK);

        let holes = detect_black_holes(&frame(&image)?, &config.black_hole)?;
        assert_eq!(holes.len(), 1);
        assert_eq!(holes[0].bbox, BoundingBox::new(150, 150, 40, 40).unwrap());
        assert_eq!(holes[0].outline.as_ref().map(Vec::len), Some(4));
        Ok(())
    }
}
