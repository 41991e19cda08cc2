//! Spring detection by normalized cross-correlation around platforms

use super::Template;
use crate::bbox::{to_rect, ScoredBoxCollection};
use crate::detection::config::SpringConfig;
use crate::frame::Frame;
use crate::Result;
use anyhow::Context;
use doodle_core::{BoundingBox, ScoredBox};
use opencv::{
    core::{self, Mat},
    imgproc,
    prelude::*,
};
use tracing::trace;

/// Locates springs on top of platforms
pub struct SpringMatcher {
    template: Template,
    config: SpringConfig,
}

impl SpringMatcher {
    pub fn new(template: Template, config: SpringConfig) -> Self {
        Self { template, config }
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    /// Every location inside `region` whose correlation with the template reaches the match
    /// threshold, already translated into frame coordinates.
    ///
    /// `gray` is the full-frame grayscale image; `region` must lie inside it and be at least as
    /// large as the template.
    pub fn match_region(&self, gray: &Mat, region: &BoundingBox) -> Result<ScoredBoxCollection> {
        let roi = Mat::roi(gray, to_rect(region)).context("Spring region outside of frame")?;

        let mut result = Mat::default();
        imgproc::match_template(
            &roi,
            self.template.image(),
            &mut result,
            imgproc::TM_CCOEFF_NORMED,
            &core::no_array(),
        )
        .context("Template matching failed")?;

        let offset = region.top_left();
        let mut candidates = ScoredBoxCollection::new();

        for y in 0..result.rows() {
            for x in 0..result.cols() {
                let score = *result.at_2d::<f32>(y, x)? as f64;
                if score < self.config.match_threshold {
                    continue;
                }

                let local = BoundingBox::from_parts(x, y, self.template.width(), self.template.height());
                candidates.push(ScoredBox::new(local.translate(offset), score));
            }
        }

        Ok(candidates)
    }

    /// Springs around the given platforms.
    ///
    /// Each platform gets its own region of interest and its own suppression pass; matches from
    /// different platforms are never compared, so a spring sitting between two nearby platforms
    /// can be reported once per platform.
    pub fn detect(&self, frame: &Frame, platforms: &[BoundingBox]) -> Result<Vec<BoundingBox>> {
        let mut springs = Vec::new();
        if platforms.is_empty() {
            return Ok(springs);
        }

        let gray = frame.blurred_gray(self.config.gray_source, self.config.blur_kernel)?;

        for platform in platforms {
            let Some(region) = self
                .config
                .roi
                .region_around(platform, frame.width(), frame.height())
            else {
                continue;
            };
            if region.height < self.template.height() || region.width < self.template.width() {
                trace!(?platform, "spring region smaller than template, skipped");
                continue;
            }

            let candidates = self.match_region(&gray, &region)?;
            let found = candidates.len();
            let kept = candidates.suppress(self.config.iou_threshold);
            trace!(?platform, found, kept = kept.len(), "spring candidates suppressed");

            springs.extend(kept.boxes());
        }

        Ok(springs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{coil, coil_template, frame, paint_coil, paper};
    use opencv::core::{Scalar, CV_8UC1};

    fn matcher() -> Result<SpringMatcher> {
        Ok(SpringMatcher::new(
            Template::new("Spring", coil_template()?)?,
            SpringConfig::default(),
        ))
    }

    fn paste(canvas: &mut Mat, patch: &Mat, x: i32, y: i32) -> Result<()> {
        for row in 0..patch.rows() {
            for col in 0..patch.cols() {
                *canvas.at_2d_mut::<u8>(y + row, x + col)? = *patch.at_2d::<u8>(row, col)?;
            }
        }
        Ok(())
    }

    #[test]
    fn test_match_reported_in_frame_coordinates() -> Result<()> {
        let matcher = matcher()?;
        let mut gray = Mat::new_rows_cols_with_default(200, 300, CV_8UC1, Scalar::all(128.0))?;
        let (ox, oy, rx, ry) = (120, 60, 17, 9);
        paste(&mut gray, matcher.template().image(), ox + rx, oy + ry)?;

        let region = BoundingBox::new(ox, oy, 60, 40).unwrap();
        let best = matcher
            .match_region(&gray, &region)?
            .suppress(0.3)
            .into_iter()
            .next()
            .expect("template should match");

        assert_eq!(best.bbox, BoundingBox::new(ox + rx, oy + ry, 10, 12).unwrap());
        assert!(best.score > 0.99);
        Ok(())
    }

    #[test]
    fn test_uniform_region_has_no_matches() -> Result<()> {
        let matcher = matcher()?;
        let gray = Mat::new_rows_cols_with_default(100, 100, CV_8UC1, Scalar::all(128.0))?;

        let region = BoundingBox::new(10, 10, 50, 50).unwrap();
        assert!(matcher.match_region(&gray, &region)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_region_smaller_than_template_is_skipped() -> Result<()> {
        let matcher = SpringMatcher::new(Template::new("Spring", coil(40)?)?, SpringConfig::default());
        let mut image = paper(300, 200);
        paint_coil(&mut image, 170, 60, 40);

        // Clipped at the top edge, its region is only 25 px tall
        let near_top = BoundingBox::new(20, 0, 60, 5).unwrap();
        let platform = BoundingBox::new(150, 90, 60, 10).unwrap();

        let springs = matcher.detect(&frame(&image)?, &[near_top, platform])?;
        assert_eq!(springs, vec![BoundingBox::new(170, 60, 10, 40).unwrap()]);
        Ok(())
    }
}
