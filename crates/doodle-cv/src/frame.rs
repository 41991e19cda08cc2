//! Captured frames and their color-space conversions

use crate::error::VisionError;
use crate::utils::ImageUtils;
use crate::Result;
use anyhow::Context;
use opencv::{
    core::{Mat, Size},
    imgproc,
    prelude::*,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which image the spring matcher converts to grayscale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraySource {
    /// The HSV matrix read as if it were BGR
    #[default]
    Hsv,
    /// Luma of the captured BGR image
    Bgr,
}

/// One captured frame: the BGR capture plus its HSV conversion.
///
/// Immutable once built. Every detector of a pass borrows the same frame.
#[derive(Debug)]
pub struct Frame {
    bgr: Mat,
    hsv: Mat,
}

impl Frame {
    /// Build a frame from a BGR (or BGRA, as screen grabbers return) matrix
    pub fn from_bgr(bgr: Mat) -> Result<Self> {
        let bgr = match bgr.channels() {
            3 => bgr,
            4 => {
                let mut converted = Mat::default();
                imgproc::cvt_color_def(&bgr, &mut converted, imgproc::COLOR_BGRA2BGR)
                    .context("Failed to drop alpha channel")?;
                converted
            }
            channels => return Err(VisionError::ChannelMismatch(channels).into()),
        };

        let mut hsv = Mat::default();
        imgproc::cvt_color_def(&bgr, &mut hsv, imgproc::COLOR_BGR2HSV)
            .context("Failed to convert frame to HSV")?;

        Ok(Self { bgr, hsv })
    }

    /// Build a frame from an RGB buffer
    pub fn from_rgb_image(rgb_image: &image::RgbImage) -> Result<Self> {
        Self::from_bgr(ImageUtils::rgb_to_mat(rgb_image)?)
    }

    /// Read a frame from an image file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bgr = ImageUtils::load_color(&path)?;
        if bgr.empty() {
            return Err(VisionError::EmptyImage(path.as_ref().to_path_buf()).into());
        }
        Self::from_bgr(bgr)
    }

    pub fn width(&self) -> i32 {
        self.bgr.cols()
    }

    pub fn height(&self) -> i32 {
        self.bgr.rows()
    }

    pub fn bgr(&self) -> &Mat {
        &self.bgr
    }

    pub fn hsv(&self) -> &Mat {
        &self.hsv
    }

    /// Grayscale image smoothed with a `kernel` × `kernel` Gaussian, as used for template matching
    pub fn blurred_gray(&self, source: GraySource, kernel: i32) -> Result<Mat> {
        let input = match source {
            GraySource::Bgr => &self.bgr,
            GraySource::Hsv => &self.hsv,
        };

        let mut gray = Mat::default();
        imgproc::cvt_color_def(input, &mut gray, imgproc::COLOR_BGR2GRAY)
            .context("Failed to convert frame to grayscale")?;

        if kernel <= 1 {
            return Ok(gray);
        }

        let mut blurred = Mat::default();
        imgproc::gaussian_blur_def(&gray, &mut blurred, Size::new(kernel, kernel), 0.0)
            .context("Failed to blur grayscale frame")?;
        Ok(blurred)
    }
}
