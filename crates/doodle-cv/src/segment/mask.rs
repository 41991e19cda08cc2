//! Binary masks from HSV color ranges, and the mask algebra classifiers combine them with

use crate::Result;
use anyhow::Context;
use doodle_core::ColorRange;
use opencv::{
    core::{self, Mat, Point, Scalar, Size},
    imgproc,
    prelude::*,
};
use serde::{Deserialize, Serialize};

fn bound(channels: [u8; 3]) -> Scalar {
    Scalar::new(
        channels[0] as f64,
        channels[1] as f64,
        channels[2] as f64,
        0.0,
    )
}

/// Mask that is 255 where all three HSV channels fall inside `range` (bounds inclusive).
///
/// # Panics
///
/// When `hsv` is not a 3-channel image: the pipeline was wired against the wrong color space.
pub fn in_range(hsv: &Mat, range: &ColorRange) -> Result<Mat> {
    assert_eq!(
        hsv.channels(),
        3,
        "color range applied to a {}-channel image",
        hsv.channels()
    );

    let mut mask = Mat::default();
    core::in_range(hsv, &bound(range.lower), &bound(range.upper), &mut mask)
        .context("Color segmentation failed")?;
    Ok(mask)
}

/// Everything outside the mask
pub fn invert(mask: &Mat) -> Result<Mat> {
    let mut inverted = Mat::default();
    core::bitwise_not(mask, &mut inverted, &core::no_array()).context("Mask inversion failed")?;
    Ok(inverted)
}

/// Saturating `a - b`: pixels of `a` that are not in `b`
pub fn subtract(a: &Mat, b: &Mat) -> Result<Mat> {
    let mut difference = Mat::default();
    core::subtract(a, b, &mut difference, &core::no_array(), -1)
        .context("Mask subtraction failed")?;
    Ok(difference)
}

/// Morphological operation with a square structuring element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Morphology {
    /// Erode then dilate: removes speckles smaller than the kernel
    Open,
    /// Dilate then erode: bridges gaps smaller than the kernel
    Close,
}

impl Morphology {
    fn op(&self) -> i32 {
        match self {
            Morphology::Open => imgproc::MORPH_OPEN,
            Morphology::Close => imgproc::MORPH_CLOSE,
        }
    }
}

/// Apply `operation` with a `kernel` × `kernel` square element
pub fn morph(mask: &Mat, operation: Morphology, kernel: i32) -> Result<Mat> {
    let element =
        imgproc::get_structuring_element(imgproc::MORPH_RECT, Size::new(kernel, kernel), Point::new(-1, -1))
            .context("Failed to build structuring element")?;

    let mut out = Mat::default();
    imgproc::morphology_ex(
        mask,
        &mut out,
        operation.op(),
        &element,
        Point::new(-1, -1),
        1,
        core::BORDER_CONSTANT,
        imgproc::morphology_default_border_value()?,
    )
    .with_context(|| format!("Morphological {operation:?} failed"))?;
    Ok(out)
}

/// Apply a sequence of morphological steps in order
pub fn morph_all(mask: Mat, steps: &[Morphology], kernel: i32) -> Result<Mat> {
    steps
        .iter()
        .try_fold(mask, |mask, step| morph(&mask, *step, kernel))
}

/// Mean of one channel over a rectangular region
pub fn channel_mean(image: &Mat, region: core::Rect, channel: usize) -> Result<f64> {
    let roi = Mat::roi(image, region).context("Region outside of image")?;
    let mean = core::mean(&roi, &core::no_array()).context("Failed to average region")?;
    Ok(mean[channel])
}
