//! Synthetic frames for unit tests

use crate::frame::Frame;
use crate::Result;
use image::{Rgb, RgbImage};
use opencv::{
    core::{Mat, Rect, Scalar, CV_8UC1},
    imgproc,
};

pub const PAPER: [u8; 3] = [230, 230, 230];
pub const GREEN: [u8; 3] = [148, 200, 43];
pub const BLUE: [u8; 3] = [0, 200, 255];
pub const WHITE: [u8; 3] = [255, 255, 255];
pub const BROWN: [u8; 3] = [150, 90, 40];
pub const YELLOW: [u8; 3] = [230, 210, 40];
pub const ORANGE: [u8; 3] = [255, 60, 0];
pub const ROCKET: [u8; 3] = [170, 205, 205];
pub const BLACK: [u8; 3] = [20, 20, 20];
pub const RED: [u8; 3] = [255, 0, 0];

/// Blank game-sized canvas
pub fn paper(width: u32, height: u32) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(PAPER))
}

pub fn paint(image: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: [u8; 3]) {
    for py in y..y + height {
        for px in x..x + width {
            image.put_pixel(px, py, Rgb(color));
        }
    }
}

pub fn frame(image: &RgbImage) -> Result<Frame> {
    Frame::from_rgb_image(image)
}

pub const COIL_DARK: u8 = 40;
pub const COIL_LIGHT: u8 = 220;

/// Spring-like template: horizontal coil stripes, two rows per band
pub fn coil_template() -> Result<Mat> {
    coil(12)
}

/// Coil stripes `rows` tall and 10 px wide
pub fn coil(rows: i32) -> Result<Mat> {
    let mut image = Mat::new_rows_cols_with_default(rows, 10, CV_8UC1, Scalar::all(COIL_LIGHT as f64))?;
    for band in (0..rows).step_by(4) {
        imgproc::rectangle(
            &mut image,
            Rect::new(0, band, 10, 2),
            Scalar::all(COIL_DARK as f64),
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;
    }
    Ok(image)
}

/// Paint the same stripes as [`coil`] onto a color canvas
pub fn paint_coil(image: &mut RgbImage, x: u32, y: u32, rows: u32) {
    for row in 0..rows {
        let shade = if row % 4 < 2 { COIL_DARK } else { COIL_LIGHT };
        paint(image, x, y + row, 10, 1, [shade, shade, shade]);
    }
}
