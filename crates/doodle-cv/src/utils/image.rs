//! Conversions between `image` buffers and OpenCV matrices

use crate::Result;
use anyhow::{ensure, Context};
use opencv::{
    core::{Mat, Scalar, Vector, CV_8UC3},
    imgcodecs::{self, IMREAD_COLOR, IMREAD_GRAYSCALE},
    prelude::*,
};
use std::path::Path;

/// File extensions read as images, compared lowercase
pub const IMAGE_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Whether the path has one of [`IMAGE_EXTENSIONS`]
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Image utility functions shared by frames, templates and the renderer
pub struct ImageUtils;

impl ImageUtils {
    /// Convert an RGB buffer into a BGR `Mat`
    pub fn rgb_to_mat(rgb_image: &image::RgbImage) -> Result<Mat> {
        let (width, height) = rgb_image.dimensions();
        let mut mat = Mat::new_rows_cols_with_default(
            height as i32,
            width as i32,
            CV_8UC3,
            Scalar::all(0.0),
        )
        .context("Failed to allocate BGR matrix")?;

        let bytes = mat.data_bytes_mut()?;
        for (dst, src) in bytes.chunks_exact_mut(3).zip(rgb_image.pixels()) {
            let [r, g, b] = src.0;
            dst.copy_from_slice(&[b, g, r]);
        }

        Ok(mat)
    }

    /// Load image directly from path as OpenCV Mat (color, BGR)
    pub fn load_color<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path_str = path.as_ref().to_string_lossy();

        imgcodecs::imread(&path_str, IMREAD_COLOR)
            .with_context(|| format!("Failed to load color image: {}", path_str))
    }

    /// Load image directly from path as OpenCV Mat (grayscale)
    pub fn load_grayscale<P: AsRef<Path>>(path: P) -> Result<Mat> {
        let path_str = path.as_ref().to_string_lossy();

        imgcodecs::imread(&path_str, IMREAD_GRAYSCALE)
            .with_context(|| format!("Failed to load grayscale image: {}", path_str))
    }

    /// Save Mat as image
    pub fn save_image<P: AsRef<Path>>(mat: &Mat, path: P) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();

        let written = imgcodecs::imwrite(&path_str, mat, &Vector::new())
            .with_context(|| format!("Failed to save image: {}", path_str))?;
        ensure!(written, "OpenCV refused to write {}", path_str);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_to_mat_swaps_to_bgr() -> Result<()> {
        let mut rgb_img = image::RgbImage::new(4, 3);
        rgb_img.put_pixel(1, 2, image::Rgb([10, 20, 30]));

        let mat = ImageUtils::rgb_to_mat(&rgb_img)?;
        assert_eq!((mat.cols(), mat.rows()), (4, 3));

        let bgr = mat.at_2d::<opencv::core::Vec3b>(2, 1)?;
        assert_eq!(bgr.0, [30, 20, 10]);
        assert_eq!(mat.at_2d::<opencv::core::Vec3b>(0, 0)?.0, [0, 0, 0]);
        Ok(())
    }
}
