//! Template matching module

pub mod loader;
pub mod matcher;

pub use loader::TemplateLoader;
pub use matcher::SpringMatcher;

use crate::error::VisionError;
use crate::Result;
use anyhow::{ensure, Context};
use opencv::{core::Mat, imgproc, prelude::*};
use std::path::PathBuf;

/// Grayscale template image
#[derive(Debug, Clone)]
pub struct Template {
    pub name: String,
    image: Mat,
}

impl Template {
    /// Wrap a template image, converting color templates to grayscale
    pub fn new(name: impl Into<String>, image: Mat) -> Result<Self> {
        let name = name.into();
        if image.empty() {
            return Err(VisionError::EmptyImage(PathBuf::from(&name)).into());
        }

        let image = match image.channels() {
            1 => image,
            3 => {
                let mut gray = Mat::default();
                imgproc::cvt_color_def(&image, &mut gray, imgproc::COLOR_BGR2GRAY)
                    .with_context(|| format!("Failed to convert template '{}' to grayscale", name))?;
                gray
            }
            channels => return Err(VisionError::ChannelMismatch(channels).into()),
        };
        ensure!(
            image.depth() == opencv::core::CV_8U,
            "template '{}' must be 8-bit",
            name
        );

        Ok(Self { name, image })
    }

    pub fn image(&self) -> &Mat {
        &self.image
    }

    pub fn width(&self) -> i32 {
        self.image.cols()
    }

    pub fn height(&self) -> i32 {
        self.image.rows()
    }
}
