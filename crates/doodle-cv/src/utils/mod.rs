//! Utility modules

pub mod image;

pub use self::image::{is_image_file, ImageUtils, IMAGE_EXTENSIONS};
