//! Doodle Vision computer vision library
//!
//! Turns captured game frames into classified detections using OpenCV: HSV segmentation,
//! contour extraction, spring template matching and an exclusion-based monster resolver,
//! driven once per frame by [`FrameDetector`].

pub mod bbox;
pub mod detection;
pub mod error;
pub mod frame;
pub mod render;
pub mod segment;
pub mod source;
pub mod template;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use bbox::ScoredBoxCollection;
pub use detection::{FrameDetector, FrameReport, VisionConfig};
pub use error::{ConfigError, VisionError};
pub use frame::{Frame, GraySource};
pub use source::{FrameSource, ImageSequenceSource};
pub use template::{SpringMatcher, Template, TemplateLoader};

// Error handling
pub type Result<T> = anyhow::Result<T>;
