//! Color segmentation and contour primitives shared by every classifier

pub mod contour;
pub mod mask;

pub use contour::{largest, regions, simplified_regions, Region};
pub use mask::{channel_mean, in_range, invert, morph, morph_all, subtract, Morphology};
