//! Entity classification and the per-frame detection pass

pub mod classifiers;
pub mod config;
pub mod detector;
pub mod monster;

pub use config::{BlackHoleConfig, BlobConfig, Cleanup, MonsterConfig, RegionConfig, ScheduleConfig, SpringConfig, VisionConfig};
pub use detector::{FrameDetector, FrameReport};
pub use monster::{Exclusions, MonsterResolver};
