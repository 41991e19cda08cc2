//! Detection configuration
//!
//! One record per entity kind, with defaults equal to the values the detectors were tuned
//! with. Every field can be overridden from JSON; fields missing from the file keep their
//! defaults.

use crate::error::ConfigError;
use crate::frame::GraySource;
use crate::segment::Morphology;
use crate::Result;
use anyhow::Context;
use doodle_core::{BoxAdjust, ColorRange, RoiMargins, ShapeFilter};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main detection configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub template_dirs: Vec<PathBuf>,
    pub player: BlobConfig,
    pub static_platform: RegionConfig,
    pub moving_platform: RegionConfig,
    pub breakable_platform: RegionConfig,
    pub brown_platform: RegionConfig,
    pub spring: SpringConfig,
    pub propeller: BlobConfig,
    pub rocket: BlobConfig,
    pub black_hole: BlackHoleConfig,
    pub monster: MonsterConfig,
    pub schedule: ScheduleConfig,
}

/// Morphological clean-up applied to a mask before contour extraction
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Cleanup {
    pub steps: Vec<Morphology>,
    pub kernel: i32,
}

impl Cleanup {
    pub fn new(steps: &[Morphology], kernel: i32) -> Self {
        Self {
            steps: steps.to_vec(),
            kernel,
        }
    }
}

/// Multi-instance class: every contour passing the shape filter is reported
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub range: ColorRange,
    pub shape: ShapeFilter,
    #[serde(default)]
    pub cleanup: Cleanup,
}

/// Single-instance class: only the largest contour is considered, then filtered and adjusted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobConfig {
    pub range: ColorRange,
    #[serde(default)]
    pub shape: ShapeFilter,
    #[serde(default)]
    pub adjust: BoxAdjust,
}

/// Spring template matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    pub template_name: String,
    pub match_threshold: f64,
    pub iou_threshold: f64,
    pub roi: RoiMargins,
    pub blur_kernel: i32,
    pub gray_source: GraySource,
}

/// Black holes keep a simplified outline instead of just a box
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlackHoleConfig {
    pub range: ColorRange,
    /// Minimum contour area
    pub min_area: f64,
    pub cleanup: Cleanup,
    /// Polygon tolerance as a fraction of the contour perimeter
    pub epsilon_ratio: f64,
}

/// Exclusion-based monster resolver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterConfig {
    /// Background paper; everything outside it is a monster candidate
    pub paper_range: ColorRange,
    /// Contour-area and aspect bounds
    pub shape: ShapeFilter,
    pub cleanup: Cleanup,
    /// Candidates whose box grown by this margin contains the player center are dropped
    pub player_halo: i32,
    /// Candidates whose top-left corner is this close (both axes) to a known box are dropped
    pub exclusion_distance: i32,
    /// Mean HSV saturation a candidate must reach
    pub min_mean_saturation: f64,
}

/// Frame scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Low-priority detectors run on frames whose number is a multiple of this
    pub low_priority_cadence: u32,
    /// Soft per-frame budget; slower frames are logged, never aborted
    pub frame_budget_ms: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            template_dirs: vec!["assets/png".into()],
            player: BlobConfig {
                range: ColorRange::new([20, 100, 100], [35, 255, 255]),
                shape: ShapeFilter::default(),
                adjust: BoxAdjust::default(),
            },
            static_platform: RegionConfig {
                range: ColorRange::new([34, 160, 150], [47, 234, 229]),
                shape: ShapeFilter::platform(150.0, 20, 3.0),
                cleanup: Cleanup::default(),
            },
            moving_platform: RegionConfig {
                range: ColorRange::new([90, 200, 180], [100, 255, 255]),
                shape: ShapeFilter::platform(150.0, 20, 3.0),
                cleanup: Cleanup::default(),
            },
            breakable_platform: RegionConfig {
                range: ColorRange::new([0, 0, 254], [179, 1, 255]),
                shape: ShapeFilter::platform(150.0, 20, 3.0),
                cleanup: Cleanup::default(),
            },
            brown_platform: RegionConfig {
                range: ColorRange::new([8, 50, 40], [22, 210, 200]),
                shape: ShapeFilter::platform(300.0, 35, 2.0),
                cleanup: Cleanup::new(&[Morphology::Open], 3),
            },
            spring: SpringConfig::default(),
            propeller: BlobConfig {
                range: ColorRange::new([5, 210, 200], [15, 255, 255]),
                shape: ShapeFilter::default(),
                adjust: BoxAdjust::new(-5, -5, 25, 10),
            },
            rocket: BlobConfig {
                range: ColorRange::new([88, 34, 195], [92, 54, 215]),
                shape: ShapeFilter::min_area(10.0),
                adjust: BoxAdjust::new(-35, -20, 55, 35),
            },
            black_hole: BlackHoleConfig::default(),
            monster: MonsterConfig::default(),
            schedule: ScheduleConfig::default(),
        }
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            template_name: "Spring".to_string(),
            match_threshold: 0.6,
            iou_threshold: 0.3,
            roi: RoiMargins {
                top: 40,
                bottom: 20,
                side: 15,
            },
            blur_kernel: 3,
            gray_source: GraySource::Hsv,
        }
    }
}

impl Default for BlackHoleConfig {
    fn default() -> Self {
        Self {
            range: ColorRange::new([0, 0, 0], [180, 255, 50]),
            min_area: 500.0,
            cleanup: Cleanup::new(&[Morphology::Close, Morphology::Open], 5),
            epsilon_ratio: 0.01,
        }
    }
}

impl Default for MonsterConfig {
    fn default() -> Self {
        Self {
            paper_range: ColorRange::new([0, 0, 180], [180, 60, 255]),
            shape: ShapeFilter {
                min_area: 500.0,
                max_area: Some(15000.0),
                max_height: None,
                min_aspect: Some(0.4),
                max_aspect: Some(2.2),
            },
            cleanup: Cleanup::new(&[Morphology::Open], 3),
            player_halo: 25,
            exclusion_distance: 30,
            min_mean_saturation: 60.0,
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            low_priority_cadence: 4,
            frame_budget_ms: 33,
        }
    }
}

impl VisionConfig {
    /// Load a JSON configuration file and validate it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: VisionConfig = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;

        config.validate()?;
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config to: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Check every range, filter and threshold for internal consistency
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        let ranges = [
            ("player", &self.player.range),
            ("static platform", &self.static_platform.range),
            ("moving platform", &self.moving_platform.range),
            ("breakable platform", &self.breakable_platform.range),
            ("brown platform", &self.brown_platform.range),
            ("propeller", &self.propeller.range),
            ("rocket", &self.rocket.range),
            ("black hole", &self.black_hole.range),
            ("paper", &self.monster.paper_range),
        ];
        if let Some((name, _)) = ranges.iter().find(|(_, range)| !range.is_valid()) {
            return Err(ConfigError::InvalidColorRange(*name));
        }

        let shapes = [
            ("player", &self.player.shape),
            ("static platform", &self.static_platform.shape),
            ("moving platform", &self.moving_platform.shape),
            ("breakable platform", &self.breakable_platform.shape),
            ("brown platform", &self.brown_platform.shape),
            ("propeller", &self.propeller.shape),
            ("rocket", &self.rocket.shape),
            ("monster", &self.monster.shape),
        ];
        if let Some((name, _)) = shapes.iter().find(|(_, shape)| !shape.is_valid()) {
            return Err(ConfigError::InvalidShapeFilter(*name));
        }

        let thresholds = [
            ("spring.match_threshold", self.spring.match_threshold),
            ("spring.iou_threshold", self.spring.iou_threshold),
        ];
        if let Some((name, value)) = thresholds
            .iter()
            .find(|(_, value)| !(0.0..=1.0).contains(value))
        {
            return Err(ConfigError::ThresholdOutOfRange {
                name: *name,
                value: *value,
            });
        }

        let cleanups = [
            ("static platform", &self.static_platform.cleanup),
            ("moving platform", &self.moving_platform.cleanup),
            ("breakable platform", &self.breakable_platform.cleanup),
            ("brown platform", &self.brown_platform.cleanup),
            ("black hole", &self.black_hole.cleanup),
            ("monster", &self.monster.cleanup),
        ];
        if let Some((name, _)) = cleanups
            .iter()
            .find(|(_, cleanup)| !cleanup.steps.is_empty() && cleanup.kernel < 1)
        {
            return Err(ConfigError::InvalidKernel(*name));
        }

        // Gaussian kernels must be odd and positive
        if self.spring.blur_kernel < 1 || self.spring.blur_kernel % 2 == 0 {
            return Err(ConfigError::InvalidKernel("spring"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert_eq!(VisionConfig::default().validate(), Ok(()));
    }

    #[test]
    fn test_partial_json_keeps_defaults() -> Result<()> {
        let config: VisionConfig = serde_json::from_str(
            r#"{
                "spring": { "match_threshold": 0.7 },
                "schedule": { "low_priority_cadence": 2 }
            }"#,
        )?;

        assert_eq!(config.spring.match_threshold, 0.7);
        assert_eq!(config.spring.iou_threshold, 0.3);
        assert_eq!(config.schedule.low_priority_cadence, 2);
        assert_eq!(config.schedule.frame_budget_ms, 33);
        assert_eq!(config.monster, MonsterConfig::default());
        Ok(())
    }

    #[test]
    fn test_round_trip_through_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("doodle-config-{}.json", std::process::id()));
        let mut config = VisionConfig::default();
        config.monster.min_mean_saturation = 75.0;

        config.save(&path)?;
        let loaded = VisionConfig::load(&path)?;
        std::fs::remove_file(&path)?;

        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut config = VisionConfig::default();
        config.spring.iou_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ThresholdOutOfRange { name: "spring.iou_threshold", .. })
        ));

        let mut config = VisionConfig::default();
        config.rocket.range = ColorRange::new([92, 34, 195], [88, 54, 215]);
        assert_eq!(config.validate(), Err(ConfigError::InvalidColorRange("rocket")));

        let mut config = VisionConfig::default();
        config.black_hole.cleanup.kernel = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidKernel("black hole")));
    }

    #[test]
    fn test_spring_gray_source_defaults_to_hsv() {
        assert_eq!(GraySource::default(), GraySource::Hsv);
        assert_eq!(SpringConfig::default().gray_source, GraySource::Hsv);

        let config: SpringConfig = serde_json::from_str(r#"{ "gray_source": "Bgr" }"#).unwrap();
        assert_eq!(config.gray_source, GraySource::Bgr);
    }

    #[test]
    fn test_spring_blur_kernel_must_be_odd() {
        let mut config = VisionConfig::default();
        for kernel in [0, 2, -3] {
            config.spring.blur_kernel = kernel;
            assert_eq!(config.validate(), Err(ConfigError::InvalidKernel("spring")));
        }
        for kernel in [1, 5] {
            config.spring.blur_kernel = kernel;
            assert_eq!(config.validate(), Ok(()));
        }
    }
}
