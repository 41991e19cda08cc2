use std::path::PathBuf;
use thiserror::Error;

/// Domain failures of the vision pipeline
#[derive(Error, Debug)]
pub enum VisionError {
    #[error("Expected a 3-channel frame, got {0} channels")]
    ChannelMismatch(i32),
    #[error("Image at {0:?} is empty or unreadable")]
    EmptyImage(PathBuf),
    #[error("Template '{0}' not found in any template directory")]
    TemplateNotFound(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Problems found while validating a vision configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Color range for {0} has a lower bound above its upper bound")]
    InvalidColorRange(&'static str),
    #[error("Shape filter for {0} has inconsistent bounds")]
    InvalidShapeFilter(&'static str),
    #[error("Threshold {name} must be within [0, 1], got {value}")]
    ThresholdOutOfRange { name: &'static str, value: f64 },
    #[error("Morphology kernel for {0} must be a positive size")]
    InvalidKernel(&'static str),
}
