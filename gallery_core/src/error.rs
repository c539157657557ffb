//! Configuration errors.
//!
//! The per-frame pipeline never fails; the only fallible step is building an
//! [`Installation`](crate::pipeline::Installation) from a configuration.

use thiserror::Error;

/// Result alias for configuration checks.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("gallery has no picture slots")]
    EmptyGallery,

    #[error("start index {index} outside gallery of {len} pictures")]
    StartIndexOutOfRange { index: usize, len: usize },

    #[error("inverted {axis} bounds: min {min} >= max {max}")]
    InvertedBounds { axis: &'static str, min: f32, max: f32 },

    #[error("blur margin {margin} m does not fit inside the {axis} extent of {extent} m")]
    MarginTooWide { axis: &'static str, margin: f32, extent: f32 },

    #[error("{name} must be positive, got {value}")]
    NonPositive { name: &'static str, value: f32 },

    #[error("gesture needs at least one segment and a window of at least one frame")]
    EmptyGesture,

    #[error("degenerate remap domain [{min}, {max}] for {name}")]
    DegenerateDomain { name: &'static str, min: f32, max: f32 },
}
