//! Parameter definitions with units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Units (world units, degrees, seconds, decibels)
//! - Documented ranges and meanings
//! - Validation where a bad value would break the pipeline

mod audio;
mod render;
mod shape;

// Re-export all types
pub use audio::{AudioConfig, ConfigError};
pub use render::RenderConfig;
pub use shape::ShapeParams;
