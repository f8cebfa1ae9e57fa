#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! A [`Generator`] walks a sampling window over an upscaled source image,
//! optionally rotating it, and renders each window position as an output
//! frame together with the [`GroundTruthMove`] that produced it.

/// Motion model parameters.
pub mod config;

/// Error types for the synth module.
pub mod error;

/// Frame-by-frame sequence generation.
pub mod generator;

/// Ground-truth log records.
pub mod ground_truth;

/// Additive pixel noise.
pub mod noise;

/// Random speckle source images.
pub mod pattern;

pub use crate::config::MotionConfig;
pub use crate::error::SynthError;
pub use crate::generator::{Frame, Generator};
pub use crate::ground_truth::{GroundTruth, GroundTruthMove};
pub use crate::pattern::speckle_pattern;
