#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image cropping module.
pub mod crop;

/// utilities for interpolation.
pub mod interpolation;

/// module containing parallelization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// decimation pyramids for coarse-to-fine search.
pub mod pyramid;

/// image geometric transformations module.
pub mod warp;
