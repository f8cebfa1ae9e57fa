#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]
//!
//! The [`TemplateMatching`] tracker keeps a decimation pyramid of the last
//! frame's central template and, for every new frame, searches for it inside a
//! larger search window from the coarsest level down to full resolution. Each
//! returned [`Displacement`] is relative to the previous frame.

/// Displacement estimates and accumulated trajectories.
pub mod displacement;

/// Error types for the tracking module.
pub mod error;

/// Similarity metrics and peak search strategies.
pub mod peak;

/// Coarse-to-fine template matching tracker.
pub mod template;

pub use crate::displacement::{Displacement, Trajectory};
pub use crate::error::TrackingError;
pub use crate::peak::{peak_finder, Domain, Metric, Peak, PeakFinder};
pub use crate::template::{DisplacementMethod, TemplateMatching, TemplateMatchingConfig};
