use speckle_image::{ImageError, ImageSize, Roi};

use crate::peak::{Domain, Metric};

/// Errors raised while configuring or running a tracker.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum TrackingError {
    /// Error related to image handling, including bad regions and degenerate pyramids.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// The (domain, metric) pair has no implementation.
    #[error("No {metric:?} similarity strategy exists in the {domain:?} domain")]
    InvalidStrategy {
        /// requested correlation domain.
        domain: Domain,
        /// requested similarity metric.
        metric: Metric,
    },

    /// The template ratio is outside (0, 1].
    #[error("Template ratio must be in (0, 1], got {0}")]
    InvalidTemplateRatio(f64),

    /// The search margin does not fit in the frame.
    #[error("Max shift ratio {max_shift_ratio} does not fit with template ratio {template_ratio}")]
    InvalidMaxShiftRatio {
        /// fraction of the frame kept as template.
        template_ratio: f64,
        /// fraction of the frame reserved as search margin on each side.
        max_shift_ratio: f64,
    },

    /// The upsample factor is zero or makes the upsampled frame too large.
    #[error("Invalid upsample factor {0}: must be at least 1 and keep the upsampled frame allocatable")]
    InvalidUpsample(u32),

    /// The search patch cannot contain the template patch.
    #[error("Search patch {search} is smaller than template patch {template}")]
    PatchTooSmall {
        /// size of the search patch.
        search: ImageSize,
        /// size of the template patch.
        template: ImageSize,
    },

    /// A query frame does not have the reference frame's size.
    #[error("Frame size {actual} does not match the reference frame size {expected}")]
    FrameSizeMismatch {
        /// size of the reference frame.
        expected: ImageSize,
        /// size of the rejected frame.
        actual: ImageSize,
    },

    /// Matching failed at one pyramid level.
    #[error("Matching failed at pyramid level {level} (search {search_roi}, template {template_roi}): {source}")]
    LevelFailed {
        /// pyramid level index, 0 is full resolution.
        level: usize,
        /// search region in the (upsampled) frame.
        search_roi: Roi,
        /// template region in the (upsampled) frame.
        template_roi: Roi,
        /// underlying failure.
        #[source]
        source: Box<TrackingError>,
    },
}
