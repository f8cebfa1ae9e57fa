use speckle_image::{ImageError, ImageSize};

/// Errors raised while generating synthetic sequences.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum SynthError {
    /// Error related to image handling.
    #[error(transparent)]
    ImageError(#[from] ImageError),

    /// The precision is outside (0, 1].
    #[error("Precision has to be positive and at most 1, got {0}")]
    InvalidPrecision(f64),

    /// The noise standard deviation is negative or not finite.
    #[error("Noise standard deviation must be finite and non-negative, got {0}")]
    InvalidNoise(f64),

    /// The rotation jitter is negative or not finite.
    #[error("Angle jitter must be finite and non-negative, got {0}")]
    InvalidAngleJitter(f64),

    /// The output size has zero area.
    #[error("Output size {0} is empty")]
    EmptyOutput(ImageSize),

    /// The source image leaves no room for the configured motion.
    #[error("Source image {source_size} is too small for output {output} and motion {required:?} per axis")]
    SourceTooSmall {
        /// size of the source image.
        source_size: ImageSize,
        /// size of the generated frames.
        output: ImageSize,
        /// margin needed per axis, `|direction| + |deviation|`.
        required: [f64; 2],
    },

    /// The speckle pattern parameters are not usable.
    #[error("Invalid speckle pattern: density {density}, radius {radius}")]
    InvalidPattern {
        /// fraction of the area covered by speckles.
        density: f64,
        /// speckle radius in pixels.
        radius: f64,
    },

    /// A ground-truth line could not be parsed.
    #[error("Invalid ground-truth line {line}: {reason}")]
    InvalidGroundTruth {
        /// 1-based line number.
        line: usize,
        /// what was wrong with it.
        reason: String,
    },
}
