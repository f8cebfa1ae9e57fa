use crate::{ImageSize, Roi};

/// An error type for the image module.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when the image size is not valid.
    #[error("Invalid image size. Expected {0}x{1}, got {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the sample buffer of an image size is not addressable.
    #[error("Image size {0} is too large to allocate")]
    SizeOverflow(ImageSize),

    /// Error when a region of interest does not fit in the image it indexes.
    #[error("Region of interest {roi} is out of bounds of image {size}")]
    RoiOutOfBounds {
        /// the offending region.
        roi: Roi,
        /// the size of the indexed image.
        size: ImageSize,
    },

    /// Error when a region of interest has zero area.
    #[error("Region of interest {0} has zero area")]
    EmptyRoi(Roi),

    /// Error when a pyramid layer count is not representable.
    #[error("Invalid pyramid layer count {0}")]
    InvalidLayerCount(usize),

    /// Error when a pyramid level collapses below one pixel.
    #[error("Pyramid level {level} of region {roi} is degenerate (scaled below one pixel)")]
    DegenerateLevel {
        /// index of the first degenerate level.
        level: usize,
        /// the region the pyramid was built from.
        roi: Roi,
    },
}
