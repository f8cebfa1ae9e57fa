#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// image representation for computer vision purposes.
pub mod image;

/// axis-aligned regions of interest.
pub mod roi;

/// Error types for the image module.
pub mod error;

pub use crate::error::ImageError;
pub use crate::image::{Image, ImageDtype, ImageSize};
pub use crate::roi::Roi;
