//! Pixel interpolation methods for image transformations.
//!
//! - **Nearest**: uses the nearest pixel value (pixel replication when upscaling)
//! - **Bilinear**: linear interpolation between the four neighbouring pixels

mod bilinear;
mod interpolate;
mod nearest;

pub use interpolate::{interpolate_pixel, InterpolationMode};
