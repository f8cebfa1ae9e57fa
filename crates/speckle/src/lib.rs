//! Coarse-to-fine displacement tracking and synthetic speckle sequences.
//!
//! ```
//! use speckle::image::Image;
//! use speckle::tracking::{TemplateMatching, TemplateMatchingConfig};
//!
//! let frame = Image::<u8, 1>::from_fn([64, 64].into(), |x, y, _| ((x * x + y * 7) % 256) as u8);
//! let mut tracker = TemplateMatching::new(&frame, TemplateMatchingConfig::default()).unwrap();
//!
//! assert!(tracker.estimate_displacement(&frame).unwrap().is_zero());
//! ```

#[doc(inline)]
pub use speckle_image as image;

#[doc(inline)]
pub use speckle_imgproc as imgproc;

#[doc(inline)]
pub use speckle_io as io;

#[doc(inline)]
pub use speckle_synth as synth;

#[doc(inline)]
pub use speckle_tracking as tracking;
