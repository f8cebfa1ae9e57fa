#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the io module.
pub mod error;

/// Ground-truth log files.
pub mod ground_truth;

/// PNG image encoding and decoding.
pub mod png;

/// Numbered frame files in a directory.
pub mod sequence;

pub use crate::error::IoError;
