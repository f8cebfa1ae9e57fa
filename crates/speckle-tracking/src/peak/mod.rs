//! Similarity metrics and peak search strategies.
//!
//! A strategy is selected once from a ([`Domain`], [`Metric`]) pair with
//! [`peak_finder`]; callers only use the [`PeakFinder`] trait afterwards.
//!
//! Every strategy scans candidate offsets in row-major order (`dy` outer,
//! `dx` inner) and keeps the first offset reaching the optimum, so equal
//! costs always resolve to the smallest `dy`, then the smallest `dx`.

use serde::{Deserialize, Serialize};
use speckle_image::Image;

use crate::error::TrackingError;

mod frequency;
mod spatial;

pub use frequency::FrequencyPeakFinder;
pub use spatial::SpatialPeakFinder;

/// Where the similarity surface is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Domain {
    /// sliding-window evaluation of the metric at every offset.
    Spatial,
    /// correlation through the FFT, window energies through integral images.
    Frequency,
}

/// How two patches are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// sum of absolute differences, lower is better.
    Sad,
    /// sum of squared differences, lower is better.
    Ssd,
    /// zero-mean normalized cross-correlation, higher is better.
    Ncc,
}

impl Metric {
    /// Returns true if larger scores mean better alignment.
    pub fn maximizes(&self) -> bool {
        matches!(self, Metric::Ncc)
    }
}

impl std::str::FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spatial" => Ok(Domain::Spatial),
            "frequency" => Ok(Domain::Frequency),
            _ => Err(format!("unknown domain {s:?}, expected spatial or frequency")),
        }
    }
}

impl std::str::FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sad" => Ok(Metric::Sad),
            "ssd" => Ok(Metric::Ssd),
            "ncc" => Ok(Metric::Ncc),
            _ => Err(format!("unknown metric {s:?}, expected sad, ssd or ncc")),
        }
    }
}

/// Best alignment of a template inside a search patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Peak {
    /// column of the template's top-left corner inside the search patch.
    pub x: usize,
    /// row of the template's top-left corner inside the search patch.
    pub y: usize,
    /// metric value at the peak.
    pub score: f64,
}

/// Finds the integer offset that best aligns a template inside a search patch.
pub trait PeakFinder: std::fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// The metric being optimized.
    fn metric(&self) -> Metric;

    /// Locate `template` inside `search`.
    ///
    /// Candidate offsets are those keeping the template fully inside the
    /// search patch.
    ///
    /// # Errors
    ///
    /// [`TrackingError::PatchTooSmall`] if `search` is smaller than `template`
    /// in either axis.
    fn find_peak(
        &self,
        search: &Image<f32, 1>,
        template: &Image<f32, 1>,
    ) -> Result<Peak, TrackingError>;
}

/// Create the peak finder for a (domain, metric) pair.
///
/// # Errors
///
/// [`TrackingError::InvalidStrategy`] for `(Frequency, Sad)`: absolute
/// differences have no correlation form.
///
/// # Example
///
/// ```
/// use speckle_tracking::{peak_finder, Domain, Metric};
///
/// let finder = peak_finder(Domain::Spatial, Metric::Sad).unwrap();
/// assert_eq!(finder.name(), "spatial-sad");
///
/// assert!(peak_finder(Domain::Frequency, Metric::Sad).is_err());
/// ```
pub fn peak_finder(domain: Domain, metric: Metric) -> Result<Box<dyn PeakFinder>, TrackingError> {
    match (domain, metric) {
        (Domain::Spatial, metric) => Ok(Box::new(SpatialPeakFinder::new(metric))),
        (Domain::Frequency, Metric::Sad) => Err(TrackingError::InvalidStrategy { domain, metric }),
        (Domain::Frequency, metric) => Ok(Box::new(FrequencyPeakFinder::new(metric)?)),
    }
}

/// Validate patch sizes and return the number of candidate offsets per axis.
pub(crate) fn offset_range(
    search: &Image<f32, 1>,
    template: &Image<f32, 1>,
) -> Result<(usize, usize), TrackingError> {
    if !search.size().contains(&template.size()) || template.size().area() == 0 {
        return Err(TrackingError::PatchTooSmall {
            search: search.size(),
            template: template.size(),
        });
    }
    Ok((
        search.width() - template.width() + 1,
        search.height() - template.height() + 1,
    ))
}

/// Row-major scan keeping the first optimum.
pub(crate) fn scan_offsets(
    range: (usize, usize),
    metric: Metric,
    mut score_at: impl FnMut(usize, usize) -> f64,
) -> Peak {
    let mut best = Peak {
        x: 0,
        y: 0,
        score: score_at(0, 0),
    };
    for dy in 0..range.1 {
        for dx in 0..range.0 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let score = score_at(dx, dy);
            let better = if metric.maximizes() {
                score > best.score
            } else {
                score < best.score
            };
            if better {
                best = Peak { x: dx, y: dy, score };
            }
        }
    }
    best
}
