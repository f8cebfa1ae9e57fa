use speckle_image::Image;

use super::{offset_range, scan_offsets, Metric, Peak, PeakFinder};
use crate::error::TrackingError;

/// Sliding-window peak search evaluating the metric at every offset.
///
/// Costs are accumulated in `f64` so that large templates keep exact integer
/// sums for 8-bit data, which keeps tie-breaking reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpatialPeakFinder {
    metric: Metric,
}

impl SpatialPeakFinder {
    /// Create a spatial-domain finder for `metric`.
    pub fn new(metric: Metric) -> Self {
        Self { metric }
    }
}

impl PeakFinder for SpatialPeakFinder {
    fn name(&self) -> &'static str {
        match self.metric {
            Metric::Sad => "spatial-sad",
            Metric::Ssd => "spatial-ssd",
            Metric::Ncc => "spatial-ncc",
        }
    }

    fn metric(&self) -> Metric {
        self.metric
    }

    fn find_peak(
        &self,
        search: &Image<f32, 1>,
        template: &Image<f32, 1>,
    ) -> Result<Peak, TrackingError> {
        let range = offset_range(search, template)?;
        let window = Window::new(search, template);

        let peak = match self.metric {
            Metric::Sad => scan_offsets(range, self.metric, |dx, dy| {
                window.fold(dx, dy, |acc, s, t| acc + (s - t).abs())
            }),
            Metric::Ssd => scan_offsets(range, self.metric, |dx, dy| {
                window.fold(dx, dy, |acc, s, t| acc + (s - t) * (s - t))
            }),
            Metric::Ncc => {
                let stats = TemplateStats::new(template);
                scan_offsets(range, self.metric, |dx, dy| window.ncc(dx, dy, &stats))
            }
        };

        Ok(peak)
    }
}

/// Pairs a search patch with a template for per-offset accumulation.
struct Window<'a> {
    search: &'a [f32],
    search_cols: usize,
    template: &'a [f32],
    template_cols: usize,
    template_rows: usize,
}

impl<'a> Window<'a> {
    fn new(search: &'a Image<f32, 1>, template: &'a Image<f32, 1>) -> Self {
        Self {
            search: search.as_slice(),
            search_cols: search.cols(),
            template: template.as_slice(),
            template_cols: template.cols(),
            template_rows: template.rows(),
        }
    }

    /// Fold `f(acc, search_sample, template_sample)` over the window at `(dx, dy)`.
    fn fold(&self, dx: usize, dy: usize, f: impl Fn(f64, f64, f64) -> f64) -> f64 {
        let mut acc = 0.0;
        for ty in 0..self.template_rows {
            let s_off = (dy + ty) * self.search_cols + dx;
            let t_off = ty * self.template_cols;
            let s_row = &self.search[s_off..s_off + self.template_cols];
            let t_row = &self.template[t_off..t_off + self.template_cols];
            for (&s, &t) in s_row.iter().zip(t_row) {
                acc = f(acc, s as f64, t as f64);
            }
        }
        acc
    }

    fn ncc(&self, dx: usize, dy: usize, stats: &TemplateStats) -> f64 {
        let n = stats.count;
        let sum_s = self.fold(dx, dy, |acc, s, _| acc + s);
        let mean_s = sum_s / n;
        let (cross, var_s) = {
            let mut cross = 0.0;
            let mut var_s = 0.0;
            for ty in 0..self.template_rows {
                let s_off = (dy + ty) * self.search_cols + dx;
                let t_off = ty * self.template_cols;
                let s_row = &self.search[s_off..s_off + self.template_cols];
                let t_row = &self.template[t_off..t_off + self.template_cols];
                for (&s, &t) in s_row.iter().zip(t_row) {
                    let ds = s as f64 - mean_s;
                    cross += ds * (t as f64 - stats.mean);
                    var_s += ds * ds;
                }
            }
            (cross, var_s)
        };
        normalized(cross, var_s, stats.variance)
    }
}

/// Mean and sum of squared deviations of a template.
pub(super) struct TemplateStats {
    pub(super) count: f64,
    pub(super) sum: f64,
    pub(super) mean: f64,
    pub(super) variance: f64,
}

impl TemplateStats {
    pub(super) fn new(template: &Image<f32, 1>) -> Self {
        let data = template.as_slice();
        let count = data.len() as f64;
        let sum: f64 = data.iter().map(|&v| v as f64).sum();
        let mean = sum / count;
        let variance = data.iter().map(|&v| (v as f64 - mean).powi(2)).sum();
        Self {
            count,
            sum,
            mean,
            variance,
        }
    }
}

/// Correlation coefficient from a cross term and two sums of squared deviations.
///
/// A flat patch carries no structure to correlate with and scores zero.
pub(super) fn normalized(cross: f64, var_a: f64, var_b: f64) -> f64 {
    let denom = (var_a * var_b).sqrt();
    if denom <= f64::EPSILON {
        0.0
    } else {
        cross / denom
    }
}
