use rustfft::{num_complex::Complex, FftPlanner};
use speckle_image::Image;

use super::spatial::{normalized, TemplateStats};
use super::{offset_range, scan_offsets, Metric, Peak, PeakFinder};
use crate::error::TrackingError;

/// Peak search on a cross-correlation surface computed through the FFT.
///
/// The template is zero-padded to the search size; for every offset keeping
/// the template inside the search patch the circular correlation equals the
/// linear one, so no extra padding is needed. Window sums and energies come
/// from integral images. Scores carry floating-point round-off, so exact ties
/// between distinct offsets are not guaranteed to resolve as in the spatial
/// domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrequencyPeakFinder {
    metric: FrequencyMetric,
}

/// Metrics with a correlation-surface form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrequencyMetric {
    Ssd,
    Ncc,
}

impl FrequencyPeakFinder {
    /// Create a frequency-domain finder.
    ///
    /// # Errors
    ///
    /// [`TrackingError::InvalidStrategy`] for [`Metric::Sad`].
    pub fn new(metric: Metric) -> Result<Self, TrackingError> {
        let metric = match metric {
            Metric::Ssd => FrequencyMetric::Ssd,
            Metric::Ncc => FrequencyMetric::Ncc,
            Metric::Sad => {
                return Err(TrackingError::InvalidStrategy {
                    domain: super::Domain::Frequency,
                    metric,
                })
            }
        };
        Ok(Self { metric })
    }
}

impl PeakFinder for FrequencyPeakFinder {
    fn name(&self) -> &'static str {
        match self.metric {
            FrequencyMetric::Ssd => "frequency-ssd",
            FrequencyMetric::Ncc => "frequency-ncc",
        }
    }

    fn metric(&self) -> Metric {
        match self.metric {
            FrequencyMetric::Ssd => Metric::Ssd,
            FrequencyMetric::Ncc => Metric::Ncc,
        }
    }

    fn find_peak(
        &self,
        search: &Image<f32, 1>,
        template: &Image<f32, 1>,
    ) -> Result<Peak, TrackingError> {
        let range = offset_range(search, template)?;

        let (cols, rows) = (search.cols(), search.rows());
        let corr = cross_correlation(search, template);
        let sums = IntegralImage::new(search.as_slice(), cols, rows, |v| v);
        let energies = IntegralImage::new(search.as_slice(), cols, rows, |v| v * v);

        let stats = TemplateStats::new(template);
        let template_energy: f64 = template
            .as_slice()
            .iter()
            .map(|&v| (v as f64).powi(2))
            .sum();
        let (tw, th) = (template.cols(), template.rows());

        let peak = match self.metric {
            FrequencyMetric::Ssd => scan_offsets(range, Metric::Ssd, |dx, dy| {
                energies.window(dx, dy, tw, th) - 2.0 * corr[dy * cols + dx] + template_energy
            }),
            FrequencyMetric::Ncc => scan_offsets(range, Metric::Ncc, |dx, dy| {
                let sum_s = sums.window(dx, dy, tw, th);
                let var_s = energies.window(dx, dy, tw, th) - sum_s * sum_s / stats.count;
                let cross = corr[dy * cols + dx] - sum_s * stats.mean;
                normalized(cross, var_s.max(0.0), stats.variance)
            }),
        };

        Ok(peak)
    }
}

/// Circular cross-correlation `C(dx, dy) = sum T(i, j) * S(dx + i, dy + j)`
/// over the search grid, returned row-major.
fn cross_correlation(search: &Image<f32, 1>, template: &Image<f32, 1>) -> Vec<f64> {
    let (cols, rows) = (search.cols(), search.rows());

    let mut s_freq: Vec<Complex<f64>> = search
        .as_slice()
        .iter()
        .map(|&v| Complex::new(v as f64, 0.0))
        .collect();

    let mut t_freq = vec![Complex::new(0.0, 0.0); cols * rows];
    let t_data = template.as_slice();
    for y in 0..template.rows() {
        for x in 0..template.cols() {
            t_freq[y * cols + x] = Complex::new(t_data[y * template.cols() + x] as f64, 0.0);
        }
    }

    let mut planner = FftPlanner::<f64>::new();
    fft_2d(&mut planner, &mut s_freq, cols, rows, false);
    fft_2d(&mut planner, &mut t_freq, cols, rows, false);

    for (s, t) in s_freq.iter_mut().zip(&t_freq) {
        *s *= t.conj();
    }

    fft_2d(&mut planner, &mut s_freq, cols, rows, true);

    let norm = (cols * rows) as f64;
    s_freq.iter().map(|c| c.re / norm).collect()
}

/// In-place unnormalized 2D FFT of a row-major `cols x rows` buffer.
fn fft_2d(
    planner: &mut FftPlanner<f64>,
    data: &mut [Complex<f64>],
    cols: usize,
    rows: usize,
    inverse: bool,
) {
    let (row_fft, col_fft) = if inverse {
        (planner.plan_fft_inverse(cols), planner.plan_fft_inverse(rows))
    } else {
        (planner.plan_fft_forward(cols), planner.plan_fft_forward(rows))
    };

    // all rows at once, the buffer is a whole number of rows
    row_fft.process(data);

    let mut transposed = vec![Complex::new(0.0, 0.0); cols * rows];
    for y in 0..rows {
        for x in 0..cols {
            transposed[x * rows + y] = data[y * cols + x];
        }
    }
    col_fft.process(&mut transposed);
    for x in 0..cols {
        for y in 0..rows {
            data[y * cols + x] = transposed[x * rows + y];
        }
    }
}

/// Summed-area table with a one-sample zero border.
struct IntegralImage {
    table: Vec<f64>,
    stride: usize,
}

impl IntegralImage {
    fn new(data: &[f32], cols: usize, rows: usize, f: impl Fn(f64) -> f64) -> Self {
        let stride = cols + 1;
        let mut table = vec![0.0; stride * (rows + 1)];
        for y in 0..rows {
            let mut row_sum = 0.0;
            for x in 0..cols {
                row_sum += f(data[y * cols + x] as f64);
                table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_sum;
            }
        }
        Self { table, stride }
    }

    /// Sum over the `w x h` window with top-left corner `(x, y)`.
    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> f64 {
        let s = self.stride;
        self.table[(y + h) * s + x + w] - self.table[y * s + x + w] - self.table[(y + h) * s + x]
            + self.table[y * s + x]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_integral_image_window() {
        #[rustfmt::skip]
        let data = [
            1.0, 2.0, 3.0,
            4.0, 5.0, 6.0,
        ];
        let ii = IntegralImage::new(&data, 3, 2, |v| v);
        assert_eq!(ii.window(0, 0, 3, 2), 21.0);
        assert_eq!(ii.window(1, 0, 2, 2), 16.0);
        assert_eq!(ii.window(2, 1, 1, 1), 6.0);
    }

    #[test]
    fn test_cross_correlation_matches_direct_sum() -> Result<(), TrackingError> {
        let search = Image::<f32, 1>::from_fn([7, 5].into(), |x, y, _| ((x * 3 + y * 5) % 7) as f32);
        let template = Image::<f32, 1>::new([2, 2].into(), vec![1.0, -2.0, 0.5, 3.0])?;

        let corr = cross_correlation(&search, &template);
        for dy in 0..4 {
            for dx in 0..6 {
                let mut direct = 0.0;
                for ty in 0..2 {
                    for tx in 0..2 {
                        direct += (search.as_slice()[(dy + ty) * 7 + dx + tx]
                            * template.as_slice()[ty * 2 + tx]) as f64;
                    }
                }
                assert_relative_eq!(corr[dy * 7 + dx], direct, epsilon = 1e-9);
            }
        }
        Ok(())
    }

    #[test]
    fn test_frequency_ssd_score_at_exact_match() -> Result<(), TrackingError> {
        let search = Image::<f32, 1>::new([4, 1].into(), vec![1.0, 5.0, 3.0, 7.0])?;
        let template = Image::<f32, 1>::new([2, 1].into(), vec![5.0, 3.0])?;

        let peak = FrequencyPeakFinder::new(Metric::Ssd)?.find_peak(&search, &template)?;
        assert_eq!((peak.x, peak.y), (1, 0));
        assert_relative_eq!(peak.score, 0.0, epsilon = 1e-9);
        Ok(())
    }

    #[test]
    fn test_frequency_metrics() -> Result<(), TrackingError> {
        let ssd = FrequencyPeakFinder::new(Metric::Ssd)?;
        assert_eq!((ssd.name(), ssd.metric()), ("frequency-ssd", Metric::Ssd));
        let ncc = FrequencyPeakFinder::new(Metric::Ncc)?;
        assert_eq!((ncc.name(), ncc.metric()), ("frequency-ncc", Metric::Ncc));
        assert_eq!(
            FrequencyPeakFinder::new(Metric::Sad),
            Err(TrackingError::InvalidStrategy {
                domain: crate::peak::Domain::Frequency,
                metric: Metric::Sad,
            })
        );
        Ok(())
    }
}
