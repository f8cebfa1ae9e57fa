//! Coarse-to-fine template matching.
//!
//! The tracker derives two centred regions once from the reference frame: a
//! template region and a larger search region leaving room for the maximum
//! expected shift. Every query builds a pyramid over the search region of the
//! new frame, locates the stored template pyramid in it from the coarsest
//! level down, then replaces the stored template with the new frame's.

use serde::{Deserialize, Serialize};
use speckle_image::{Image, ImageDtype, ImageSize, Roi};
use speckle_imgproc::{
    crop::crop_roi,
    interpolation::InterpolationMode,
    pyramid::{build_pyramid, Pyramid},
    resize::resize_native,
};

use crate::{
    displacement::Displacement,
    error::TrackingError,
    peak::{peak_finder, Domain, Metric, PeakFinder},
};

/// Parameters of a [`TemplateMatching`] tracker.
///
/// Missing fields take their default value when deserializing.
///
/// # Examples
///
/// ```
/// use speckle_tracking::{Metric, TemplateMatchingConfig};
///
/// let config = TemplateMatchingConfig {
///     layers: 2,
///     metric: Metric::Ssd,
///     ..Default::default()
/// };
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateMatchingConfig {
    /// fraction of the frame, per axis, kept as the centred template.
    pub template_ratio: f64,
    /// fraction of the frame, per axis and per side, added around the template to search in.
    pub max_shift_ratio: f64,
    /// number of downscaled pyramid levels above full resolution.
    pub layers: usize,
    /// domain the similarity surface is computed in.
    pub domain: Domain,
    /// similarity metric.
    pub metric: Metric,
    /// integer factor frames are bilinearly upsampled by before matching.
    pub upsample: u32,
}

impl Default for TemplateMatchingConfig {
    fn default() -> Self {
        Self {
            template_ratio: 0.5,
            max_shift_ratio: 0.15,
            layers: 0,
            domain: Domain::Spatial,
            metric: Metric::Sad,
            upsample: 1,
        }
    }
}

impl TemplateMatchingConfig {
    /// Check the ratios and the upsample factor.
    ///
    /// The template ratio must lie in `(0, 1]`, the max shift ratio must be
    /// non-negative and the search region `template_ratio + 2 * max_shift_ratio`
    /// must not exceed the frame.
    ///
    /// # Errors
    ///
    /// [`TrackingError::InvalidTemplateRatio`], [`TrackingError::InvalidMaxShiftRatio`]
    /// or [`TrackingError::InvalidUpsample`].
    pub fn validate(&self) -> Result<(), TrackingError> {
        if !(self.template_ratio > 0.0 && self.template_ratio <= 1.0) {
            return Err(TrackingError::InvalidTemplateRatio(self.template_ratio));
        }
        if !(self.max_shift_ratio >= 0.0 && self.search_ratio() <= 1.0) {
            return Err(TrackingError::InvalidMaxShiftRatio {
                template_ratio: self.template_ratio,
                max_shift_ratio: self.max_shift_ratio,
            });
        }
        if self.upsample == 0 {
            return Err(TrackingError::InvalidUpsample(self.upsample));
        }
        Ok(())
    }

    fn search_ratio(&self) -> f64 {
        self.template_ratio + 2.0 * self.max_shift_ratio
    }
}

/// A way of measuring the displacement between consecutive frames.
pub trait DisplacementMethod {
    /// Name of the method, used in reports.
    fn name(&self) -> &str;

    /// Measure the displacement of `frame` relative to the previous frame.
    fn estimate_displacement(
        &mut self,
        frame: &Image<u8, 1>,
    ) -> Result<Displacement, TrackingError>;
}

/// Frame-to-frame displacement tracker using coarse-to-fine template matching.
///
/// Each returned [`Displacement`] is relative to the frame passed in the
/// previous call (or at construction), see [`crate::Trajectory`] to accumulate
/// them. The tracker is not shareable between concurrent callers; track
/// independent streams with independent instances.
///
/// # Examples
///
/// ```
/// use speckle_image::Image;
/// use speckle_tracking::{TemplateMatching, TemplateMatchingConfig};
///
/// let frame = Image::<u8, 1>::from_fn([64, 48].into(), |x, y, _| ((x * x + 3 * y * y) % 256) as u8);
/// let mut tracker = TemplateMatching::new(&frame, TemplateMatchingConfig::default()).unwrap();
///
/// let displacement = tracker.estimate_displacement(&frame).unwrap();
/// assert!(displacement.is_zero());
/// ```
#[derive(Debug)]
pub struct TemplateMatching {
    config: TemplateMatchingConfig,
    frame_size: ImageSize,
    template_roi: Roi,
    search_roi: Roi,
    peak_finder: Box<dyn PeakFinder>,
    templates: Pyramid,
}

impl TemplateMatching {
    /// Create a tracker referenced on `first`.
    ///
    /// # Errors
    ///
    /// Configuration errors: invalid ratios, an upsample factor that is zero or
    /// makes the frame too large to allocate, an invalid strategy, an empty
    /// region or a layer count that makes a pyramid level degenerate.
    pub fn new<T: ImageDtype>(
        first: &Image<T, 1>,
        config: TemplateMatchingConfig,
    ) -> Result<Self, TrackingError> {
        config.validate()?;
        upsampled_size(first.size(), config.upsample)?;
        let peak_finder = peak_finder(config.domain, config.metric)?;

        let frame = upsample_frame(first, config.upsample)?;
        let template_roi = centered_roi(frame.size(), config.template_ratio);
        let search_roi = centered_roi(frame.size(), config.search_ratio());

        let templates = build_pyramid(&frame, template_roi, config.layers)?;
        // fail at construction rather than on the first query
        build_pyramid(&frame, search_roi, config.layers)?;

        log::info!("template ROI: {template_roi}");
        log::info!("search ROI: {search_roi}");

        Ok(Self {
            config,
            frame_size: first.size(),
            template_roi,
            search_roi,
            peak_finder,
            templates,
        })
    }

    /// The configuration the tracker was built with.
    pub fn config(&self) -> &TemplateMatchingConfig {
        &self.config
    }

    /// Size every query frame must have.
    pub fn frame_size(&self) -> ImageSize {
        self.frame_size
    }

    /// Template region, in upsampled frame coordinates.
    pub fn template_roi(&self) -> Roi {
        self.template_roi
    }

    /// Search region, in upsampled frame coordinates.
    pub fn search_roi(&self) -> Roi {
        self.search_roi
    }

    /// The active similarity strategy.
    pub fn peak_finder(&self) -> &dyn PeakFinder {
        self.peak_finder.as_ref()
    }

    /// Reference template pyramid of the last processed frame.
    pub fn templates(&self) -> &Pyramid {
        &self.templates
    }

    /// Measure the displacement of `frame` relative to the previous frame.
    ///
    /// On success the reference template is rebuilt from `frame`. On failure
    /// the reference is left untouched.
    ///
    /// # Errors
    ///
    /// * [`TrackingError::FrameSizeMismatch`] if `frame` differs in size from the reference frame.
    /// * [`TrackingError::LevelFailed`] if matching fails at some pyramid level.
    pub fn estimate_displacement<T: ImageDtype>(
        &mut self,
        frame: &Image<T, 1>,
    ) -> Result<Displacement, TrackingError> {
        if frame.size() != self.frame_size {
            return Err(TrackingError::FrameSizeMismatch {
                expected: self.frame_size,
                actual: frame.size(),
            });
        }

        let frame = upsample_frame(frame, self.config.upsample)?;
        let searches = build_pyramid(&frame, self.search_roi, self.config.layers)?;
        let [x, y] = self.match_pyramids(&searches)?;
        let templates = build_pyramid(&frame, self.template_roi, self.config.layers)?;

        let [ox, oy] = self.template_roi.offset_to(&self.search_roi);
        let displacement = Displacement::with_scale(
            x as i64 + ox,
            y as i64 + oy,
            self.config.upsample,
        );

        self.templates = templates;

        log::debug!("displacement: {displacement}");

        Ok(displacement)
    }

    /// Template position inside the level-0 search image.
    fn match_pyramids(&self, searches: &Pyramid) -> Result<[usize; 2], TrackingError> {
        let coarsest = searches.coarsest();
        let peak = self
            .peak_finder
            .find_peak(&searches[coarsest], &self.templates[coarsest])
            .map_err(|e| self.level_failed(coarsest, e))?;

        let mut best = [peak.x, peak.y];
        log::debug!(
            "level {coarsest}: {} peak at ({}, {}), score {}",
            self.peak_finder.name(),
            best[0],
            best[1],
            peak.score
        );

        for level in (0..coarsest).rev() {
            best = refine_at_level(
                &searches[level],
                &self.templates[level],
                [best[0] * 2, best[1] * 2],
                self.peak_finder.as_ref(),
            )
            .map_err(|e| self.level_failed(level, e))?;
            log::debug!("level {level}: refined to ({}, {})", best[0], best[1]);
        }

        Ok(best)
    }

    fn level_failed(&self, level: usize, source: TrackingError) -> TrackingError {
        TrackingError::LevelFailed {
            level,
            search_roi: self.search_roi,
            template_roi: self.template_roi,
            source: Box::new(source),
        }
    }
}

impl DisplacementMethod for TemplateMatching {
    fn name(&self) -> &str {
        "TemplateMatching"
    }

    fn estimate_displacement(
        &mut self,
        frame: &Image<u8, 1>,
    ) -> Result<Displacement, TrackingError> {
        TemplateMatching::estimate_displacement(self, frame)
    }
}

/// Refine a projected template position inside one pyramid level.
///
/// `best` is clamped to the valid positions first. The local window spans the
/// template plus a one pixel border per side, or no border when `best` is
/// `(0, 0)`; the border is cut where it would leave the search image.
pub(crate) fn refine_at_level(
    search: &Image<f32, 1>,
    template: &Image<f32, 1>,
    best: [usize; 2],
    finder: &dyn PeakFinder,
) -> Result<[usize; 2], TrackingError> {
    let too_small = || TrackingError::PatchTooSmall {
        search: search.size(),
        template: template.size(),
    };
    let max_x = search.width().checked_sub(template.width()).ok_or_else(too_small)?;
    let max_y = search.height().checked_sub(template.height()).ok_or_else(too_small)?;

    let (bx, by) = (best[0].min(max_x), best[1].min(max_y));
    let border = if bx == 0 && by == 0 { 0 } else { 1 };

    let (lo_x, lo_y) = (border.min(bx), border.min(by));
    let (hi_x, hi_y) = (border.min(max_x - bx), border.min(max_y - by));

    let window_roi = Roi::new(
        bx - lo_x,
        by - lo_y,
        template.width() + lo_x + hi_x,
        template.height() + lo_y + hi_y,
    );
    let window = crop_roi(search, &window_roi)?;
    let peak = finder.find_peak(&window, template)?;

    Ok([window_roi.x + peak.x, window_roi.y + peak.y])
}

/// Centred region covering `ratio` of the frame per axis.
///
/// Corners are rounded outwards: `[floor(W * b), ceil(W * (1 - b)))` with
/// `b = (1 - ratio) / 2`.
fn centered_roi(size: ImageSize, ratio: f64) -> Roi {
    let border = (1.0 - ratio) / 2.0;
    let corner = |len: usize, t: f64| len as f64 * t;
    let tl = [
        corner(size.width, border).floor() as usize,
        corner(size.height, border).floor() as usize,
    ];
    let br = [
        (corner(size.width, 1.0 - border).ceil() as usize).min(size.width),
        (corner(size.height, 1.0 - border).ceil() as usize).min(size.height),
    ];
    Roi::from_corners(tl, br)
}

/// Size of a frame upsampled by `factor`, if its buffer is addressable.
fn upsampled_size(size: ImageSize, factor: u32) -> Result<ImageSize, TrackingError> {
    let scale = |len: usize| len.checked_mul(factor as usize);
    let upsampled = scale(size.width)
        .zip(scale(size.height))
        .map(|(width, height)| ImageSize { width, height })
        .filter(|s| {
            s.width
                .checked_mul(s.height)
                .is_some_and(|n| n <= isize::MAX as usize / std::mem::size_of::<f32>())
        });
    upsampled.ok_or(TrackingError::InvalidUpsample(factor))
}

fn upsample_frame<T: ImageDtype>(
    frame: &Image<T, 1>,
    factor: u32,
) -> Result<Image<f32, 1>, TrackingError> {
    let frame = frame.to_f32();
    if factor == 1 {
        return Ok(frame);
    }

    let size = upsampled_size(frame.size(), factor)?;
    let mut upsampled = Image::from_size_val(size, 0.0f32)?;
    resize_native(&frame, &mut upsampled, InterpolationMode::Bilinear)?;
    Ok(upsampled)
}
