//! Decimation pyramids.
//!
//! Level 0 is the exact crop of the region of interest, level `i` averages
//! `2^i x 2^i` blocks of level 0 into `ceil(size / 2^i)` pixels per axis. The
//! scale is exactly `2^i` whatever the region size, so pixel `p` of level `i`
//! always starts at pixel `p * 2^i` of level 0. Every level is resampled from
//! level 0 directly, so no error accumulates across levels.

use speckle_image::{Image, ImageDtype, ImageError, ImageSize, Roi};

use crate::{crop::crop_roi, resize::downscale_area};

/// An ordered sequence of progressively half-resolution images.
///
/// Index 0 holds the original resolution, the last index the coarsest level.
#[derive(Clone, Debug, PartialEq)]
pub struct Pyramid {
    roi: Roi,
    levels: Vec<Image<f32, 1>>,
}

impl Pyramid {
    /// The region of the source image the pyramid was built from.
    pub fn roi(&self) -> Roi {
        self.roi
    }

    /// Number of levels, i.e. the layer count plus one.
    pub fn num_levels(&self) -> usize {
        self.levels.len()
    }

    /// Index of the coarsest level.
    pub fn coarsest(&self) -> usize {
        self.levels.len() - 1
    }

    /// Get a level by index.
    pub fn level(&self, index: usize) -> Option<&Image<f32, 1>> {
        self.levels.get(index)
    }

    /// Iterate over the levels from finest to coarsest.
    pub fn iter(&self) -> impl Iterator<Item = &Image<f32, 1>> {
        self.levels.iter()
    }
}

impl std::ops::Index<usize> for Pyramid {
    type Output = Image<f32, 1>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.levels[index]
    }
}

/// Size of pyramid level `level` for a level-0 size.
///
/// Returns `None` when the exact scaled size drops below one pixel in either
/// axis, or when `2^level` is not representable.
///
/// # Example
///
/// ```
/// use speckle_imgproc::pyramid::level_size;
///
/// assert_eq!(level_size([13, 8].into(), 2), Some([4, 2].into()));
/// assert_eq!(level_size([13, 8].into(), 4), None);
/// ```
pub fn level_size(size: ImageSize, level: usize) -> Option<ImageSize> {
    let level = u32::try_from(level).ok()?;
    let factor = 1usize.checked_shl(level)?;
    if size.width / factor == 0 || size.height / factor == 0 {
        return None;
    }
    Some(ImageSize {
        width: size.width.div_ceil(factor),
        height: size.height.div_ceil(factor),
    })
}

/// Build a decimation pyramid over a region of interest.
///
/// # Arguments
///
/// * `image` - The source image.
/// * `roi` - The region to crop, must lie inside `image`.
/// * `layers` - Number of downscaled levels on top of level 0.
///
/// # Returns
///
/// A pyramid with `layers + 1` levels.
///
/// # Errors
///
/// * [`ImageError::RoiOutOfBounds`] / [`ImageError::EmptyRoi`] for a bad region.
/// * [`ImageError::InvalidLayerCount`] if `2^layers` overflows.
/// * [`ImageError::DegenerateLevel`] if a level would shrink below one pixel.
///
/// # Example
///
/// ```
/// use speckle_image::{Image, Roi};
/// use speckle_imgproc::pyramid::build_pyramid;
///
/// let image = Image::<u8, 1>::from_size_val([64, 48].into(), 10).unwrap();
/// let pyramid = build_pyramid(&image, Roi::new(8, 8, 21, 16), 2).unwrap();
///
/// assert_eq!(pyramid.num_levels(), 3);
/// assert_eq!(pyramid[2].size(), [6, 4].into());
/// ```
pub fn build_pyramid<T>(image: &Image<T, 1>, roi: Roi, layers: usize) -> Result<Pyramid, ImageError>
where
    T: ImageDtype,
{
    if layers >= usize::BITS as usize {
        return Err(ImageError::InvalidLayerCount(layers));
    }

    let base = crop_roi(image, &roi)?.to_f32();

    let mut levels = Vec::with_capacity(layers + 1);
    levels.push(base);

    for level in 1..=layers {
        let size =
            level_size(roi.size(), level).ok_or(ImageError::DegenerateLevel { level, roi })?;
        let mut dst = Image::from_size_val(size, 0.0f32)?;
        downscale_area(&levels[0], &mut dst, 1 << level)?;
        levels.push(dst);
    }

    log::trace!("built {}-level pyramid over {}", levels.len(), roi);

    Ok(Pyramid { roi, levels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ramp(size: ImageSize) -> Image<u8, 1> {
        Image::from_fn(size, |x, y, _| ((x * 7 + y * 13) % 251) as u8)
    }

    #[test]
    fn test_pyramid_shape() -> Result<(), ImageError> {
        let image = ramp([100, 80].into());
        for (roi, layers) in [
            (Roi::new(0, 0, 100, 80), 0),
            (Roi::new(3, 5, 50, 41), 3),
            (Roi::new(10, 10, 33, 17), 4),
        ] {
            let pyramid = build_pyramid(&image, roi, layers)?;
            assert_eq!(pyramid.num_levels(), layers + 1);
            assert_eq!(pyramid.roi(), roi);

            let mut prev = pyramid[0].size();
            for (i, level) in pyramid.iter().enumerate() {
                let exact_w = roi.width as f64 / (1 << i) as f64;
                let exact_h = roi.height as f64 / (1 << i) as f64;
                assert!((level.width() as f64 - exact_w).abs() < 1.0);
                assert!((level.height() as f64 - exact_h).abs() < 1.0);
                assert!(level.width() <= prev.width && level.height() <= prev.height);
                prev = level.size();
            }
        }
        Ok(())
    }

    #[test]
    fn test_pyramid_level0_is_exact_crop() -> Result<(), ImageError> {
        let image = ramp([20, 20].into());
        let pyramid = build_pyramid(&image, Roi::new(4, 6, 5, 3), 1)?;
        let expected = crop_roi(&image, &Roi::new(4, 6, 5, 3))?.to_f32();
        assert_eq!(pyramid[0], expected);
        Ok(())
    }

    #[test]
    fn test_pyramid_averages() -> Result<(), ImageError> {
        #[rustfmt::skip]
        let image = Image::<u8, 1>::new(
            [4, 4].into(),
            vec![
                0, 4, 8, 8,
                4, 8, 8, 8,
                1, 1, 2, 2,
                1, 1, 2, 2,
            ],
        )?;
        let pyramid = build_pyramid(&image, Roi::new(0, 0, 4, 4), 2)?;
        assert_eq!(pyramid[1].as_slice(), &[4.0, 8.0, 1.0, 2.0]);
        assert_relative_eq!(pyramid[2].as_slice()[0], 3.75);
        Ok(())
    }

    #[test]
    fn test_pyramid_scale_is_exact() -> Result<(), ImageError> {
        // 6 columns at level 2 keep a scale of 4: the last pixel averages the 2 remaining columns
        let image = Image::<u8, 1>::from_fn([6, 4].into(), |x, _, _| (x * 10) as u8);
        let pyramid = build_pyramid(&image, Roi::new(0, 0, 6, 4), 2)?;
        assert_eq!(pyramid[1].as_slice(), &[5.0, 25.0, 45.0, 5.0, 25.0, 45.0]);
        assert_eq!(pyramid[2].as_slice(), &[15.0, 45.0]);

        // the same columns seen through a wider region land on the same level 2 pixels
        let wide = Image::<u8, 1>::from_fn([8, 4].into(), |x, _, _| (x * 10) as u8);
        let wide_pyramid = build_pyramid(&wide, Roi::new(0, 0, 8, 4), 2)?;
        assert_eq!(wide_pyramid[2].as_slice()[0], pyramid[2].as_slice()[0]);
        Ok(())
    }

    #[test]
    fn test_pyramid_errors() -> Result<(), ImageError> {
        let image = ramp([16, 16].into());

        let roi = Roi::new(8, 8, 10, 4);
        assert_eq!(
            build_pyramid(&image, roi, 1),
            Err(ImageError::RoiOutOfBounds {
                roi,
                size: image.size()
            })
        );

        let roi = Roi::new(0, 0, 16, 6);
        assert_eq!(
            build_pyramid(&image, roi, 3),
            Err(ImageError::DegenerateLevel { level: 3, roi })
        );
        assert!(build_pyramid(&image, roi, 2).is_ok());

        assert_eq!(
            build_pyramid(&image, roi, 200),
            Err(ImageError::InvalidLayerCount(200))
        );
        Ok(())
    }

    #[test]
    fn test_pyramid_deterministic() -> Result<(), ImageError> {
        let image = ramp([40, 30].into());
        let roi = Roi::new(2, 3, 31, 19);
        assert_eq!(build_pyramid(&image, roi, 2)?, build_pyramid(&image, roi, 2)?);
        Ok(())
    }
}
