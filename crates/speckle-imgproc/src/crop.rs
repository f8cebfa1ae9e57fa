use speckle_image::{Image, ImageError, Roi};

use crate::parallel;

/// Crop an image to a specified region.
///
/// The size of the region is given by the destination image.
///
/// # Arguments
///
/// * `src` - The source image to crop.
/// * `dst` - The destination image to store the cropped image.
/// * `x` - The x-coordinate of the top-left corner of the region to crop.
/// * `y` - The y-coordinate of the top-left corner of the region to crop.
///
/// # Errors
///
/// Returns [`ImageError::RoiOutOfBounds`] if the region leaves the source image.
///
/// # Examples
///
/// ```rust
/// use speckle_image::{Image, ImageSize};
/// use speckle_imgproc::crop::crop_image;
///
/// let image = Image::<_, 1>::new(ImageSize { width: 4, height: 4 }, vec![
///     0u8, 1, 2, 3,
///     4u8, 5, 6, 7,
///     8u8, 9, 10, 11,
///     12u8, 13, 14, 15
/// ]).unwrap();
///
/// let mut cropped = Image::<_, 1>::from_size_val(ImageSize { width: 2, height: 2 }, 0u8).unwrap();
///
/// crop_image(&image, &mut cropped, 1, 1).unwrap();
///
/// assert_eq!(cropped.as_slice(), &[5u8, 6, 9, 10]);
/// ```
pub fn crop_image<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: usize,
    y: usize,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync,
{
    let roi = Roi::new(x, y, dst.cols(), dst.rows());
    if !roi.fits(src.size()) {
        return Err(ImageError::RoiOutOfBounds {
            roi,
            size: src.size(),
        });
    }

    let (src_cols, dst_cols) = (src.cols(), dst.cols());
    let src_data = src.as_slice();

    parallel::par_iter_rows_mut(dst, |i, dst_row| {
        // get the slice at the top left corner
        let offset = ((y + i) * src_cols + x) * C;
        dst_row.copy_from_slice(&src_data[offset..offset + dst_cols * C]);
    });

    Ok(())
}

/// Crop a region of interest into a newly allocated image.
///
/// # Errors
///
/// Returns an error if the region is empty or leaves the source image.
///
/// # Examples
///
/// ```rust
/// use speckle_image::{Image, Roi};
/// use speckle_imgproc::crop::crop_roi;
///
/// let image = Image::<u8, 1>::from_fn([4, 3].into(), |x, y, _| (x + 4 * y) as u8);
/// let patch = crop_roi(&image, &Roi::new(2, 1, 2, 2)).unwrap();
///
/// assert_eq!(patch.as_slice(), &[6u8, 7, 10, 11]);
/// ```
pub fn crop_roi<T, const C: usize>(src: &Image<T, C>, roi: &Roi) -> Result<Image<T, C>, ImageError>
where
    T: Copy + Default + Send + Sync,
{
    roi.check_within(src.size())?;

    let mut dst = Image::from_size_val(roi.size(), T::default())?;
    crop_image(src, &mut dst, roi.x, roi.y)?;

    Ok(dst)
}
