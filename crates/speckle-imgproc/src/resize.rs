use speckle_image::{Image, ImageError};

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Resize an image to the size of `dst` by point sampling.
///
/// Output pixel centres are mapped onto input pixel centres
/// (`u = (x + 0.5) * src_w / dst_w - 0.5`), so an integer upscale with
/// [`InterpolationMode::Nearest`] replicates every source pixel exactly.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, already allocated with the new size.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use speckle_image::{Image, ImageSize};
/// use speckle_imgproc::resize::resize_native;
/// use speckle_imgproc::interpolation::InterpolationMode;
///
/// let image = Image::<f32, 1>::new([2, 1].into(), vec![1.0, 2.0]).unwrap();
/// let mut image_resized = Image::<f32, 1>::from_size_val([4, 2].into(), 0.0).unwrap();
///
/// resize_native(&image, &mut image_resized, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(image_resized.as_slice(), &[1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 2.0, 2.0]);
/// ```
///
/// # Errors
///
/// Returns an error if either image is empty.
pub fn resize_native<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    check_sizes(src, dst)?;

    let scale_x = src.cols() as f32 / dst.cols() as f32;
    let scale_y = src.rows() as f32 / dst.rows() as f32;

    parallel::par_iter_pixels_mut(dst, |x, y, dst_pixel| {
        let u = (x as f32 + 0.5) * scale_x - 0.5;
        let v = (y as f32 + 0.5) * scale_y - 0.5;
        dst_pixel.copy_from_slice(&interpolate_pixel(src, u, v, interpolation));
    });

    Ok(())
}

/// Resize an image to the size of `dst` by exact area averaging.
///
/// Every output pixel is the coverage-weighted mean of the input pixels that
/// its footprint overlaps, which makes this the anti-aliased filter used to
/// build decimation pyramids. Non-integer ratios are supported: a 5 pixel row
/// shrunk to 3 pixels averages footprints of 5/3 input pixels each.
///
/// # Example
///
/// ```
/// use speckle_image::Image;
/// use speckle_imgproc::resize::resize_area;
///
/// let image = Image::<f32, 1>::new([2, 2].into(), vec![0.0, 1.0, 2.0, 5.0]).unwrap();
/// let mut small = Image::<f32, 1>::from_size_val([1, 1].into(), 0.0).unwrap();
///
/// resize_area(&image, &mut small).unwrap();
///
/// assert_eq!(small.as_slice(), &[2.0]);
/// ```
///
/// # Errors
///
/// Returns an error if either image is empty.
pub fn resize_area<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
) -> Result<(), ImageError> {
    check_sizes(src, dst)?;

    let spans_x = area_spans(src.cols(), dst.cols(), src.cols() as f64 / dst.cols() as f64);
    let spans_y = area_spans(src.rows(), dst.rows(), src.rows() as f64 / dst.rows() as f64);
    resize_area_spans(src, dst, &spans_x, &spans_y)
}

/// Shrink an image by an integer `factor` with exact area averaging.
///
/// `dst` must be `ceil(src / factor)` in each axis. Every output pixel
/// averages a `factor x factor` block of input pixels; along the last column
/// and row the block is cut at the image border and averages what is left,
/// so output pixel `i` always starts at input pixel `i * factor`.
///
/// # Example
///
/// ```
/// use speckle_image::Image;
/// use speckle_imgproc::resize::downscale_area;
///
/// let image = Image::<f32, 1>::new([5, 1].into(), vec![1.0, 3.0, 5.0, 7.0, 10.0]).unwrap();
/// let mut small = Image::<f32, 1>::from_size_val([3, 1].into(), 0.0).unwrap();
///
/// downscale_area(&image, &mut small, 2).unwrap();
///
/// assert_eq!(small.as_slice(), &[2.0, 6.0, 10.0]);
/// ```
///
/// # Errors
///
/// Returns an error if either image is empty, `factor` is zero or `dst` does
/// not have the reduced size.
pub fn downscale_area<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    factor: usize,
) -> Result<(), ImageError> {
    check_sizes(src, dst)?;
    if factor == 0 {
        return Err(ImageError::InvalidImageSize(0, 0, dst.cols(), dst.rows()));
    }
    let (cols, rows) = (src.cols().div_ceil(factor), src.rows().div_ceil(factor));
    if dst.cols() != cols || dst.rows() != rows {
        return Err(ImageError::InvalidImageSize(cols, rows, dst.cols(), dst.rows()));
    }

    let spans_x = area_spans(src.cols(), dst.cols(), factor as f64);
    let spans_y = area_spans(src.rows(), dst.rows(), factor as f64);
    resize_area_spans(src, dst, &spans_x, &spans_y)
}

fn resize_area_spans<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    spans_x: &[AreaSpan],
    spans_y: &[AreaSpan],
) -> Result<(), ImageError> {
    // horizontal pass: src rows x dst cols
    let mut tmp = Image::<f32, C>::from_size_val([dst.cols(), src.rows()].into(), 0.0)?;
    let (src_cols, src_data) = (src.cols(), src.as_slice());
    parallel::par_iter_rows_mut(&mut tmp, |y, tmp_row| {
        let src_row = &src_data[y * src_cols * C..(y + 1) * src_cols * C];
        for (span, out) in spans_x.iter().zip(tmp_row.chunks_exact_mut(C)) {
            out.fill(0.0);
            for (i, &w) in span.weights.iter().enumerate() {
                let base = (span.start + i) * C;
                for k in 0..C {
                    out[k] += w * src_row[base + k];
                }
            }
        }
    });

    // vertical pass: dst rows x dst cols
    let row_len = dst.cols() * C;
    let tmp_data = tmp.as_slice();
    parallel::par_iter_rows_mut(dst, |y, dst_row| {
        let span = &spans_y[y];
        dst_row.fill(0.0);
        for (j, &w) in span.weights.iter().enumerate() {
            let offset = (span.start + j) * row_len;
            let tmp_row = &tmp_data[offset..offset + row_len];
            for (out, &val) in dst_row.iter_mut().zip(tmp_row) {
                *out += w * val;
            }
        }
    });

    Ok(())
}

/// Input footprint of one output sample along an axis.
#[derive(Debug, Clone, PartialEq)]
struct AreaSpan {
    start: usize,
    weights: Vec<f32>,
}

/// Footprints of `dst_len` samples, sample `i` covering input `[i * scale, (i + 1) * scale)`
/// cut at `src_len`.
fn area_spans(src_len: usize, dst_len: usize, scale: f64) -> Vec<AreaSpan> {
    (0..dst_len)
        .map(|i| {
            let lo = i as f64 * scale;
            let hi = ((i + 1) as f64 * scale).min(src_len as f64);
            let start = (lo.floor() as usize).min(src_len - 1);
            let end = (hi.ceil() as usize).clamp(start + 1, src_len);
            let weights = (start..end)
                .map(|j| {
                    let overlap = hi.min((j + 1) as f64) - lo.max(j as f64);
                    (overlap.max(0.0) / (hi - lo)) as f32
                })
                .collect();
            AreaSpan { start, weights }
        })
        .collect()
}

fn check_sizes<const C: usize>(src: &Image<f32, C>, dst: &Image<f32, C>) -> Result<(), ImageError> {
    if src.size().area() == 0 || dst.size().area() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }
    Ok(())
}
