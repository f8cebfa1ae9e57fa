use std::f32::consts::PI;

use speckle_image::{Image, ImageError};

use crate::interpolation::{interpolate_pixel, InterpolationMode};
use crate::parallel;

/// Inverts a 2x3 affine transformation matrix.
///
/// A singular matrix inverts to the zero transform.
pub fn invert_affine_transform(m: &[f32; 6]) -> [f32; 6] {
    let (a, b, c, d, e, f) = (m[0], m[1], m[2], m[3], m[4], m[5]);

    let determinant = a * e - b * d;
    let inv_determinant = if determinant != 0.0 {
        1.0 / determinant
    } else {
        0.0
    };

    let new_a = e * inv_determinant;
    let new_b = -b * inv_determinant;
    let new_d = -d * inv_determinant;
    let new_e = a * inv_determinant;
    let new_c = -(new_a * c + new_b * f);
    let new_f = -(new_d * c + new_e * f);

    [new_a, new_b, new_c, new_d, new_e, new_f]
}

/// Returns a 2x3 rotation matrix for a 2D rotation around a center point.
///
/// The rotation matrix is defined as:
///
/// | alpha  beta  tx |
/// | -beta  alpha ty |
///
/// where:
///
/// alpha = scale * cos(angle)
/// beta = scale * sin(angle)
/// tx = (1 - alpha) * center.x - beta * center.y
/// ty = beta * center.x + (1 - alpha) * center.y
///
/// A positive angle rotates counter-clockwise on screen (y axis pointing down).
///
/// # Arguments
///
/// * `center` - The center point of the rotation.
/// * `angle` - The angle of rotation in degrees.
/// * `scale` - The scale factor.
pub fn get_rotation_matrix2d(center: (f32, f32), angle: f32, scale: f32) -> [f32; 6] {
    let angle = angle * PI / 180.0f32;
    let alpha = scale * angle.cos();
    let beta = scale * angle.sin();

    let tx = (1.0 - alpha) * center.0 - beta * center.1;
    let ty = beta * center.0 + (1.0 - alpha) * center.1;

    [alpha, beta, tx, -beta, alpha, ty]
}

/// Applies an affine transformation to a point.
fn transform_point(x: f32, y: f32, m: &[f32; 6]) -> (f32, f32) {
    let u = m[0] * x + m[1] * y + m[2];
    let v = m[3] * x + m[4] * y + m[5];
    (u, v)
}

/// Applies an affine transformation to an image.
///
/// Destination pixels whose source position falls outside `src` are set to zero.
///
/// # Arguments
///
/// * `src` - The input image with shape (height, width, channels).
/// * `dst` - The output image with shape (height, width, channels).
/// * `m` - The 2x3 affine transformation matrix mapping `src` onto `dst`.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use speckle_image::Image;
/// use speckle_imgproc::interpolation::InterpolationMode;
/// use speckle_imgproc::warp::warp_affine;
///
/// let src = Image::<f32, 1>::from_size_val([4, 5].into(), 1.0).unwrap();
/// let mut dst = Image::<f32, 1>::from_size_val([4, 5].into(), 0.0).unwrap();
///
/// let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
/// warp_affine(&src, &mut dst, &m, InterpolationMode::Nearest).unwrap();
///
/// assert_eq!(dst.as_slice(), src.as_slice());
/// ```
///
/// # Errors
///
/// Returns an error if the source image is empty.
pub fn warp_affine<const C: usize>(
    src: &Image<f32, C>,
    dst: &mut Image<f32, C>,
    m: &[f32; 6],
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.size().area() == 0 {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    // invert affine transform matrix to find corresponding positions in src from dst
    let m_inv = invert_affine_transform(m);
    let (max_u, max_v) = ((src.cols() - 1) as f32, (src.rows() - 1) as f32);

    parallel::par_iter_pixels_mut(dst, |x, y, dst_pixel| {
        let (u, v) = transform_point(x as f32, y as f32, &m_inv);
        if (0.0..=max_u).contains(&u) && (0.0..=max_v).contains(&v) {
            dst_pixel.copy_from_slice(&interpolate_pixel(src, u, v, interpolation));
        } else {
            dst_pixel.fill(0.0);
        }
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_invert_affine_transform() {
        let m = [1.0, 2.0, 3.0, 0.0, 1.0, 4.0];
        let m_inv = invert_affine_transform(&m);
        let (u, v) = transform_point(5.0, 7.0, &m);
        let (x, y) = transform_point(u, v, &m_inv);
        assert_relative_eq!(x, 5.0, epsilon = 1e-5);
        assert_relative_eq!(y, 7.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotation_matrix_keeps_center() {
        let m = get_rotation_matrix2d((3.0, 4.0), 37.0, 1.0);
        let (u, v) = transform_point(3.0, 4.0, &m);
        assert_relative_eq!(u, 3.0, epsilon = 1e-5);
        assert_relative_eq!(v, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_warp_affine_translation() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_fn([4, 3].into(), |x, y, _| (x + 4 * y) as f32);
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), -1.0)?;

        // shift content one pixel to the right
        let m = [1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        warp_affine(&src, &mut dst, &m, InterpolationMode::Bilinear)?;

        #[rustfmt::skip]
        assert_eq!(dst.as_slice(), &[
            0.0, 0.0, 1.0, 2.0,
            0.0, 4.0, 5.0, 6.0,
            0.0, 8.0, 9.0, 10.0,
        ]);
        Ok(())
    }

    #[test]
    fn test_warp_affine_rotate_90() -> Result<(), ImageError> {
        let src = Image::<f32, 1>::from_fn([3, 3].into(), |x, y, _| (x + 3 * y) as f32);
        let mut dst = Image::<f32, 1>::from_size_val(src.size(), 0.0)?;

        let m = get_rotation_matrix2d((1.0, 1.0), 90.0, 1.0);
        warp_affine(&src, &mut dst, &m, InterpolationMode::Nearest)?;

        // the top-right corner moves to the top-left corner
        assert_eq!(dst.get([0, 0, 0]), Some(&2.0));
        assert_eq!(dst.get([1, 1, 0]), Some(&4.0));
        Ok(())
    }
}
