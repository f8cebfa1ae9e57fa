use rayon::prelude::*;

use speckle_image::Image;

/// Apply a function to each row of the destination image in parallel.
///
/// The closure receives the row index and the mutable row buffer
/// (`width * C` samples).
pub fn par_iter_rows_mut<T, const C: usize>(
    dst: &mut Image<T, C>,
    f: impl Fn(usize, &mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    let row_len = dst.cols() * C;
    if row_len == 0 {
        return;
    }

    dst.as_slice_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row)| f(y, row));
}

/// Apply a function to each pixel of the destination image in parallel.
///
/// The closure receives `(x, y)` and the mutable pixel (`C` samples).
pub fn par_iter_pixels_mut<T, const C: usize>(
    dst: &mut Image<T, C>,
    f: impl Fn(usize, usize, &mut [T]) + Send + Sync,
) where
    T: Send + Sync,
{
    par_iter_rows_mut(dst, |y, row| {
        row.chunks_exact_mut(C)
            .enumerate()
            .for_each(|(x, pixel)| f(x, y, pixel));
    });
}
